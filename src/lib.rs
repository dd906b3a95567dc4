//! isoplot - Interactive plots of RNA isoform structures and expression
//!
//! Reads a transcript annotation (GTF, CSV/TSV, Excel, Parquet or JSON) and an
//! optional expression matrix, selects one gene, compresses its introns and
//! draws each transcript next to its expression across samples.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod plot;
pub mod transform;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use model::{Annotation, ExpressionMatrix, Feature, Table};
pub use pipeline::{build_report, PlotReport};
