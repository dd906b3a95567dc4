//! Data model for tables, transcript features, and expression values

mod annotation;
mod expression;
mod feature;
mod table;

pub use annotation::{Annotation, REQUIRED_COLUMNS};
pub use expression::{ExpressionMatrix, ExpressionRecord};
pub use feature::{Feature, FeatureType, Span, Strand};
pub use table::{CellType, CellValue, Column, Row, Table};
