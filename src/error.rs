//! Error types for isoplot operations

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while filtering, transforming, or plotting transcripts
#[derive(Debug, Error)]
pub enum Error {
    #[error("{table} is missing required column(s): {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("No annotation found for gene: {gene} in the '{column}' column")]
    GeneNotFound { gene: String, column: String },

    #[error(
        "Expression matrix is empty after filtering. No matching '{column}' entries \
         between expression matrix and annotation found for gene '{gene}'"
    )]
    EmptyExpression { gene: String, column: String },

    #[error("'keep_top_expressed_transcripts' must be 'all' or a positive integer, got {0}")]
    InvalidTopTranscripts(String),

    #[error("Expression measure '{0}' not found in expression matrix")]
    UnknownMeasure(String),

    #[error("Exons must be from a single chromosome and strand, found {seqnames} chromosome(s) and {strands} strand(s)")]
    MixedLocus { seqnames: usize, strands: usize },

    #[error("Invalid strand '{0}', expected '+', '-' or '.'")]
    InvalidStrand(String),

    #[error("Invalid coordinate in column '{column}' at line {line}: {value}")]
    InvalidCoordinate {
        column: String,
        line: usize,
        value: String,
    },

    #[error("Malformed GTF line {line}: {message}")]
    Gtf { line: usize, message: String },

    #[error("Annotation is empty")]
    EmptyAnnotation,

    #[error("Expression table has no sample columns")]
    NoSampleColumns,

    #[error("Sample column '{column}' is not numeric (row {line})")]
    NonNumericSample { column: String, line: usize },

    #[error("Relative abundance requires a gene id column")]
    MissingGeneColumn,

    #[error("No samples in common between expression matrix and metadata")]
    NoMatchingSamples,

    #[error("Figure supports at most {max} panels, got {requested}")]
    TooManyPanels { requested: usize, max: usize },
}
