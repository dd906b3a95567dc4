//! Configuration handling for isoplot

use std::path::PathBuf;

use crate::parser::{ExpressionOptions, ReadOptions};
use crate::plot::{PlotConfig, TraceConfig};
use crate::transform::{FilterOptions, DEFAULT_TARGET_GAP_WIDTH};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
    Terminal,
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "terminal" => Ok(OutputFormat::Terminal),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for building a plot
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the annotation (GTF or table)
    pub annotation_path: PathBuf,
    /// Gene to plot, matched against `filter.gene_id_column`
    pub gene: String,
    /// Path to the expression matrix
    pub expression_path: Option<PathBuf>,
    /// Path to the sample metadata
    pub metadata_path: Option<PathBuf>,
    /// Options for reading the annotation
    pub read: ReadOptions,
    pub expression: ExpressionOptions,
    pub filter: FilterOptions,
    /// Compress long introns
    pub shorten_gaps: bool,
    pub target_gap_width: i64,
    pub traces: TraceConfig,
    pub plot: PlotConfig,
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotation_path: PathBuf::new(),
            gene: String::new(),
            expression_path: None,
            metadata_path: None,
            read: ReadOptions::default(),
            expression: ExpressionOptions::default(),
            filter: FilterOptions::default(),
            shorten_gaps: true,
            target_gap_width: DEFAULT_TARGET_GAP_WIDTH,
            traces: TraceConfig::default(),
            plot: PlotConfig::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Create a new Config for one gene of an annotation
    pub fn new(annotation_path: PathBuf, gene: impl Into<String>) -> Self {
        Self {
            annotation_path,
            gene: gene.into(),
            ..Default::default()
        }
    }

    /// Set the expression matrix
    pub fn with_expression(mut self, path: PathBuf) -> Self {
        self.expression_path = Some(path);
        self
    }

    /// Set the sample metadata
    pub fn with_metadata(mut self, path: PathBuf) -> Self {
        self.metadata_path = Some(path);
        self
    }

    pub fn with_expression_options(mut self, options: ExpressionOptions) -> Self {
        self.expression = options;
        self
    }

    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    /// Enable or disable intron shortening
    pub fn with_shorten_gaps(mut self, shorten: bool) -> Self {
        self.shorten_gaps = shorten;
        self
    }

    pub fn with_target_gap_width(mut self, width: i64) -> Self {
        self.target_gap_width = width;
        self
    }

    pub fn with_traces(mut self, traces: TraceConfig) -> Self {
        self.traces = traces;
        self
    }

    pub fn with_plot(mut self, plot: PlotConfig) -> Self {
        self.plot = plot;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.read = self.read.with_sheet_name(name.clone());
        self.expression.read = self.expression.read.with_sheet_name(name);
        self
    }
}
