//! isoplot - Interactive plots of RNA isoform structures and expression

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::Level;

use isoplot::config::{Config, OutputFormat};
use isoplot::output::{render, OutputFactory};
use isoplot::parser::ExpressionOptions;
use isoplot::pipeline::build_report;
use isoplot::plot::{ExpressionStyle, PlotConfig, TraceConfig};
use isoplot::transform::{FilterOptions, TopTranscripts, DEFAULT_TARGET_GAP_WIDTH};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Html,
    Json,
    Terminal,
    Tsv,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Html => OutputFormat::Html,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Tsv => OutputFormat::Tsv,
        }
    }
}

/// Plot the transcript structures of a gene next to their expression
#[derive(Parser, Debug)]
#[command(name = "isoplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Annotation file (GTF, CSV/TSV, Excel, Parquet or JSON)
    annotation: PathBuf,

    /// Gene to plot
    #[arg(short, long)]
    gene: String,

    /// Annotation column matched against --gene
    #[arg(long, default_value = "gene_name")]
    gene_column: String,

    /// Expression matrix: a transcript id column and one column per sample
    #[arg(short, long)]
    expression: Option<PathBuf>,

    /// Sample metadata, one row per sample
    #[arg(short, long, requires = "expression")]
    metadata: Option<PathBuf>,

    /// For Excel files: which sheet to read
    #[arg(long)]
    sheet: Option<String>,

    /// Transcript id column of the expression matrix
    #[arg(long, default_value = "transcript_id")]
    transcript_id_column: String,

    /// Gene id column of the expression matrix, ignored when absent
    /// (required by --relative-abundance)
    #[arg(long, default_value = "gene_id")]
    expression_gene_column: String,

    /// Sample id column of the metadata
    #[arg(long, default_value = "sample_id")]
    sample_id_column: String,

    /// Name of the raw expression values
    #[arg(long, default_value = "counts")]
    measure_name: String,

    /// Add counts-per-million values (measure "CPM")
    #[arg(long)]
    cpm: bool,

    /// Add within-gene relative abundance (measure "relative_abundance")
    #[arg(long)]
    relative_abundance: bool,

    /// Measures to plot, one panel each (comma-separated, default: --measure-name)
    #[arg(long, value_delimiter = ',')]
    measures: Vec<String>,

    /// Measure used to rank transcripts (default: --measure-name)
    #[arg(long)]
    rank_by: Option<String>,

    /// Keep transcripts in annotation order instead of ranking by expression
    #[arg(long)]
    no_order: bool,

    /// Keep only the top N expressed transcripts ("all" keeps every one)
    #[arg(long, default_value = "all")]
    top: TopTranscripts,

    /// Draw genomic coordinates without compressing introns
    #[arg(long)]
    no_shorten: bool,

    /// Width introns are compressed to
    #[arg(long, default_value_t = DEFAULT_TARGET_GAP_WIDTH)]
    gap_width: i64,

    /// Annotation column used to color transcript features
    #[arg(long)]
    annotation_hue: Option<String>,

    /// Metadata column used to split expression values
    #[arg(long)]
    expression_hue: Option<String>,

    /// Annotation column used for transcript labels
    #[arg(long, default_value = "transcript_name")]
    label_field: String,

    /// How expression values are drawn (boxplot or points)
    #[arg(long, default_value = "boxplot")]
    style: ExpressionStyle,

    /// Panel titles, left to right (comma-separated)
    #[arg(long, value_delimiter = ',')]
    titles: Vec<String>,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1800)]
    width: usize,

    /// Figure height in pixels
    #[arg(long, default_value_t = 800)]
    height: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    format: CliOutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::Error,
        (false, 0) => Level::Warn,
        (false, 1) => Level::Info,
        _ => Level::Debug,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config_from_cli(&cli);
    let report = build_report(&config)?;

    match cli.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            // never write color codes into files
            OutputFactory::create_plain(config.output_format).render(&report, &mut writer)?;
            writer.flush()?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render(&report, config.output_format, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn config_from_cli(cli: &Cli) -> Config {
    let expression_options = ExpressionOptions {
        transcript_id_column: cli.transcript_id_column.clone(),
        gene_id_column: Some(cli.expression_gene_column.clone()),
        sample_id_column: cli.sample_id_column.clone(),
        measure_name: cli.measure_name.clone(),
        cpm_normalization: cli.cpm,
        relative_abundance: cli.relative_abundance,
        ..Default::default()
    };

    let filter = FilterOptions::default()
        .with_gene_id_column(cli.gene_column.clone())
        .with_expression_column(cli.rank_by.clone().unwrap_or_else(|| cli.measure_name.clone()))
        .with_order_by_expression(!cli.no_order)
        .with_keep_top(cli.top);

    let measures = if cli.measures.is_empty() {
        vec![cli.measure_name.clone()]
    } else {
        cli.measures.clone()
    };
    let mut traces = TraceConfig::default()
        .with_expression_measures(measures)
        .with_expression_style(cli.style)
        .with_y_label_field(cli.label_field.clone());
    if let Some(ref hue) = cli.annotation_hue {
        traces = traces.with_annotation_hue(hue.clone());
    }
    if let Some(ref hue) = cli.expression_hue {
        traces = traces.with_expression_hue(hue.clone());
    }

    let mut plot = PlotConfig::default().with_size(cli.width, cli.height);
    if !cli.titles.is_empty() {
        plot = plot.with_subplot_titles(cli.titles.clone());
    }
    if let Some(ref hue) = cli.expression_hue {
        plot = plot.with_legend_title(hue.clone());
    }

    let mut config = Config::new(cli.annotation.clone(), cli.gene.clone())
        .with_expression_options(expression_options)
        .with_filter(filter)
        .with_shorten_gaps(!cli.no_shorten)
        .with_target_gap_width(cli.gap_width)
        .with_traces(traces)
        .with_plot(plot)
        .with_output_format(cli.format.into());
    if let Some(ref path) = cli.expression {
        config = config.with_expression(path.clone());
    }
    if let Some(ref path) = cli.metadata {
        config = config.with_metadata(path.clone());
    }
    if let Some(ref sheet) = cli.sheet {
        config = config.with_sheet_name(sheet.clone());
    }
    config
}
