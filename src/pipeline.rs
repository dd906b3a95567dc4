//! End-to-end pipeline: annotation and expression files to a finished figure

use anyhow::{Context, Result};
use plotly::Plot;
use serde::Serialize;

use crate::config::Config;
use crate::model::{Annotation, ExpressionMatrix};
use crate::parser::{load_annotation, read_expression_matrix};
use crate::plot::{make_plot, make_traces, Traces};
use crate::transform::{gene_filtering, shorten_gaps, to_intron};

/// Per-transcript facts shown next to the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub transcript_id: String,
    pub transcript_name: String,
    pub exons: usize,
    /// Genomic start of the first exon
    pub start: i64,
    /// Genomic end of the last exon
    pub end: i64,
    /// Summed exon width
    pub length: i64,
    /// Expression summed over samples, when an expression matrix was given
    pub total_expression: Option<f64>,
}

/// Everything produced for one gene
pub struct PlotReport {
    pub gene: String,
    /// Filtered features with introns, rescaled when gaps were shortened
    pub annotation: Annotation,
    pub expression: Option<ExpressionMatrix>,
    pub traces: Traces,
    pub plot: Plot,
    pub transcripts: Vec<TranscriptSummary>,
}

/// Load, filter, transform and plot the configured gene
pub fn build_report(config: &Config) -> Result<PlotReport> {
    let annotation = load_annotation(&config.annotation_path, &config.read)?;
    log::info!(
        "Loaded {} features of {} transcripts",
        annotation.len(),
        annotation.transcript_ids().len()
    );

    let expression = match config.expression_path {
        Some(ref path) => Some(read_expression_matrix(
            path,
            config.metadata_path.as_deref(),
            &config.expression,
        )?),
        None => None,
    };

    let (filtered, expression) = gene_filtering(&config.gene, &annotation, expression.as_ref(), &config.filter)
        .with_context(|| format!("Failed to select gene {}", config.gene))?;

    let mut processed = to_intron(&filtered);
    if config.shorten_gaps {
        processed = shorten_gaps(&processed, true, config.target_gap_width)
            .context("Failed to shorten intron gaps")?;
    }

    let traces = make_traces(&processed, expression.as_ref(), &config.traces)?;
    let plot = make_plot(&traces, &config.plot)?;
    let transcripts = summarize_transcripts(&processed, expression.as_ref(), &config.filter.expression_column);

    Ok(PlotReport {
        gene: config.gene.clone(),
        annotation: processed,
        expression,
        traces,
        plot,
        transcripts,
    })
}

/// One summary per transcript, in plotting order
pub fn summarize_transcripts(
    annotation: &Annotation,
    expression: Option<&ExpressionMatrix>,
    measure: &str,
) -> Vec<TranscriptSummary> {
    let totals = expression.map(|m| m.total_by_transcript(measure));

    annotation
        .by_transcript()
        .into_iter()
        .map(|(tx, features)| {
            let exons: Vec<_> = features
                .iter()
                .filter(|f| f.is_exon())
                .map(|f| f.genomic_span())
                .collect();
            let name = features
                .iter()
                .find_map(|f| f.transcript_name.clone())
                .unwrap_or_else(|| tx.to_string());

            TranscriptSummary {
                transcript_id: tx.to_string(),
                transcript_name: name,
                exons: exons.len(),
                start: exons.iter().map(|s| s.start).min().unwrap_or_default(),
                end: exons.iter().map(|s| s.end).max().unwrap_or_default(),
                length: exons.iter().map(|s| s.width()).sum(),
                total_expression: totals.as_ref().map(|t| t.get(tx).copied().unwrap_or(0.0)),
            }
        })
        .collect()
}
