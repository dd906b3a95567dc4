//! Output formatting for plot reports

mod html;
mod json;
mod terminal;
mod tsv;

use std::io::Write;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::pipeline::PlotReport;

pub use html::HtmlOutput;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;
pub use tsv::TsvOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a report to a writer
    fn render(&self, report: &PlotReport, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Html => Box::new(HtmlOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Tsv => Box::new(TsvOutput),
        }
    }

    /// Like [`OutputFactory::create`], without terminal colors
    pub fn create_plain(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::with_color(false)),
            other => Self::create(other),
        }
    }
}

/// Render a report in the given format
pub fn render(report: &PlotReport, format: OutputFormat, writer: &mut dyn Write) -> Result<()> {
    OutputFactory::create(format).render(report, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, ExpressionMatrix, ExpressionRecord, Feature, FeatureType, Strand};
    use crate::pipeline::summarize_transcripts;
    use crate::plot::{make_plot, make_traces, PlotConfig, TraceConfig};
    use crate::transform::{shorten_gaps, to_intron};

    pub(crate) fn sample_report() -> PlotReport {
        let exon = |tx: &str, start: i64, end: i64| {
            Feature::new("chr7", start, end, Strand::Forward, FeatureType::Exon, tx)
                .with_gene("G1", "GENE1")
        };
        let annotation = to_intron(&Annotation::new(vec![
            exon("tx-a", 1000, 1200),
            exon("tx-a", 5000, 5100),
            exon("tx-b", 1000, 1200),
            exon("tx-b", 9000, 9300),
        ]));
        let annotation = shorten_gaps(&annotation, true, 100).unwrap();

        let mut matrix = ExpressionMatrix::new(vec!["counts".to_string()]);
        for (tx, sample, value) in [("tx-a", "s1", 4.0), ("tx-a", "s2", 6.0), ("tx-b", "s1", 1.0)] {
            matrix.records.push(ExpressionRecord {
                transcript_id: tx.to_string(),
                gene_id: Some("G1".to_string()),
                sample_id: sample.to_string(),
                values: vec![value],
                metadata: Vec::new(),
            });
        }

        let traces = make_traces(&annotation, Some(&matrix), &TraceConfig::default()).unwrap();
        let plot = make_plot(&traces, &PlotConfig::default()).unwrap();
        let transcripts = summarize_transcripts(&annotation, Some(&matrix), "counts");

        PlotReport {
            gene: "GENE1".to_string(),
            annotation,
            expression: Some(matrix),
            traces,
            plot,
            transcripts,
        }
    }

    fn render_string(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        render(&sample_report(), format, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_json_is_plotly_figure() {
        let json: serde_json::Value = serde_json::from_str(&render_string(OutputFormat::Json)).unwrap();
        assert!(json["data"].as_array().is_some_and(|d| !d.is_empty()));
        assert_eq!(json["layout"]["width"], 1800);

        let mut buffer = Vec::new();
        JsonOutput::compact().render(&sample_report(), &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_html_embeds_figure_and_table() {
        let html = render_string(OutputFormat::Html);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("isoplot-figure"));
        assert!(html.contains("cdn.plot.ly"));
        assert!(html.contains("<td>tx-b</td>"));
    }

    #[test]
    fn test_tsv_has_genomic_coordinates() {
        let tsv = render_string(OutputFormat::Tsv);
        let mut lines = tsv.lines();
        let header: Vec<&str> = lines.next().unwrap().split('\t').collect();
        assert_eq!(&header[..3], &["seqnames", "start", "end"]);
        assert!(header.contains(&"genomic_start"));

        let first: Vec<&str> = lines.next().unwrap().split('\t').collect();
        assert_eq!(first[0], "chr7");
        assert_eq!(first[1], "2");
        assert_eq!(tsv.lines().count(), 1 + 6);
    }

    #[test]
    fn test_plain_terminal_has_no_color_codes() {
        let mut buffer = Vec::new();
        OutputFactory::create_plain(OutputFormat::Terminal)
            .render(&sample_report(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("GENE1: 2 transcript(s)"));
        assert!(!text.contains('\u{1b}'));
    }
}
