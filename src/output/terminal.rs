//! Colored terminal output

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorSpec, NoColor, WriteColor};

use crate::pipeline::{PlotReport, TranscriptSummary};

use super::OutputFormatter;

/// Terminal output with colors
pub struct TerminalOutput {
    color: bool,
}

impl TerminalOutput {
    /// Colors are used when stdout is a terminal
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn write_header(&self, report: &PlotReport, out: &mut dyn WriteColor) -> Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(out, "{}", report.gene)?;
        out.reset()?;

        let samples = report
            .expression
            .as_ref()
            .map(|m| format!(", {} sample(s)", m.sample_ids().len()))
            .unwrap_or_default();
        writeln!(out, ": {} transcript(s){}", report.transcripts.len(), samples)?;
        writeln!(out)?;
        Ok(())
    }

    fn write_transcripts(&self, report: &PlotReport, out: &mut dyn WriteColor) -> Result<()> {
        if report.transcripts.is_empty() {
            writeln!(out, "No transcripts.")?;
            return Ok(());
        }
        let with_expression = report.expression.is_some();
        writeln!(out, "{}", build_table(&report.transcripts, with_expression))?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &PlotReport, writer: &mut dyn Write) -> Result<()> {
        if self.color {
            let mut out = Ansi::new(writer);
            self.write_header(report, &mut out)?;
            self.write_transcripts(report, &mut out)
        } else {
            let mut out = NoColor::new(writer);
            self.write_header(report, &mut out)?;
            self.write_transcripts(report, &mut out)
        }
    }
}

/// Build a formatted table of transcript summaries
fn build_table(transcripts: &[TranscriptSummary], with_expression: bool) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["transcript", "name", "exons", "start", "end", "length"];
    if with_expression {
        header.push("total expression");
    }
    builder.push_record(header);

    for tx in transcripts {
        let mut record = vec![
            tx.transcript_id.clone(),
            tx.transcript_name.clone(),
            tx.exons.to_string(),
            tx.start.to_string(),
            tx.end.to_string(),
            tx.length.to_string(),
        ];
        if with_expression {
            record.push(
                tx.total_expression
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
            );
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_plain_table() {
        let report = sample_report();
        let mut buffer = Vec::new();
        TerminalOutput::with_color(false)
            .render(&report, &mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("GENE1: 2 transcript(s), 2 sample(s)"));
        assert!(text.contains("total expression"));
        assert!(text.contains("tx-a"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_header() {
        let report = sample_report();
        let mut buffer = Vec::new();
        TerminalOutput::with_color(true)
            .render(&report, &mut buffer)
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains('\u{1b}'));
    }
}
