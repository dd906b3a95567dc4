//! JSON output format: the figure as Plotly JSON

use std::io::Write;

use anyhow::{Context, Result};

use crate::pipeline::PlotReport;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &PlotReport, writer: &mut dyn Write) -> Result<()> {
        let json = report.plot.to_json();

        if self.pretty {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Figure serialized to invalid JSON")?;
            serde_json::to_writer_pretty(&mut *writer, &value)?;
        } else {
            writer.write_all(json.as_bytes())?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
