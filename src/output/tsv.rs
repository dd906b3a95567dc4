//! Tab-separated output of the processed feature table

use std::io::Write;

use anyhow::Result;

use crate::pipeline::PlotReport;

use super::OutputFormatter;

/// One row per plotted feature: plotted coordinates, then genomic ones
pub struct TsvOutput;

impl OutputFormatter for TsvOutput {
    fn render(&self, report: &PlotReport, writer: &mut dyn Write) -> Result<()> {
        let table = report.annotation.to_table();
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        csv_writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
        for row in &table.rows {
            csv_writer.write_record(row.cells.iter().map(|c| c.display().into_owned()))?;
        }
        csv_writer.flush()?;

        Ok(())
    }
}
