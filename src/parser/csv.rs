//! Delimited text parser (CSV, TSV)

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{CellValue, Column, Table};

use super::{Parser, ReadOptions};

/// Parser for comma- or tab-separated files
pub struct CsvParser;

impl CsvParser {
    fn delimiter_for(path: &Path) -> u8 {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "tsv" | "tab" | "txt" => b'\t',
            "csv" => b',',
            // Extension-less files: tab wins if the header has one
            _ => match std::fs::read_to_string(path) {
                Ok(text) if text.lines().next().is_some_and(|l| l.contains('\t')) => b'\t',
                _ => b',',
            },
        }
    }
}

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(Self::delimiter_for(path))
            .has_headers(true)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .context("Failed to read header row")?
            .clone();

        let columns: Vec<Column> = headers.iter().map(|name| Column::new(name.trim())).collect();
        let mut table = Table::new(columns);

        for (line_num, result) in reader.records().enumerate() {
            // +2 for 1-indexing and header
            let record = result.with_context(|| format!("Failed to read row {}", line_num + 2))?;
            let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
            table.add_row(cells, line_num + 2);
        }

        table.infer_column_types();
        log::debug!(
            "Read {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "tab" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference
pub(crate) fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed == "NA"
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    CellValue::String(Cow::Owned(trimmed.to_string()))
}
