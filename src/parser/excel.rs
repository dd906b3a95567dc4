//! Spreadsheet parser (xlsx, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::model::{CellValue, Column, Table};

use super::{Parser, ReadOptions};

/// Parser for Excel and OpenDocument spreadsheets
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

        let sheet_name = match options.sheet_name {
            Some(ref name) => name.clone(),
            None => match workbook.sheet_names().first() {
                Some(first) => first.clone(),
                None => bail!("No sheets found in workbook: {}", path.display()),
            },
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm" | "xlsb")
    }
}

/// First row is the header; blank header cells get positional names
pub(super) fn parse_range(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let header_row = rows.next().context("Empty sheet")?;

    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell.to_string();
            let name = name.trim();
            if name.is_empty() {
                Column::new(format!("column_{}", i + 1))
            } else {
                Column::new(name)
            }
        })
        .collect();

    let mut table = Table::new(columns);

    for (line_num, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        table.add_row(cells, line_num + 2); // +2 for 1-indexing and header
    }

    table.infer_column_types();
    Ok(table)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => super::csv::parse_cell_value(s),
        Data::Float(f) => {
            // Spreadsheets store every number as a float
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let text = dt.to_string();
            chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                .map(CellValue::DateTime)
                .unwrap_or_else(|_| CellValue::String(Cow::Owned(text)))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Float(12.0)), CellValue::Int(12));
        assert_eq!(convert_cell(&Data::Float(0.5)), CellValue::Float(0.5));
        assert_eq!(convert_cell(&Data::String("NA".to_string())), CellValue::Null);
        assert_eq!(
            convert_cell(&Data::String("tx1".to_string())),
            CellValue::from("tx1")
        );
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
    }

    #[test]
    fn test_parse_range_names_blank_headers() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("transcript_id".to_string()));
        range.set_value((1, 0), Data::String("tx1".to_string()));
        range.set_value((1, 1), Data::Float(4.0));

        let table = parse_range(&range).unwrap();
        assert_eq!(table.columns[1].name, "column_2");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(0, "column_2"), Some(&CellValue::Int(4)));
    }
}
