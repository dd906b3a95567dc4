//! JSON parser: an array of objects, a single object, or JSON lines

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::model::{CellValue, Column, Table};

use super::{Parser, ReadOptions};

/// Parser for JSON record files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;

        let items = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(arr)) => arr,
            Ok(value @ Value::Object(_)) => vec![value],
            Ok(_) => bail!("JSON must be an array or object"),
            // Not a single document: try one object per line
            Err(_) => text
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line)
                        .with_context(|| format!("Failed to parse JSON line {}", i + 1))
                })
                .collect::<Result<Vec<Value>>>()?,
        };

        if items.is_empty() {
            bail!("JSON file contains no records: {}", path.display());
        }

        let mut column_names: IndexSet<String> = IndexSet::new();
        for item in &items {
            match item {
                Value::Object(obj) => column_names.extend(obj.keys().cloned()),
                _ => bail!("JSON records must be objects"),
            }
        }

        let mut table = Table::new(column_names.iter().map(Column::new).collect());

        for (line_num, item) in items.iter().enumerate() {
            if let Value::Object(obj) = item {
                let cells = column_names
                    .iter()
                    .map(|key| json_value_to_cell(obj.get(key)))
                    .collect();
                table.add_row(cells, line_num + 1);
            }
        }

        table.infer_column_types();
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json" | "jsonl" | "ndjson")
    }
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => CellValue::Int(i),
            (None, Some(f)) => CellValue::Float(f),
            _ => CellValue::String(Cow::Owned(n.to_string())),
        },
        Some(Value::String(s)) => CellValue::String(Cow::Owned(s.clone())),
        Some(nested) => CellValue::String(Cow::Owned(nested.to_string())),
    }
}
