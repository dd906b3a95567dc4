//! Parquet file parser

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType as ArrowType, Float64Type, Int64Type};

use crate::model::{CellType, CellValue, Column, Table};

use super::{Parser, ReadOptions};

/// Parser for Parquet files, read as Arrow record batches
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| Column::with_type(field.name().clone(), cell_type_of(field.data_type())))
            .collect();

        let mut table = Table::new(columns);

        let mut line_num = 1usize;
        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            let decoded: Vec<Vec<CellValue>> = batch
                .columns()
                .iter()
                .map(decode_column)
                .collect::<Result<_>>()?;

            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells = decoded.iter().map(|col| col[row_idx].clone()).collect();
                table.add_row(cells, line_num);
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

fn cell_type_of(arrow_type: &ArrowType) -> CellType {
    match arrow_type {
        ArrowType::Null => CellType::Null,
        ArrowType::Boolean => CellType::Bool,
        t if t.is_integer() => CellType::Int,
        t if t.is_floating() || matches!(t, ArrowType::Decimal128(_, _)) => CellType::Float,
        _ => CellType::String,
    }
}

/// Convert a whole Arrow column to cells by casting it to a common type
fn decode_column(array: &ArrayRef) -> Result<Vec<CellValue>> {
    let len = array.len();
    let cells = match cell_type_of(array.data_type()) {
        CellType::Null => vec![CellValue::Null; len],
        CellType::Bool => {
            let values = array.as_boolean();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bool(values.value(i))
                    }
                })
                .collect()
        }
        CellType::Int => {
            let casted = cast(array, &ArrowType::Int64).context("Failed to cast integer column")?;
            let values = casted.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Int(values.value(i))
                    }
                })
                .collect()
        }
        CellType::Float => {
            let casted = cast(array, &ArrowType::Float64).context("Failed to cast float column")?;
            let values = casted.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Float(values.value(i))
                    }
                })
                .collect()
        }
        _ => {
            let casted = cast(array, &ArrowType::Utf8).context("Failed to cast column to text")?;
            let values = casted.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::String(Cow::Owned(values.value(i).to_string()))
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}
