//! Loading expression matrices (wide, one column per sample) into long format

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::model::{CellValue, ExpressionMatrix, ExpressionRecord, Table};

use super::{ParserFactory, ReadOptions};

/// Measure name used for counts-per-million values
pub const CPM_MEASURE: &str = "CPM";
/// Measure name used for within-gene relative abundance (percent)
pub const RELATIVE_ABUNDANCE_MEASURE: &str = "relative_abundance";

/// Options for reading an expression matrix
#[derive(Debug, Clone)]
pub struct ExpressionOptions {
    pub transcript_id_column: String,
    pub gene_id_column: Option<String>,
    pub sample_id_column: String,
    /// Name given to the raw values, e.g. `counts` or `TPM`
    pub measure_name: String,
    pub cpm_normalization: bool,
    pub relative_abundance: bool,
    pub read: ReadOptions,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        Self {
            transcript_id_column: "transcript_id".to_string(),
            gene_id_column: None,
            sample_id_column: "sample_id".to_string(),
            measure_name: "counts".to_string(),
            cpm_normalization: false,
            relative_abundance: false,
            read: ReadOptions::default(),
        }
    }
}

/// Sample metadata keyed by sample id
struct SampleMetadata {
    columns: Vec<String>,
    rows: IndexMap<String, Vec<CellValue>>,
}

/// Read an expression matrix and optional sample metadata into long format
pub fn read_expression_matrix(
    expression_path: &Path,
    metadata_path: Option<&Path>,
    options: &ExpressionOptions,
) -> Result<ExpressionMatrix> {
    let factory = ParserFactory::new();
    let table = factory
        .parse(expression_path, &options.read)
        .with_context(|| format!("Failed to parse expression matrix: {}", expression_path.display()))?;

    let metadata = match metadata_path {
        Some(path) => {
            let meta_table = factory
                .parse(path, &options.read)
                .with_context(|| format!("Failed to parse metadata: {}", path.display()))?;
            Some(load_metadata(&meta_table, &options.sample_id_column)?)
        }
        None => None,
    };

    let matrix = expression_from_table(&table, metadata.as_ref(), options)?;
    log::info!(
        "Loaded {} expression records ({} transcripts, {} samples)",
        matrix.len(),
        matrix.transcript_ids().len(),
        matrix.sample_ids().len()
    );
    Ok(matrix)
}

fn load_metadata(table: &Table, sample_id_column: &str) -> crate::Result<SampleMetadata> {
    table.require_columns(&[sample_id_column], "metadata")?;
    let sample_idx = table.column_index(sample_id_column).unwrap_or_default();

    let columns = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != sample_idx)
        .map(|(_, c)| c.name.clone())
        .collect();

    let mut rows = IndexMap::new();
    for row in &table.rows {
        let Some(sample) = row.get(sample_idx).and_then(|v| v.as_text()) else {
            continue;
        };
        let values = row
            .cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != sample_idx)
            .map(|(_, v)| v.clone())
            .collect();
        rows.insert(sample.into_owned(), values);
    }

    Ok(SampleMetadata { columns, rows })
}

fn expression_from_table(
    table: &Table,
    metadata: Option<&SampleMetadata>,
    options: &ExpressionOptions,
) -> crate::Result<ExpressionMatrix> {
    table.require_columns(&[options.transcript_id_column.as_str()], "expression matrix")?;

    let tx_idx = table.column_index(&options.transcript_id_column).unwrap_or_default();
    let gene_idx = options
        .gene_id_column
        .as_deref()
        .and_then(|name| table.column_index(name));

    match (options.gene_id_column.as_deref(), gene_idx) {
        (Some(name), None) if options.relative_abundance => {
            return Err(Error::MissingColumns {
                table: "expression matrix".to_string(),
                columns: vec![name.to_string()],
            });
        }
        (None, _) if options.relative_abundance => return Err(Error::MissingGeneColumn),
        (Some(name), None) => {
            log::debug!("No gene id column '{}' in expression matrix, reading without one", name);
        }
        _ => {}
    }

    let mut samples: Vec<(usize, &str)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != tx_idx && Some(*i) != gene_idx)
        .map(|(i, c)| (i, c.name.as_str()))
        .collect();

    if samples.is_empty() {
        return Err(Error::NoSampleColumns);
    }

    if let Some(meta) = metadata {
        let in_matrix: IndexSet<&str> = samples.iter().map(|(_, name)| *name).collect();
        let missing_meta: Vec<&str> = in_matrix
            .iter()
            .copied()
            .filter(|s| !meta.rows.contains_key(*s))
            .collect();
        let missing_matrix: Vec<&str> = meta
            .rows
            .keys()
            .map(String::as_str)
            .filter(|s| !in_matrix.contains(s))
            .collect();

        if !missing_meta.is_empty() {
            log::warn!(
                "{} sample(s) in the expression matrix are missing from the metadata and will be dropped: {}",
                missing_meta.len(),
                missing_meta.join(", ")
            );
        }
        if !missing_matrix.is_empty() {
            log::warn!(
                "{} sample(s) in the metadata are missing from the expression matrix: {}",
                missing_matrix.len(),
                missing_matrix.join(", ")
            );
        }

        samples.retain(|(_, name)| meta.rows.contains_key(*name));
        if samples.is_empty() {
            return Err(Error::NoMatchingSamples);
        }
    }

    // Raw values, one vector per kept row, aligned with `samples`
    let mut ids: Vec<(String, Option<String>)> = Vec::with_capacity(table.row_count());
    let mut raw: Vec<Vec<f64>> = Vec::with_capacity(table.row_count());
    for row in &table.rows {
        let Some(tx) = row.get(tx_idx).and_then(|v| v.as_text()) else {
            continue;
        };
        let gene = gene_idx
            .and_then(|i| row.get(i))
            .and_then(|v| v.as_text())
            .map(|s| s.into_owned());

        let values = samples
            .iter()
            .map(|&(i, name)| match row.get(i) {
                None | Some(CellValue::Null) => Ok(0.0),
                Some(CellValue::Int(v)) => Ok(*v as f64),
                Some(CellValue::Float(v)) => Ok(*v),
                Some(_) => Err(Error::NonNumericSample {
                    column: name.to_string(),
                    line: row.source_line,
                }),
            })
            .collect::<crate::Result<Vec<f64>>>()?;

        ids.push((tx.into_owned(), gene));
        raw.push(values);
    }

    let mut measures = vec![options.measure_name.clone()];
    if options.cpm_normalization {
        measures.push(CPM_MEASURE.to_string());
    }
    if options.relative_abundance {
        measures.push(RELATIVE_ABUNDANCE_MEASURE.to_string());
    }

    let sample_totals: Vec<f64> = (0..samples.len())
        .map(|s| raw.iter().map(|values| values[s]).sum())
        .collect();

    let mut gene_totals: FxHashMap<(&str, usize), f64> = FxHashMap::default();
    if options.relative_abundance {
        for ((_, gene), values) in ids.iter().zip(&raw) {
            if let Some(gene) = gene {
                for (s, value) in values.iter().enumerate() {
                    *gene_totals.entry((gene.as_str(), s)).or_insert(0.0) += value;
                }
            }
        }
    }

    let mut matrix = ExpressionMatrix::new(measures);
    if let Some(meta) = metadata {
        matrix.metadata_columns = meta.columns.clone();
    }

    for ((tx, gene), values) in ids.iter().zip(&raw) {
        for (s, &(_, sample)) in samples.iter().enumerate() {
            let value = values[s];
            let mut record_values = vec![value];

            if options.cpm_normalization {
                record_values.push(ratio(value, sample_totals[s]) * 1e6);
            }
            if options.relative_abundance {
                let gene_total = gene
                    .as_deref()
                    .and_then(|g| gene_totals.get(&(g, s)))
                    .copied()
                    .unwrap_or(0.0);
                record_values.push(ratio(value, gene_total) * 100.0);
            }

            let metadata_values = metadata
                .and_then(|meta| meta.rows.get(sample))
                .cloned()
                .unwrap_or_default();

            matrix.records.push(ExpressionRecord {
                transcript_id: tx.clone(),
                gene_id: gene.clone(),
                sample_id: sample.to_string(),
                values: record_values,
                metadata: metadata_values,
            });
        }
    }

    Ok(matrix)
}

fn ratio(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total
    }
}
