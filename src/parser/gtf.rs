//! GTF (GFF2) annotation parser

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::error::Error;
use crate::model::{CellType, CellValue, Column, Table};

use super::{Parser, ReadOptions};

/// Fixed GTF columns, named the way the rest of the crate expects them
const GTF_COLUMNS: [&str; 8] = [
    "seqnames", "source", "type", "start", "end", "score", "strand", "frame",
];

/// Parser for GTF files; every attribute key becomes a column
pub struct GtfParser;

/// One parsed GTF line
#[derive(Debug)]
struct GtfRecord {
    line: usize,
    seqname: String,
    source: String,
    feature: String,
    start: i64,
    end: i64,
    score: Option<f64>,
    strand: String,
    frame: Option<i64>,
    attributes: IndexMap<String, String>,
}

impl Parser for GtfParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open GTF file: {}", path.display()))?;

        let mut lines = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", idx + 1))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            lines.push((idx + 1, line));
        }

        let records = lines
            .par_iter()
            .map(|(line_num, line)| parse_line(line, *line_num))
            .collect::<std::result::Result<Vec<_>, Error>>()?;

        log::info!("Parsed {} GTF records from {}", records.len(), path.display());
        Ok(records_to_table(records))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "gtf" | "gff2")
    }
}

fn parse_line(line: &str, line_num: usize) -> std::result::Result<GtfRecord, Error> {
    let malformed = |message: String| Error::Gtf {
        line: line_num,
        message,
    };

    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() != 9 {
        return Err(malformed(format!("expected 9 fields, found {}", fields.len())));
    }

    let coordinate = |value: &str, name: &str| {
        value
            .parse::<i64>()
            .map_err(|_| malformed(format!("{} is not an integer: '{}'", name, value)))
    };
    let start = coordinate(fields[3], "start")?;
    let end = coordinate(fields[4], "end")?;
    if start > end {
        return Err(malformed(format!("start {} is after end {}", start, end)));
    }

    let strand = fields[6];
    if !matches!(strand, "+" | "-" | ".") {
        return Err(malformed(format!("invalid strand '{}'", strand)));
    }

    Ok(GtfRecord {
        line: line_num,
        seqname: fields[0].to_string(),
        source: fields[1].to_string(),
        feature: fields[2].to_string(),
        start,
        end,
        score: fields[5].parse().ok(),
        strand: strand.to_string(),
        frame: fields[7].parse().ok(),
        attributes: parse_attributes(fields[8]),
    })
}

/// Parse `key "value"; key2 "value2";` pairs; repeated keys are joined by commas
fn parse_attributes(field: &str) -> IndexMap<String, String> {
    let mut attributes: IndexMap<String, String> = IndexMap::new();

    for pair in field.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once(char::is_whitespace) {
            Some((key, value)) => (key, value.trim().trim_matches('"')),
            None => (pair, ""),
        };

        attributes
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    attributes
}

fn records_to_table(records: Vec<GtfRecord>) -> Table {
    let attribute_keys: IndexSet<String> = records
        .iter()
        .flat_map(|r| r.attributes.keys().cloned())
        .collect();

    let mut columns: Vec<Column> = vec![
        Column::with_type(GTF_COLUMNS[0], CellType::String),
        Column::with_type(GTF_COLUMNS[1], CellType::String),
        Column::with_type(GTF_COLUMNS[2], CellType::String),
        Column::with_type(GTF_COLUMNS[3], CellType::Int),
        Column::with_type(GTF_COLUMNS[4], CellType::Int),
        Column::with_type(GTF_COLUMNS[5], CellType::Float),
        Column::with_type(GTF_COLUMNS[6], CellType::String),
        Column::with_type(GTF_COLUMNS[7], CellType::Int),
    ];
    columns.extend(
        attribute_keys
            .iter()
            .map(|key| Column::with_type(key.as_str(), CellType::String)),
    );

    let mut table = Table::new(columns);
    for mut record in records {
        let mut cells: Vec<CellValue> = vec![
            record.seqname.into(),
            record.source.into(),
            record.feature.into(),
            record.start.into(),
            record.end.into(),
            record.score.into(),
            record.strand.into(),
            record.frame.into(),
        ];
        for key in &attribute_keys {
            cells.push(record.attributes.swap_remove(key).into());
        }
        table.add_row(cells, record.line);
    }

    table
}
