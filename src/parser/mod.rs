//! Parser layer for reading annotation and expression tables

mod annotation;
mod csv;
mod excel;
mod expression;
mod gtf;
mod json;
mod parquet;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::annotation::{load_annotation, read_gtf};
pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::expression::{
    read_expression_matrix, ExpressionOptions, CPM_MEASURE, RELATIVE_ABUNDANCE_MEASURE,
};
pub use self::gtf::GtfParser;
pub use self::json::JsonParser;
pub use self::parquet::ParquetParser;

/// Options shared by all table parsers
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// For spreadsheets: which sheet to read (first sheet otherwise)
    pub sheet_name: Option<String>,
}

impl ReadOptions {
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }
}

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(GtfParser),
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(ParquetParser),
                Box::new(JsonParser),
            ],
        }
    }

    /// Get a parser for the given file path, sniffing the content when the
    /// extension is unknown
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if let Some(parser) = self.find(&ext) {
            return Ok(parser);
        }

        if let Some(detected) = detect_format(path) {
            log::debug!("Detected {} content in {}", detected, path.display());
            if let Some(parser) = self.find(detected) {
                return Ok(parser);
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    fn find(&self, ext: &str) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|p| p.supports_extension(ext))
            .map(|p| p.as_ref())
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table> {
        let parser = self.get_parser(path)?;
        parser.parse(path, options)
    }
}

/// Detect file format from content (for files without a known extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8];
    let bytes_read = reader.read(&mut buffer).ok()?;

    if bytes_read >= 4 {
        match &buffer[0..4] {
            b"PAR1" => return Some("parquet"),
            b"PK\x03\x04" => return Some("xlsx"),
            b"\xD0\xCF\x11\xE0" => return Some("xls"),
            _ => {}
        }
    }

    reader.seek_relative(-(bytes_read as i64)).ok()?;
    let first_data_line = reader
        .lines()
        .map_while(|line| line.ok())
        .find(|line| !line.trim().is_empty() && !line.starts_with('#'))?;

    let trimmed = first_data_line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    let fields: Vec<&str> = first_data_line.split('\t').collect();
    if fields.len() == 9 && fields[3].parse::<i64>().is_ok() && fields[4].parse::<i64>().is_ok() {
        return Some("gtf");
    }

    if fields.len() > 1 {
        Some("tsv")
    } else {
        Some("csv")
    }
}
