//! Transcript annotation: an ordered collection of features

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};

use super::feature::{Feature, FeatureType, Span, Strand};
use super::table::{CellValue, Row, Table};

/// Columns every annotation table must provide
pub const REQUIRED_COLUMNS: [&str; 6] = ["seqnames", "start", "end", "strand", "type", "transcript_id"];

const KNOWN_COLUMNS: [&str; 10] = [
    "seqnames",
    "start",
    "end",
    "strand",
    "type",
    "transcript_id",
    "transcript_name",
    "gene_id",
    "gene_name",
    "exon_number",
];

/// Features of one or more transcripts, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub features: Vec<Feature>,
}

impl Annotation {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Build an annotation from a table with one feature per row
    pub fn from_table(table: &Table) -> Result<Self> {
        table.require_columns(&REQUIRED_COLUMNS, "annotation")?;

        let idx = |name: &str| table.column_index(name);
        let seqnames_col = idx("seqnames");
        let start_col = idx("start");
        let end_col = idx("end");
        let strand_col = idx("strand");
        let type_col = idx("type");
        let transcript_id_col = idx("transcript_id");
        let transcript_name_col = idx("transcript_name");
        let gene_id_col = idx("gene_id");
        let gene_name_col = idx("gene_name");
        let exon_number_col = idx("exon_number");

        let extra: Vec<(usize, &str)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !KNOWN_COLUMNS.contains(&c.name.as_str()))
            .map(|(i, c)| (i, c.name.as_str()))
            .collect();

        let text = |row: &Row, col: Option<usize>| -> Option<String> {
            col.and_then(|i| row.get(i))
                .and_then(|v| v.as_text())
                .map(|s| s.into_owned())
        };
        let coordinate = |row: &Row, col: Option<usize>, name: &str| -> Result<i64> {
            let cell = col.and_then(|i| row.get(i)).unwrap_or(&CellValue::Null);
            cell.as_i64().ok_or_else(|| Error::InvalidCoordinate {
                column: name.to_string(),
                line: row.source_line,
                value: cell.display().into_owned(),
            })
        };

        let mut features = Vec::with_capacity(table.row_count());
        for row in &table.rows {
            let Some(tx) = text(row, transcript_id_col) else {
                continue;
            };

            let strand: Strand = text(row, strand_col).unwrap_or_default().parse()?;
            let kind = text(row, type_col).unwrap_or_default();

            let mut feature = Feature::new(
                text(row, seqnames_col).unwrap_or_default(),
                coordinate(row, start_col, "start")?,
                coordinate(row, end_col, "end")?,
                strand,
                FeatureType::from(kind.as_str()),
                tx,
            );
            feature.transcript_name = text(row, transcript_name_col);
            feature.gene_id = text(row, gene_id_col);
            feature.gene_name = text(row, gene_name_col);
            feature.exon_number = exon_number_col
                .and_then(|i| row.get(i))
                .and_then(|v| v.as_i64())
                .and_then(|n| u32::try_from(n).ok());

            for &(i, name) in &extra {
                if let Some(value) = row.get(i).and_then(|v| v.as_text()) {
                    feature.attributes.insert(name.to_string(), value.into_owned());
                }
            }

            features.push(feature);
        }

        Ok(Self { features })
    }

    /// Flatten back into a table; rescaled features carry `genomic_start`/`genomic_end`
    pub fn to_table(&self) -> Table {
        let attribute_names: IndexSet<&str> = self
            .features
            .iter()
            .flat_map(|f| f.attributes.keys().map(String::as_str))
            .collect();
        let has_genomic = self.features.iter().any(|f| f.genomic.is_some());

        let mut names: Vec<&str> = KNOWN_COLUMNS.to_vec();
        if has_genomic {
            names.extend(["genomic_start", "genomic_end"]);
        }
        names.extend(attribute_names.iter().copied());

        let mut table = Table::with_column_names(names);
        for (i, f) in self.features.iter().enumerate() {
            let mut cells: Vec<CellValue> = vec![
                f.seqname.as_str().into(),
                f.start.into(),
                f.end.into(),
                f.strand.as_str().into(),
                f.feature_type.as_str().into(),
                f.transcript_id.as_str().into(),
                f.transcript_name.clone().into(),
                f.gene_id.clone().into(),
                f.gene_name.clone().into(),
                f.exon_number.into(),
            ];
            if has_genomic {
                let genomic = f.genomic_span();
                cells.push(genomic.start.into());
                cells.push(genomic.end.into());
            }
            for name in &attribute_names {
                cells.push(f.attributes.get(*name).map(String::as_str).into());
            }
            table.add_row(cells, i + 1);
        }
        table.infer_column_types();
        table
    }

    /// Transcript ids in order of first appearance
    pub fn transcript_ids(&self) -> IndexSet<&str> {
        self.features.iter().map(|f| f.transcript_id.as_str()).collect()
    }

    /// Features grouped by transcript, in order of first appearance
    pub fn by_transcript(&self) -> IndexMap<&str, Vec<&Feature>> {
        let mut groups: IndexMap<&str, Vec<&Feature>> = IndexMap::new();
        for feature in &self.features {
            groups.entry(feature.transcript_id.as_str()).or_default().push(feature);
        }
        groups
    }

    pub fn exons(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.is_exon())
    }

    pub fn of_type<'a>(&'a self, kind: &'a FeatureType) -> impl Iterator<Item = &'a Feature> {
        self.features.iter().filter(move |f| &f.feature_type == kind)
    }

    /// A new annotation with only the features matching the predicate
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Feature) -> bool,
    {
        Self {
            features: self.features.iter().filter(|f| keep(f)).cloned().collect(),
        }
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Feature) -> bool,
    {
        self.features.retain(keep);
    }

    pub fn extend(&mut self, other: Annotation) {
        self.features.extend(other.features);
    }

    /// Smallest and largest coordinate covered by any feature
    pub fn bounds(&self) -> Option<Span> {
        let start = self.features.iter().map(|f| f.start).min()?;
        let end = self.features.iter().map(|f| f.end).max()?;
        Some(Span::new(start, end))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<Feature> for Annotation {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
