//! Long-format expression matrix: one record per transcript and sample

use indexmap::{IndexMap, IndexSet};

use super::table::CellValue;

/// Expression of one transcript in one sample
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRecord {
    pub transcript_id: String,
    pub gene_id: Option<String>,
    pub sample_id: String,
    /// One value per measure of the owning matrix
    pub values: Vec<f64>,
    /// One value per metadata column of the owning matrix
    pub metadata: Vec<CellValue>,
}

/// Expression values of many transcripts across samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionMatrix {
    /// Measure names, e.g. `counts`, `CPM`, `relative_abundance`
    pub measures: Vec<String>,
    /// Sample metadata columns attached to each record
    pub metadata_columns: Vec<String>,
    pub records: Vec<ExpressionRecord>,
}

impl ExpressionMatrix {
    pub fn new(measures: Vec<String>) -> Self {
        Self {
            measures,
            metadata_columns: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn measure_index(&self, measure: &str) -> Option<usize> {
        self.measures.iter().position(|m| m == measure)
    }

    pub fn has_measure(&self, measure: &str) -> bool {
        self.measure_index(measure).is_some()
    }

    /// Value of a measure in a record
    pub fn value(&self, record: &ExpressionRecord, measure: &str) -> Option<f64> {
        self.measure_index(measure)
            .and_then(|i| record.values.get(i))
            .copied()
    }

    /// Metadata cell of a record
    pub fn metadata_value<'a>(&self, record: &'a ExpressionRecord, column: &str) -> Option<&'a CellValue> {
        let idx = self.metadata_columns.iter().position(|c| c == column)?;
        record.metadata.get(idx)
    }

    /// Transcript ids in order of first appearance
    pub fn transcript_ids(&self) -> IndexSet<&str> {
        self.records.iter().map(|r| r.transcript_id.as_str()).collect()
    }

    /// Sample ids in order of first appearance
    pub fn sample_ids(&self) -> IndexSet<&str> {
        self.records.iter().map(|r| r.sample_id.as_str()).collect()
    }

    /// Records of one transcript
    pub fn records_for<'a>(&'a self, transcript_id: &'a str) -> impl Iterator<Item = &'a ExpressionRecord> {
        self.records
            .iter()
            .filter(move |r| r.transcript_id == transcript_id)
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&ExpressionRecord) -> bool,
    {
        self.records.retain(keep);
    }

    /// Sum of a measure per transcript, in order of first appearance
    pub fn total_by_transcript(&self, measure: &str) -> IndexMap<String, f64> {
        let mut totals: IndexMap<String, f64> = IndexMap::new();
        let Some(idx) = self.measure_index(measure) else {
            return totals;
        };
        for record in &self.records {
            let value = record.values.get(idx).copied().unwrap_or(0.0);
            *totals.entry(record.transcript_id.clone()).or_insert(0.0) += value;
        }
        totals
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tx: &str, sample: &str, counts: f64) -> ExpressionRecord {
        ExpressionRecord {
            transcript_id: tx.to_string(),
            gene_id: None,
            sample_id: sample.to_string(),
            values: vec![counts],
            metadata: vec!["ctrl".into()],
        }
    }

    #[test]
    fn test_totals_and_lookup() {
        let mut matrix = ExpressionMatrix::new(vec!["counts".to_string()]);
        matrix.metadata_columns = vec!["condition".to_string()];
        matrix.records = vec![
            record("tx1", "s1", 1.0),
            record("tx2", "s1", 5.0),
            record("tx1", "s2", 3.0),
        ];

        let totals = matrix.total_by_transcript("counts");
        assert_eq!(totals.get("tx1"), Some(&4.0));
        assert_eq!(totals.get("tx2"), Some(&5.0));
        assert!(matrix.total_by_transcript("CPM").is_empty());

        assert_eq!(matrix.records_for("tx1").count(), 2);
        assert_eq!(matrix.sample_ids().len(), 2);
        assert_eq!(
            matrix.metadata_value(&matrix.records[0], "condition"),
            Some(&CellValue::from("ctrl"))
        );
    }
}
