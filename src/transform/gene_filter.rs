//! Restricting an annotation (and its expression) to a single gene

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};
use crate::model::{Annotation, ExpressionMatrix};

/// How many transcripts to keep once ordered by expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopTranscripts {
    #[default]
    All,
    Top(usize),
}

impl FromStr for TopTranscripts {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TopTranscripts::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(TopTranscripts::Top(n)),
            _ => Err(Error::InvalidTopTranscripts(s.to_string())),
        }
    }
}

impl fmt::Display for TopTranscripts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopTranscripts::All => f.write_str("all"),
            TopTranscripts::Top(n) => write!(f, "{}", n),
        }
    }
}

/// Options for [`gene_filtering`]
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Annotation column compared against the target gene
    pub gene_id_column: String,
    /// Measure summed across samples to rank transcripts
    pub expression_column: String,
    pub order_by_expression: bool,
    pub keep_top: TopTranscripts,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            gene_id_column: "gene_name".to_string(),
            expression_column: "counts".to_string(),
            order_by_expression: true,
            keep_top: TopTranscripts::All,
        }
    }
}

impl FilterOptions {
    pub fn with_gene_id_column(mut self, column: impl Into<String>) -> Self {
        self.gene_id_column = column.into();
        self
    }

    pub fn with_expression_column(mut self, column: impl Into<String>) -> Self {
        self.expression_column = column.into();
        self
    }

    pub fn with_order_by_expression(mut self, order: bool) -> Self {
        self.order_by_expression = order;
        self
    }

    pub fn with_keep_top(mut self, keep_top: TopTranscripts) -> Self {
        self.keep_top = keep_top;
        self
    }
}

/// Keep the features of `target_gene` and the expression of its transcripts
///
/// With an expression matrix, both sides are reduced to the transcripts they
/// have in common and, when ordering is on, sorted by total expression.
pub fn gene_filtering(
    target_gene: &str,
    annotation: &Annotation,
    expression: Option<&ExpressionMatrix>,
    options: &FilterOptions,
) -> Result<(Annotation, Option<ExpressionMatrix>)> {
    let mut filtered = annotation
        .filter(|f| f.field(&options.gene_id_column).as_deref() == Some(target_gene));
    if filtered.is_empty() {
        return Err(Error::GeneNotFound {
            gene: target_gene.to_string(),
            column: options.gene_id_column.clone(),
        });
    }
    log::debug!("{} features annotated to {}", filtered.len(), target_gene);

    let Some(expression) = expression else {
        return Ok((filtered, None));
    };

    if !expression.has_measure(&options.expression_column) {
        return Err(Error::UnknownMeasure(options.expression_column.clone()));
    }

    let annotation_tx: IndexSet<String> = filtered
        .features
        .iter()
        .map(|f| f.transcript_id.clone())
        .collect();
    let mut matrix = expression.clone();
    matrix.retain(|r| annotation_tx.contains(&r.transcript_id));
    if matrix.is_empty() {
        return Err(Error::EmptyExpression {
            gene: target_gene.to_string(),
            column: "transcript_id".to_string(),
        });
    }

    let expression_tx: IndexSet<String> = matrix.transcript_ids().into_iter().map(String::from).collect();
    warn_missing(&annotation_tx, &expression_tx, "annotation", "expression matrix");
    warn_missing(&expression_tx, &annotation_tx, "expression matrix", "annotation");

    filtered.retain(|f| expression_tx.contains(&f.transcript_id));

    if !options.order_by_expression {
        return Ok((filtered, Some(matrix)));
    }

    let mut ranked: Vec<(String, f64)> = matrix
        .total_by_transcript(&options.expression_column)
        .into_iter()
        .collect();
    // stable: ties keep first appearance
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    if let TopTranscripts::Top(n) = options.keep_top {
        if n < ranked.len() {
            ranked.truncate(n);
        } else {
            log::warn!(
                "The number of top transcripts to keep ({}) is not below the number of transcripts ({}); all transcripts will be kept",
                n,
                ranked.len()
            );
        }
    }

    let rank: IndexMap<String, usize> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (tx, _))| (tx, i))
        .collect();

    filtered.retain(|f| rank.contains_key(&f.transcript_id));
    filtered
        .features
        .sort_by_key(|f| rank.get(&f.transcript_id).copied().unwrap_or(usize::MAX));

    matrix.retain(|r| rank.contains_key(&r.transcript_id));
    matrix
        .records
        .sort_by_key(|r| rank.get(&r.transcript_id).copied().unwrap_or(usize::MAX));

    log::info!("Kept {} transcript(s) of {}", rank.len(), target_gene);
    Ok((filtered, Some(matrix)))
}

fn warn_missing(present: &IndexSet<String>, other: &IndexSet<String>, here: &str, there: &str) {
    let mut missing: Vec<&str> = present
        .iter()
        .filter(|tx| !other.contains(*tx))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        return;
    }
    missing.sort_unstable();
    log::warn!(
        "{} transcript(s) are present in the {} but missing in the {}. Missing transcripts: {}. \
         Only transcripts present in both will be returned.",
        missing.len(),
        here,
        there,
        missing.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpressionRecord, Feature, FeatureType, Strand};

    fn exon(tx: &str, gene: &str, start: i64) -> Feature {
        Feature::new("chr1", start, start + 50, Strand::Forward, FeatureType::Exon, tx)
            .with_gene(gene.to_lowercase(), gene)
    }

    fn annotation() -> Annotation {
        Annotation::new(vec![
            exon("t1", "ABC", 100),
            exon("t1", "ABC", 300),
            exon("t2", "ABC", 120),
            exon("t3", "ABC", 150),
            exon("t9", "XYZ", 5000),
        ])
    }

    fn expression() -> ExpressionMatrix {
        let mut matrix = ExpressionMatrix::new(vec!["counts".to_string()]);
        for (tx, sample, value) in [
            ("t1", "s1", 1.0),
            ("t1", "s2", 1.0),
            ("t2", "s1", 10.0),
            ("t2", "s2", 5.0),
            ("t3", "s1", 4.0),
            ("t4", "s1", 100.0),
            ("t9", "s1", 7.0),
        ] {
            matrix.records.push(ExpressionRecord {
                transcript_id: tx.to_string(),
                gene_id: None,
                sample_id: sample.to_string(),
                values: vec![value],
                metadata: Vec::new(),
            });
        }
        matrix
    }

    #[test]
    fn test_top_transcripts_parsing() {
        assert_eq!("all".parse::<TopTranscripts>().unwrap(), TopTranscripts::All);
        assert_eq!("3".parse::<TopTranscripts>().unwrap(), TopTranscripts::Top(3));
        assert!(matches!(
            "0".parse::<TopTranscripts>(),
            Err(Error::InvalidTopTranscripts(_))
        ));
        assert!("many".parse::<TopTranscripts>().is_err());
    }

    #[test]
    fn test_annotation_only() {
        let (filtered, expr) =
            gene_filtering("ABC", &annotation(), None, &FilterOptions::default()).unwrap();
        assert_eq!(filtered.len(), 4);
        assert!(expr.is_none());
    }

    #[test]
    fn test_unknown_gene() {
        let err = gene_filtering("NOPE", &annotation(), None, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, Error::GeneNotFound { .. }));
        assert!(err.to_string().contains("gene_name"));
    }

    #[test]
    fn test_orders_by_total_expression() {
        let matrix = expression();
        let (filtered, expr) =
            gene_filtering("ABC", &annotation(), Some(&matrix), &FilterOptions::default()).unwrap();

        let order: Vec<_> = filtered.transcript_ids().into_iter().collect();
        assert_eq!(order, vec!["t2", "t3", "t1"]);

        let expr = expr.unwrap();
        let expr_order: Vec<_> = expr.transcript_ids().into_iter().collect();
        assert_eq!(expr_order, vec!["t2", "t3", "t1"]);
        assert!(expr.records.iter().all(|r| r.transcript_id != "t4"));
    }

    #[test]
    fn test_keep_top_and_gene_id_column() {
        let matrix = expression();
        let options = FilterOptions::default()
            .with_gene_id_column("gene_id")
            .with_keep_top(TopTranscripts::Top(1));
        let (filtered, expr) = gene_filtering("abc", &annotation(), Some(&matrix), &options).unwrap();
        assert_eq!(filtered.transcript_ids().len(), 1);
        assert_eq!(filtered.features[0].transcript_id, "t2");
        assert_eq!(expr.unwrap().len(), 2);

        let options = FilterOptions::default().with_keep_top(TopTranscripts::Top(10));
        let (filtered, _) = gene_filtering("ABC", &annotation(), Some(&matrix), &options).unwrap();
        assert_eq!(filtered.transcript_ids().len(), 3);
    }

    #[test]
    fn test_no_ordering_keeps_annotation_order() {
        let matrix = expression();
        let options = FilterOptions::default().with_order_by_expression(false);
        let (filtered, _) = gene_filtering("ABC", &annotation(), Some(&matrix), &options).unwrap();
        let order: Vec<_> = filtered.transcript_ids().into_iter().collect();
        assert_eq!(order, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_expression_errors() {
        let mut matrix = expression();
        let options = FilterOptions::default().with_expression_column("TPM");
        assert!(matches!(
            gene_filtering("ABC", &annotation(), Some(&matrix), &options),
            Err(Error::UnknownMeasure(_))
        ));

        matrix.retain(|r| r.transcript_id == "t9");
        assert!(matches!(
            gene_filtering("ABC", &annotation(), Some(&matrix), &FilterOptions::default()),
            Err(Error::EmptyExpression { .. })
        ));
    }
}
