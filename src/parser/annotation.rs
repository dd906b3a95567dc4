//! Loading transcript annotations from GTF or tabular files

use std::path::Path;

use anyhow::{Context, Result};

use crate::error::Error;
use crate::model::{Annotation, Feature};
use crate::transform::calculate_exon_number;

use super::{ParserFactory, ReadOptions};

/// Read a GTF file into an annotation of exons, CDS and UTR features
pub fn read_gtf(path: &Path) -> Result<Annotation> {
    load_annotation(path, &ReadOptions::default())
}

/// Read any supported table format into an annotation
///
/// Only exon, CDS and UTR features are kept. Missing gene and transcript
/// names fall back to their ids, and exon numbers are computed when any exon
/// lacks one.
pub fn load_annotation(path: &Path, options: &ReadOptions) -> Result<Annotation> {
    let mut table = ParserFactory::new()
        .parse(path, options)
        .with_context(|| format!("Failed to parse annotation: {}", path.display()))?;
    if let Some(tx_idx) = table.column_index("transcript_id") {
        table.retain_rows(|row| {
            row.get(tx_idx)
                .and_then(|v| v.as_text())
                .is_some_and(|tx| !tx.is_empty())
        });
    }

    let mut annotation = Annotation::from_table(&table)
        .with_context(|| format!("Invalid annotation: {}", path.display()))?;

    let total = annotation.len();
    annotation.retain(|f| f.is_exon() || f.feature_type.is_exonic_part());
    log::debug!(
        "Kept {} of {} features (exon, CDS, UTR) from {}",
        annotation.len(),
        total,
        path.display()
    );

    if annotation.is_empty() {
        return Err(Error::EmptyAnnotation)
            .with_context(|| format!("No exon, CDS or UTR features in {}", path.display()));
    }

    annotation.features.iter_mut().for_each(fill_names);

    if annotation.exons().any(|f| f.exon_number.is_none()) {
        log::info!("Exon numbers missing, calculating them from exon order");
        annotation = calculate_exon_number(annotation);
    }

    Ok(annotation)
}

fn fill_names(feature: &mut Feature) {
    if feature.gene_name.is_none() {
        feature.gene_name = feature.gene_id.clone();
    }
    if feature.transcript_name.is_none() {
        feature.transcript_name = Some(feature.transcript_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::model::FeatureType;

    #[test]
    fn test_read_gtf_keeps_exonic_features() {
        let mut file = tempfile::Builder::new().suffix(".gtf").tempfile().unwrap();
        let lines = [
            "chr2\tsrc\tgene\t1\t900\t.\t-\t.\tgene_id \"G2\";",
            "chr2\tsrc\ttranscript\t1\t900\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T9\";",
            "chr2\tsrc\texon\t1\t100\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T9\";",
            "chr2\tsrc\texon\t800\t900\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T9\";",
            "chr2\tsrc\tCDS\t820\t880\t.\t-\t0\tgene_id \"G2\"; transcript_id \"T9\";",
        ];
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }

        let annotation = read_gtf(file.path()).unwrap();
        assert_eq!(annotation.len(), 3);
        assert!(annotation.features.iter().all(|f| f.gene_name.as_deref() == Some("G2")));
        assert_eq!(annotation.features[0].transcript_name.as_deref(), Some("T9"));

        // minus strand: the rightmost exon is exon 1
        assert_eq!(annotation.features[0].exon_number, Some(2));
        assert_eq!(annotation.features[1].exon_number, Some(1));
        assert_eq!(annotation.features[2].feature_type, FeatureType::Cds);
        assert_eq!(annotation.features[2].exon_number, Some(1));
    }

    #[test]
    fn test_read_gtf_without_exons_fails() {
        let mut file = tempfile::Builder::new().suffix(".gtf").tempfile().unwrap();
        writeln!(file, "chr1\tsrc\tgene\t1\t900\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";").unwrap();
        assert!(read_gtf(file.path()).is_err());
    }
}
