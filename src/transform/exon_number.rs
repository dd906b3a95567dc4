//! Exon numbering for annotations that lack an `exon_number` attribute

use rustc_hash::FxHashMap;

use crate::model::{Annotation, Feature, Span, Strand};

/// Number the exons of every transcript in transcription order
///
/// Exons are numbered 1..n by ascending start, or by descending start on the
/// reverse strand. CDS and UTR features take the number of the exon that
/// contains them, or of the first exon they overlap. Feature order is kept.
pub fn calculate_exon_number(mut annotation: Annotation) -> Annotation {
    // transcript id -> exon spans in transcription order
    let mut ordered: FxHashMap<String, Vec<Span>> = FxHashMap::default();
    for (tx, features) in annotation.by_transcript() {
        let mut exons: Vec<&Feature> = features.into_iter().filter(|f| f.is_exon()).collect();
        exons.sort_by_key(|f| (f.start, f.end));
        if exons.first().map(|f| f.strand) == Some(Strand::Reverse) {
            exons.reverse();
        }
        ordered.insert(tx.to_string(), exons.iter().map(|f| f.span()).collect());
    }

    for feature in &mut annotation.features {
        let Some(exons) = ordered.get(&feature.transcript_id) else {
            continue;
        };
        let span = feature.span();
        let number = if feature.is_exon() {
            exons.iter().position(|e| *e == span)
        } else {
            exons
                .iter()
                .position(|e| e.contains(&span))
                .or_else(|| exons.iter().position(|e| e.overlaps(&span)))
        };
        if let Some(idx) = number {
            feature.exon_number = u32::try_from(idx + 1).ok();
        }
    }

    annotation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureType;

    fn feature(start: i64, end: i64, strand: Strand, kind: FeatureType, tx: &str) -> Feature {
        Feature::new("chr1", start, end, strand, kind, tx)
    }

    #[test]
    fn test_forward_strand_numbering() {
        let annotation = Annotation::new(vec![
            feature(500, 600, Strand::Forward, FeatureType::Exon, "a"),
            feature(100, 200, Strand::Forward, FeatureType::Exon, "a"),
            feature(150, 200, Strand::Forward, FeatureType::Cds, "a"),
            feature(550, 700, Strand::Forward, FeatureType::ThreePrimeUtr, "a"),
        ]);

        let numbered = calculate_exon_number(annotation);
        let numbers: Vec<_> = numbered.features.iter().map(|f| f.exon_number).collect();
        assert_eq!(numbers, vec![Some(2), Some(1), Some(1), Some(2)]);
        assert_eq!(numbered.features[0].start, 500);
    }

    #[test]
    fn test_reverse_strand_numbering() {
        let annotation = Annotation::new(vec![
            feature(100, 200, Strand::Reverse, FeatureType::Exon, "b"),
            feature(300, 400, Strand::Reverse, FeatureType::Exon, "b"),
            feature(900, 950, Strand::Reverse, FeatureType::Exon, "b"),
            feature(10, 20, Strand::Reverse, FeatureType::Cds, "b"),
        ]);

        let numbered = calculate_exon_number(annotation);
        let numbers: Vec<_> = numbered.features.iter().map(|f| f.exon_number).collect();
        assert_eq!(numbers, vec![Some(3), Some(2), Some(1), None]);
    }
}
