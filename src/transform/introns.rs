//! Deriving introns from the exons of each transcript

use crate::model::{Annotation, Feature, FeatureType};

/// Add one intron between every pair of consecutive, non-touching exons
///
/// An intron spans from the end of one exon to the start of the next, so it
/// shares its boundary coordinates with both. Each transcript's introns are
/// appended after its own features.
pub fn to_intron(annotation: &Annotation) -> Annotation {
    let mut out = Vec::with_capacity(annotation.len() * 2);

    for (_, features) in annotation.by_transcript() {
        let mut exons: Vec<&Feature> = features.iter().copied().filter(|f| f.is_exon()).collect();
        exons.sort_by_key(|f| (f.start, f.end));

        out.extend(features.into_iter().cloned());

        for pair in exons.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.start <= prev.end + 1 {
                continue;
            }
            let mut intron = prev.clone();
            intron.start = prev.end;
            intron.end = next.start;
            intron.feature_type = FeatureType::Intron;
            intron.exon_number = None;
            intron.genomic = None;
            out.push(intron);
        }
    }

    Annotation::new(out)
}
