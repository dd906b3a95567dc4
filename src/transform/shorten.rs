//! Compressing long intronic gaps so exons dominate the plot

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::model::{Annotation, Feature, Span};

/// Default width an intronic gap is shortened to
pub const DEFAULT_TARGET_GAP_WIDTH: i64 = 100;

/// Rescale the coordinates of an annotation so that gaps between exons are at
/// most `target_gap_width` wide
///
/// Exon widths are preserved. Introns are shortened by the amount their
/// gaps exceed the target. With `group_by_transcript` each transcript
/// starts where its first exon lands on the shared shortened axis; otherwise
/// every feature is laid out in one sequence starting at 1.
///
/// CDS and UTR features are moved along with the exon that contains them.
/// Rescaled features keep their original coordinates in `genomic`.
pub fn shorten_gaps(
    annotation: &Annotation,
    group_by_transcript: bool,
    target_gap_width: i64,
) -> Result<Annotation> {
    let exons: Vec<&Feature> = annotation.exons().collect();
    if exons.is_empty() {
        return Err(Error::EmptyAnnotation);
    }

    let seqnames: FxHashSet<&str> = exons.iter().map(|f| f.seqname.as_str()).collect();
    let strands: FxHashSet<_> = exons.iter().map(|f| f.strand).collect();
    if seqnames.len() != 1 || strands.len() != 1 {
        return Err(Error::MixedLocus {
            seqnames: seqnames.len(),
            strands: strands.len(),
        });
    }

    let gaps = exon_gaps(&exons);
    log::debug!("Found {} gap(s) between exons", gaps.len());

    // Exons and introns (narrowed to exclude the shared boundaries) with the
    // width they occupy on the rescaled axis
    let mut pieces: Vec<Piece> = Vec::new();
    for (index, feature) in annotation.features.iter().enumerate() {
        if feature.is_exon() {
            pieces.push(Piece {
                index,
                span: feature.span(),
                width: feature.width(),
            });
        } else if feature.is_intron() {
            let span = Span::new(feature.start + 1, feature.end - 1);
            pieces.push(Piece {
                index,
                span,
                width: shortened_width(span, &gaps, target_gap_width).max(0),
            });
        }
    }

    let mut rescaled: FxHashMap<usize, Span> = FxHashMap::default();
    if group_by_transcript {
        let overall_start = exons.iter().map(|f| f.start).min().unwrap_or(1);
        let mut tx_starts: IndexMap<&str, i64> = IndexMap::new();
        for exon in &exons {
            tx_starts
                .entry(exon.transcript_id.as_str())
                .and_modify(|s| *s = (*s).min(exon.start))
                .or_insert(exon.start);
        }

        let mut by_tx: IndexMap<&str, Vec<&Piece>> = IndexMap::new();
        for piece in &pieces {
            let tx = annotation.features[piece.index].transcript_id.as_str();
            by_tx.entry(tx).or_default().push(piece);
        }

        for (tx, tx_pieces) in by_tx {
            let Some(&tx_start) = tx_starts.get(tx) else {
                continue;
            };
            let offset = shortened_width(Span::new(overall_start, tx_start), &gaps, target_gap_width);
            lay_out(tx_pieces, offset, &mut rescaled);
        }
    } else {
        lay_out(pieces.iter().collect(), 1, &mut rescaled);
    }

    // Introns widen back to touch their neighbouring exons
    for piece in &pieces {
        if annotation.features[piece.index].is_intron() {
            if let Some(span) = rescaled.get_mut(&piece.index) {
                span.start -= 1;
                span.end += 1;
            }
        }
    }

    let mut features = Vec::with_capacity(annotation.len());
    let mut dropped = 0usize;
    for (index, feature) in annotation.features.iter().enumerate() {
        let span = match rescaled.get(&index) {
            Some(span) => Some(*span),
            None if feature.feature_type.is_exonic_part() => {
                place_in_exon(feature, annotation, &rescaled)
            }
            None => None,
        };
        match span {
            Some(span) => {
                let mut out = feature.clone();
                out.genomic = Some(feature.genomic_span());
                out.start = span.start;
                out.end = span.end;
                features.push(out);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!(
            "{} feature(s) could not be placed on the shortened axis and were dropped",
            dropped
        );
    }

    Ok(Annotation::new(features))
}

#[derive(Debug)]
struct Piece {
    index: usize,
    span: Span,
    width: i64,
}

/// Lay pieces end to end in (start, end) order, starting after `offset`
fn lay_out(mut pieces: Vec<&Piece>, offset: i64, rescaled: &mut FxHashMap<usize, Span>) {
    pieces.sort_by_key(|p| (p.span.start, p.span.end));
    let mut cumulative = 0;
    for piece in pieces {
        cumulative += piece.width;
        let end = cumulative + offset;
        rescaled.insert(piece.index, Span::new(end - piece.width + 1, end));
    }
}

/// Intervals covered by no exon, between the first and last exon
fn exon_gaps(exons: &[&Feature]) -> Vec<Span> {
    let mut spans: Vec<Span> = exons.iter().map(|f| f.span()).collect();
    spans.sort_by_key(|s| s.start);

    let mut merged: Vec<Span> = Vec::new();
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }

    merged
        .windows(2)
        .map(|pair| Span::new(pair[0].end + 1, pair[1].start - 1))
        .filter(|gap| gap.start <= gap.end)
        .collect()
}

/// Width of `span` once the gaps it covers are shortened to `target`
fn shortened_width(span: Span, gaps: &[Span], target: i64) -> i64 {
    let width = span.width();
    if gaps.iter().any(|gap| *gap == span) {
        return width.min(target);
    }

    let reduction: i64 = gaps
        .iter()
        .filter(|gap| span.contains(gap))
        .map(|gap| gap.width() - gap.width().min(target))
        .sum();
    width - reduction
}

/// Rescaled span of a CDS/UTR inside the exon of its transcript that contains it
fn place_in_exon(
    feature: &Feature,
    annotation: &Annotation,
    rescaled: &FxHashMap<usize, Span>,
) -> Option<Span> {
    let span = feature.span();
    let (index, exon) = annotation
        .features
        .iter()
        .enumerate()
        .find(|(_, f)| f.is_exon() && f.transcript_id == feature.transcript_id && f.span().contains(&span))?;
    let exon_rescaled = rescaled.get(&index)?;
    let start = exon_rescaled.start + (span.start - exon.start);
    Some(Span::new(start, start + span.width() - 1))
}
