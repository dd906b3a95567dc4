//! Vertical placement of transcripts shared by every panel

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Annotation, Span};

/// Position and label of each transcript on the shared y axis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptAxis {
    /// transcript id -> label, in plotting order
    transcripts: IndexMap<String, String>,
}

impl TranscriptAxis {
    /// Assign positions 0..n in order of first appearance
    ///
    /// Labels come from `label_field` (any feature column) and fall back to the
    /// transcript id when the field is missing.
    pub fn from_annotation(annotation: &Annotation, label_field: &str) -> Self {
        let mut transcripts = IndexMap::new();
        for feature in &annotation.features {
            if transcripts.contains_key(&feature.transcript_id) {
                continue;
            }
            let label = feature
                .field(label_field)
                .map(|v| v.into_owned())
                .unwrap_or_else(|| feature.transcript_id.clone());
            transcripts.insert(feature.transcript_id.clone(), label);
        }
        Self { transcripts }
    }

    pub fn position(&self, transcript_id: &str) -> Option<usize> {
        self.transcripts.get_index_of(transcript_id)
    }

    pub fn label(&self, transcript_id: &str) -> Option<&str> {
        self.transcripts.get(transcript_id).map(String::as_str)
    }

    pub fn transcript_ids(&self) -> impl Iterator<Item = &str> {
        self.transcripts.keys().map(String::as_str)
    }

    pub fn labels(&self) -> Vec<String> {
        self.transcripts.values().cloned().collect()
    }

    pub fn tick_values(&self) -> Vec<f64> {
        (0..self.len()).map(|i| i as f64).collect()
    }

    /// Y range leaving room around the first and last transcript
    pub fn range(&self) -> [f64; 2] {
        [-0.8, self.len() as f64 - 0.2]
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

/// X range covering every feature, padded on both sides by a fraction of its width
pub fn x_range(annotation: &Annotation, padding_fraction: f64) -> Option<[f64; 2]> {
    let Span { start, end } = annotation.bounds()?;
    let padding = (end - start + 1) as f64 * padding_fraction;
    Some([start as f64 - padding, end as f64 + padding])
}
