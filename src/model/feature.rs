//! Genomic features of a transcript: exons, coding regions, UTRs, introns

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Strand of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }
}

impl FromStr for Strand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "*" | "" => Ok(Strand::Unknown),
            other => Err(Error::InvalidStrand(other.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a transcript feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    Exon,
    Cds,
    FivePrimeUtr,
    ThreePrimeUtr,
    Utr,
    Intron,
    Other(String),
}

impl FeatureType {
    /// Name as written in GTF files
    pub fn as_str(&self) -> &str {
        match self {
            FeatureType::Exon => "exon",
            FeatureType::Cds => "CDS",
            FeatureType::FivePrimeUtr => "five_prime_UTR",
            FeatureType::ThreePrimeUtr => "three_prime_UTR",
            FeatureType::Utr => "UTR",
            FeatureType::Intron => "intron",
            FeatureType::Other(name) => name,
        }
    }

    /// Whether the feature is drawn as a box inside an exon (CDS or UTR)
    pub fn is_exonic_part(&self) -> bool {
        matches!(
            self,
            FeatureType::Cds | FeatureType::FivePrimeUtr | FeatureType::ThreePrimeUtr | FeatureType::Utr
        )
    }

    pub fn is_utr(&self) -> bool {
        matches!(
            self,
            FeatureType::FivePrimeUtr | FeatureType::ThreePrimeUtr | FeatureType::Utr
        )
    }
}

impl From<&str> for FeatureType {
    fn from(s: &str) -> Self {
        match s {
            "exon" => FeatureType::Exon,
            "CDS" | "cds" => FeatureType::Cds,
            "five_prime_UTR" | "five_prime_utr" | "5UTR" => FeatureType::FivePrimeUtr,
            "three_prime_UTR" | "three_prime_utr" | "3UTR" => FeatureType::ThreePrimeUtr,
            "UTR" | "utr" => FeatureType::Utr,
            "intron" => FeatureType::Intron,
            other => FeatureType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed 1-based genomic interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// One annotated interval belonging to a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub seqname: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub feature_type: FeatureType,
    pub transcript_id: String,
    pub transcript_name: Option<String>,
    pub gene_id: Option<String>,
    pub gene_name: Option<String>,
    pub exon_number: Option<u32>,
    /// Remaining columns/attributes, in source order
    pub attributes: IndexMap<String, String>,
    /// Genomic coordinates before rescaling, set by gap shortening
    pub genomic: Option<Span>,
}

impl Feature {
    pub fn new(
        seqname: impl Into<String>,
        start: i64,
        end: i64,
        strand: Strand,
        feature_type: FeatureType,
        transcript_id: impl Into<String>,
    ) -> Self {
        Self {
            seqname: seqname.into(),
            start,
            end,
            strand,
            feature_type,
            transcript_id: transcript_id.into(),
            transcript_name: None,
            gene_id: None,
            gene_name: None,
            exon_number: None,
            attributes: IndexMap::new(),
            genomic: None,
        }
    }

    pub fn with_gene(mut self, gene_id: impl Into<String>, gene_name: impl Into<String>) -> Self {
        self.gene_id = Some(gene_id.into());
        self.gene_name = Some(gene_name.into());
        self
    }

    pub fn with_exon_number(mut self, exon_number: u32) -> Self {
        self.exon_number = Some(exon_number);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Coordinates on the genome, whether or not the feature was rescaled
    pub fn genomic_span(&self) -> Span {
        self.genomic.unwrap_or_else(|| self.span())
    }

    pub fn is_exon(&self) -> bool {
        self.feature_type == FeatureType::Exon
    }

    pub fn is_intron(&self) -> bool {
        self.feature_type == FeatureType::Intron
    }

    /// Resolve a column name to this feature's value
    ///
    /// Known column names map to the typed fields; anything else is looked up
    /// in the attributes.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "seqnames" | "seqname" => Some(Cow::Borrowed(&self.seqname)),
            "start" => Some(Cow::Owned(self.start.to_string())),
            "end" => Some(Cow::Owned(self.end.to_string())),
            "strand" => Some(Cow::Borrowed(self.strand.as_str())),
            "type" | "feature" => Some(Cow::Borrowed(self.feature_type.as_str())),
            "transcript_id" => Some(Cow::Borrowed(&self.transcript_id)),
            "transcript_name" => self.transcript_name.as_deref().map(Cow::Borrowed),
            "gene_id" => self.gene_id.as_deref().map(Cow::Borrowed),
            "gene_name" => self.gene_name.as_deref().map(Cow::Borrowed),
            "exon_number" => self.exon_number.map(|n| Cow::Owned(n.to_string())),
            other => self.attributes.get(other).map(|v| Cow::Borrowed(v.as_str())),
        }
    }
}
