//! Transformations applied to annotations before plotting

mod exon_number;
mod gene_filter;
mod introns;
mod shorten;

pub use self::exon_number::calculate_exon_number;
pub use self::gene_filter::{gene_filtering, FilterOptions, TopTranscripts};
pub use self::introns::to_intron;
pub use self::shorten::{shorten_gaps, DEFAULT_TARGET_GAP_WIDTH};
