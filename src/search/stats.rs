//! Collection-wide statistics fed to similarity models.

use serde::{Deserialize, Serialize};

use crate::index::reader::IndexOptions;

/// Collection statistics for a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatistics {
    /// Number of documents containing the term.
    pub doc_freq: u64,
    /// Occurrences of the term across all documents.
    pub total_term_freq: u64,
}

impl TermStatistics {
    /// Create term statistics.
    pub fn new(doc_freq: u64, total_term_freq: u64) -> Self {
        debug_assert!(doc_freq == 0 || total_term_freq >= doc_freq);
        TermStatistics {
            doc_freq,
            total_term_freq,
        }
    }
}

/// Collection statistics for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStatistics {
    /// Field name.
    pub field: String,
    /// Sum of `max_doc` over all segments.
    pub max_doc: u64,
    /// Number of documents with at least one term in the field.
    pub doc_count: u64,
    /// Sum of total term frequencies over all terms of the field.
    pub sum_total_term_freq: u64,
    /// Sum of document frequencies over all terms of the field.
    pub sum_doc_freq: u64,
}

impl CollectionStatistics {
    /// Average number of tokens per document holding the field.
    pub fn avg_field_length(&self) -> f32 {
        if self.doc_count == 0 {
            1.0
        } else {
            self.sum_total_term_freq as f32 / self.doc_count as f32
        }
    }
}

/// Merge the statistics of a synonym group into one virtual term.
///
/// Absent terms are ignored. The document frequency is the largest of the
/// members' and the total term frequency is their sum. Returns `None` when no
/// member occurs in the collection, in which case the group cannot be scored.
pub fn pseudo_statistics<I>(stats: I) -> Option<TermStatistics>
where
    I: IntoIterator<Item = Option<TermStatistics>>,
{
    let mut doc_freq = 0;
    let mut total_term_freq = 0;
    for term_stats in stats.into_iter().flatten() {
        doc_freq = doc_freq.max(term_stats.doc_freq);
        total_term_freq += term_stats.total_term_freq;
    }

    if doc_freq > 0 {
        Some(TermStatistics::new(doc_freq, total_term_freq))
    } else {
        None
    }
}

/// Largest frequency bound reported, the signed 32-bit maximum.
pub const MAX_BOUND_FREQUENCY: u32 = i32::MAX as u32;

/// Upper bound of a term's frequency in any single document of a segment.
///
/// Fields without frequencies always read 1. Otherwise no document can hold
/// more than `total_term_freq - doc_freq + 1` occurrences, since each of the
/// other `doc_freq - 1` documents holds at least one. The result is capped
/// at [`MAX_BOUND_FREQUENCY`].
pub fn bound_frequency(index_options: IndexOptions, total_term_freq: u64, doc_freq: u64) -> u32 {
    if !index_options.has_freqs() {
        return 1;
    }
    let bound = total_term_freq.saturating_sub(doc_freq).saturating_add(1);
    bound.min(u64::from(MAX_BOUND_FREQUENCY)) as u32
}
