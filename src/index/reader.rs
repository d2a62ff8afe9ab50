//! Segment reader traits consumed by query execution.
//!
//! These traits are the boundary between scoring and storage: a
//! [`LeafReader`] exposes one index segment, and a [`PostingIterator`]
//! walks the postings of one term inside it.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::term::Term;

/// Sentinel document id returned once an iterator is exhausted.
pub const NO_MORE_DOCS: u64 = u64::MAX;

/// What a field's postings record, from least to most detailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexOptions {
    /// The field is not indexed.
    None,
    /// Only document ids are stored; every frequency reads as 1.
    Docs,
    /// Document ids and term frequencies are stored.
    DocsAndFreqs,
    /// Document ids, frequencies and positions are stored.
    DocsAndFreqsAndPositions,
}

impl IndexOptions {
    /// Whether per-document frequencies are recorded.
    pub fn has_freqs(self) -> bool {
        self >= IndexOptions::DocsAndFreqs
    }
}

/// Per-segment metadata about a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// What the field's postings record.
    pub index_options: IndexOptions,
    /// Whether length norms are stored for the field.
    pub has_norms: bool,
}

/// Per-segment aggregate statistics for a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Number of documents with at least one term in the field.
    pub doc_count: u64,
    /// Sum of document frequencies over all terms of the field.
    pub sum_doc_freq: u64,
    /// Sum of total term frequencies over all terms of the field.
    pub sum_total_term_freq: u64,
}

/// A term resolved inside one segment.
///
/// Holding a state lets postings be reopened without seeking the term
/// dictionary again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTermState {
    /// Ordinal of the term in the segment's dictionary.
    pub ord: u64,
    /// Number of documents in the segment containing the term.
    pub doc_freq: u64,
    /// Occurrences of the term across the segment.
    pub total_term_freq: u64,
}

/// Read access to a single index segment.
pub trait LeafReader: Send + Sync + Debug {
    /// One greater than the largest document id in the segment.
    fn max_doc(&self) -> u64;

    /// Metadata about a field, if the segment has seen it.
    fn field_info(&self, field: &str) -> Option<FieldInfo>;

    /// Aggregate statistics for a field, if the segment has seen it.
    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>>;

    /// Resolve a term in this segment's dictionary.
    fn term_state(&self, term: &Term) -> Result<Option<SegmentTermState>>;

    /// Open the postings of a previously resolved term.
    fn postings(&self, term: &Term, state: &SegmentTermState) -> Result<Box<dyn PostingIterator>>;

    /// Length norm of a field in a document, if norms are stored.
    fn norm(&self, field: &str, doc_id: u64) -> Result<Option<u64>>;

    /// Index options of a field, [`IndexOptions::None`] if the field is unknown.
    fn index_options(&self, field: &str) -> IndexOptions {
        self.field_info(field)
            .map(|info| info.index_options)
            .unwrap_or(IndexOptions::None)
    }
}

/// Iterator over the postings of one term.
///
/// A fresh iterator is unpositioned; the first call to [`next`](Self::next)
/// or [`skip_to`](Self::skip_to) moves it onto its first document.
pub trait PostingIterator: Send + Debug {
    /// Get the current document ID, [`NO_MORE_DOCS`] once exhausted.
    fn doc_id(&self) -> u64;

    /// Get the term frequency in the current document.
    fn term_freq(&self) -> u32;

    /// Move to the next document.
    fn next(&mut self) -> Result<bool>;

    /// Skip to the first document >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Get the cost of iterating through this posting list.
    fn cost(&self) -> u64;
}

/// A segment as placed in one searcher.
///
/// The ordinal is the segment's position among the searcher's leaves and is
/// what per-segment records are keyed by. Readers do not number themselves,
/// so leaves gathered from different indexes never collide.
#[derive(Debug, Clone)]
pub struct LeafContext {
    ord: usize,
    doc_base: u64,
    reader: Arc<dyn LeafReader>,
}

impl LeafContext {
    pub fn new(ord: usize, doc_base: u64, reader: Arc<dyn LeafReader>) -> Self {
        LeafContext {
            ord,
            doc_base,
            reader,
        }
    }

    /// Position of the segment in its searcher.
    pub fn ord(&self) -> usize {
        self.ord
    }

    /// Global id of the segment's first document.
    pub fn doc_base(&self) -> u64 {
        self.doc_base
    }

    pub fn reader(&self) -> &Arc<dyn LeafReader> {
        &self.reader
    }
}
