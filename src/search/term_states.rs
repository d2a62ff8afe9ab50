//! Per-segment resolution records for a term.

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::Result;
use crate::index::reader::{LeafContext, SegmentTermState};
use crate::index::term::Term;
use crate::search::stats::TermStatistics;

/// The resolutions of one term across the segments of a searcher, keyed by
/// each segment's position in that searcher.
///
/// Each segment is resolved at most once and the record is never changed
/// afterwards, so concurrent segment threads only contend on first access.
/// Two threads racing on the same segment may both resolve it; the first
/// insert wins and both observe the same record.
#[derive(Debug)]
pub struct TermStates {
    term: Term,
    segments: RwLock<AHashMap<usize, Option<SegmentTermState>>>,
    doc_freq: u64,
    total_term_freq: u64,
}

impl TermStates {
    /// Resolve `term` in every leaf and accumulate its statistics.
    pub fn build(leaves: &[LeafContext], term: &Term) -> Result<Self> {
        let mut segments = AHashMap::with_capacity(leaves.len());
        let mut doc_freq = 0;
        let mut total_term_freq = 0;

        for leaf in leaves {
            let state = leaf.reader().term_state(term)?;
            if let Some(state) = &state {
                doc_freq += state.doc_freq;
                total_term_freq += state.total_term_freq;
            }
            segments.insert(leaf.ord(), state);
        }

        Ok(TermStates {
            term: term.clone(),
            segments: RwLock::new(segments),
            doc_freq,
            total_term_freq,
        })
    }

    /// The term these states belong to.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Document frequency summed over the segments resolved at build time.
    pub fn doc_freq(&self) -> u64 {
        self.doc_freq
    }

    /// Total term frequency summed over the segments resolved at build time.
    pub fn total_term_freq(&self) -> u64 {
        self.total_term_freq
    }

    /// Collection statistics, or `None` if the term occurs nowhere.
    pub fn statistics(&self) -> Option<TermStatistics> {
        if self.doc_freq > 0 {
            Some(TermStatistics::new(self.doc_freq, self.total_term_freq))
        } else {
            None
        }
    }

    /// Return the record for `leaf`, resolving it on first access.
    pub fn get_or_resolve(&self, leaf: &LeafContext) -> Result<Option<SegmentTermState>> {
        if let Some(state) = self.segments.read().get(&leaf.ord()) {
            return Ok(*state);
        }

        let resolved = leaf.reader().term_state(&self.term)?;
        let mut segments = self.segments.write();
        Ok(*segments.entry(leaf.ord()).or_insert(resolved))
    }
}
