//! Document iterators and scorers.
//!
//! Every iterator in this module is positioned on its first document as soon
//! as it is constructed, and only ever moves forward.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::reader::{NO_MORE_DOCS, PostingIterator};
use crate::search::similarity::LeafSimScorer;

/// A forward-only iterator over ascending document ids of one segment.
pub trait DocIterator: Send + Debug {
    /// Get the current document ID, [`NO_MORE_DOCS`] once exhausted.
    fn doc_id(&self) -> u64;

    /// Move to the next document and return its id.
    fn next(&mut self) -> Result<u64>;

    /// Move to the first document >= target and return its id.
    ///
    /// Does not move if the current document is already >= target.
    fn skip_to(&mut self, target: u64) -> Result<u64>;

    /// Get the cost of iterating through this iterator.
    fn cost(&self) -> u64;

    /// Check if this iterator is exhausted.
    fn is_exhausted(&self) -> bool {
        self.doc_id() == NO_MORE_DOCS
    }
}

/// A [`DocIterator`] that can score its current document.
pub trait Scorer: DocIterator {
    /// Score the current document.
    fn score(&self) -> Result<f32>;

    /// Upper bound of [`score`](Self::score) over every document of the segment.
    fn max_score(&self) -> f32;
}

impl<T: DocIterator + ?Sized> DocIterator for Box<T> {
    fn doc_id(&self) -> u64 {
        (**self).doc_id()
    }

    fn next(&mut self) -> Result<u64> {
        (**self).next()
    }

    fn skip_to(&mut self, target: u64) -> Result<u64> {
        (**self).skip_to(target)
    }

    fn cost(&self) -> u64 {
        (**self).cost()
    }
}

impl<T: Scorer + ?Sized> Scorer for Box<T> {
    fn score(&self) -> Result<f32> {
        (**self).score()
    }

    fn max_score(&self) -> f32 {
        (**self).max_score()
    }
}

/// Scores the postings of a single term.
#[derive(Debug)]
pub struct TermScorer {
    postings: Box<dyn PostingIterator>,
    similarity: LeafSimScorer,
    doc: u64,
    cost: u64,
}

impl TermScorer {
    /// Create a term scorer positioned on the first posting.
    pub fn new(mut postings: Box<dyn PostingIterator>, similarity: LeafSimScorer) -> Result<Self> {
        let cost = postings.cost();
        let doc = if postings.next()? {
            postings.doc_id()
        } else {
            NO_MORE_DOCS
        };
        Ok(TermScorer {
            postings,
            similarity,
            doc,
            cost,
        })
    }

    /// Term frequency in the current document.
    pub fn freq(&self) -> u32 {
        if self.doc == NO_MORE_DOCS {
            0
        } else {
            self.postings.term_freq()
        }
    }

    /// The similarity this scorer was built with.
    pub fn similarity(&self) -> &LeafSimScorer {
        &self.similarity
    }
}

impl DocIterator for TermScorer {
    fn doc_id(&self) -> u64 {
        self.doc
    }

    fn next(&mut self) -> Result<u64> {
        if self.doc != NO_MORE_DOCS {
            self.doc = if self.postings.next()? {
                self.postings.doc_id()
            } else {
                NO_MORE_DOCS
            };
        }
        Ok(self.doc)
    }

    fn skip_to(&mut self, target: u64) -> Result<u64> {
        if self.doc < target {
            self.doc = if self.postings.skip_to(target)? {
                self.postings.doc_id()
            } else {
                NO_MORE_DOCS
            };
        }
        Ok(self.doc)
    }

    fn cost(&self) -> u64 {
        self.cost
    }
}

impl Scorer for TermScorer {
    fn score(&self) -> Result<f32> {
        self.similarity.score(self.doc, self.freq() as f32)
    }

    fn max_score(&self) -> f32 {
        self.similarity.max_score()
    }
}
