//! Similarity (ranking) models.
//!
//! A [`Similarity`] is bound once per query to the statistics of the term
//! being scored, producing a [`SimScorer`] that maps a frequency and a length
//! norm to a score. [`LeafSimScorer`] attaches a bound scorer to one segment,
//! looking up norms and fixing the max-score bound for that segment.

pub mod bm25;
pub mod tfidf;

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::index::reader::LeafReader;
use crate::search::explanation::Explanation;
use crate::search::stats::{CollectionStatistics, TermStatistics};

pub use self::bm25::BM25Similarity;
pub use self::tfidf::TfIdfSimilarity;

/// A ranking model.
pub trait Similarity: Send + Sync + Debug {
    /// Get the name of this similarity.
    fn name(&self) -> &'static str;

    /// Bind the model to a boost and the statistics of one (possibly virtual) term.
    fn scorer(
        &self,
        boost: f32,
        collection_stats: &CollectionStatistics,
        term_stats: &TermStatistics,
    ) -> Arc<dyn SimScorer>;
}

/// A similarity bound to one term's statistics.
pub trait SimScorer: Send + Sync + Debug {
    /// Score a document with the given term frequency and length norm.
    fn score(&self, freq: f32, norm: u64) -> f32;

    /// Upper bound of [`score`](Self::score) for any frequency <= `max_freq`
    /// and any norm.
    fn max_score(&self, max_freq: f32) -> f32;

    /// Explain [`score`](Self::score); the returned value equals it exactly.
    fn explain(&self, freq: Explanation, norm: u64) -> Explanation;
}

/// A [`SimScorer`] attached to a segment.
#[derive(Debug, Clone)]
pub struct LeafSimScorer {
    scorer: Arc<dyn SimScorer>,
    leaf: Arc<dyn LeafReader>,
    field: String,
    max_score: f32,
}

impl LeafSimScorer {
    /// Attach `scorer` to `leaf`, bounding scores by frequency `max_freq`.
    pub fn new(
        scorer: Arc<dyn SimScorer>,
        leaf: Arc<dyn LeafReader>,
        field: &str,
        max_freq: f32,
    ) -> Self {
        let max_score = scorer.max_score(max_freq);
        LeafSimScorer {
            scorer,
            leaf,
            field: field.to_string(),
            max_score,
        }
    }

    fn norm(&self, doc_id: u64) -> Result<u64> {
        Ok(self.leaf.norm(&self.field, doc_id)?.unwrap_or(1))
    }

    /// Score a document of this segment.
    pub fn score(&self, doc_id: u64, freq: f32) -> Result<f32> {
        Ok(self.scorer.score(freq, self.norm(doc_id)?))
    }

    /// Explain the score of a document of this segment.
    pub fn explain(&self, doc_id: u64, freq: Explanation) -> Result<Explanation> {
        Ok(self.scorer.explain(freq, self.norm(doc_id)?))
    }

    /// The score bound computed at construction.
    pub fn max_score(&self) -> f32 {
        self.max_score
    }
}
