//! Top-k collection of scored documents.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// A scored document; `doc` is the searcher-wide document id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    /// Searcher-wide document id.
    pub doc: u64,
    /// The relevance score.
    pub score: f32,
}

/// The best hits of a search, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDocs {
    /// Total number of matching documents.
    pub total_hits: u64,
    /// The top hits by score, ties broken by ascending doc id.
    pub hits: Vec<ScoreDoc>,
    /// Maximum score in the results.
    pub max_score: f32,
}

/// Heap entry ordered so that the worst hit is on top.
#[derive(Debug, Clone, Copy)]
struct WorstFirst(ScoreDoc);

impl PartialEq for WorstFirst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WorstFirst {}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower scores, then higher doc ids, are "greater" (worse).
        other
            .0
            .score
            .total_cmp(&self.0.score)
            .then_with(|| self.0.doc.cmp(&other.0.doc))
    }
}

/// A collector that keeps the top N documents by score.
///
/// Documents must be offered in ascending doc id order within one collector;
/// hits from different collectors are combined with [`merge`](Self::merge).
#[derive(Debug)]
pub struct TopDocsCollector {
    /// Maximum number of documents to collect.
    max_docs: usize,
    /// Collected hits, worst on top.
    hits: BinaryHeap<WorstFirst>,
    /// Total number of matching documents seen.
    total_hits: u64,
    /// Matches counted without being scored.
    skipped: u64,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
            skipped: 0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// Get the total number of matches seen.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Matches that were counted without being scored.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Score of the worst retained hit once the collector is full.
    pub fn min_competitive_score(&self) -> Option<f32> {
        if self.hits.len() < self.max_docs {
            None
        } else {
            self.hits.peek().map(|worst| worst.0.score)
        }
    }

    /// Whether a later document scoring at most `max_score` could still
    /// enter the results.
    pub fn is_competitive(&self, max_score: f32) -> bool {
        if self.max_docs == 0 {
            return false;
        }
        match self.min_competitive_score() {
            None => true,
            Some(min_score) => max_score > min_score,
        }
    }

    /// Count a match that could not be competitive.
    pub fn count_skipped(&mut self) {
        self.total_hits += 1;
        self.skipped += 1;
    }

    /// Collect a scored document.
    pub fn collect(&mut self, doc: u64, score: f32) {
        self.total_hits += 1;
        self.offer(ScoreDoc { doc, score });
    }

    fn offer(&mut self, hit: ScoreDoc) {
        if self.max_docs == 0 {
            return;
        }
        if self.hits.len() < self.max_docs {
            self.hits.push(WorstFirst(hit));
        } else if let Some(mut worst) = self.hits.peek_mut() {
            if WorstFirst(hit) < *worst {
                *worst = WorstFirst(hit);
            }
        }
    }

    /// Fold another collector's hits into this one.
    pub fn merge(&mut self, other: TopDocsCollector) {
        self.total_hits += other.total_hits;
        self.skipped += other.skipped;
        for hit in other.hits {
            self.offer(hit.0);
        }
    }

    /// Finish collection.
    pub fn into_top_docs(self) -> TopDocs {
        let mut hits: Vec<ScoreDoc> = self
            .hits
            .into_sorted_vec()
            .into_iter()
            .map(|entry| entry.0)
            .collect();
        // into_sorted_vec is ascending by "worseness", i.e. best first already.
        hits.truncate(self.max_docs);
        let max_score = hits.first().map(|hit| hit.score).unwrap_or(0.0);
        TopDocs {
            total_hits: self.total_hits,
            hits,
            max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_best_hits() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(0, 1.0);
        collector.collect(1, 3.0);
        collector.collect(2, 2.0);
        collector.collect(3, 0.5);

        let top = collector.into_top_docs();
        assert_eq!(top.total_hits, 4);
        assert_eq!(top.max_score, 3.0);
        assert_eq!(
            top.hits,
            vec![ScoreDoc { doc: 1, score: 3.0 }, ScoreDoc { doc: 2, score: 2.0 }]
        );
    }

    #[test]
    fn test_ties_prefer_lower_doc() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(5, 1.0);
        collector.collect(6, 1.0);
        collector.collect(7, 1.0);

        let docs: Vec<u64> = collector.into_top_docs().hits.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![5, 6]);
    }

    #[test]
    fn test_is_competitive() {
        let mut collector = TopDocsCollector::new(1);
        assert!(collector.is_competitive(0.0));

        collector.collect(0, 2.0);
        assert_eq!(collector.min_competitive_score(), Some(2.0));
        assert!(!collector.is_competitive(2.0));
        assert!(collector.is_competitive(2.5));

        collector.count_skipped();
        assert_eq!(collector.total_hits(), 2);
        assert_eq!(collector.skipped(), 1);

        assert!(!TopDocsCollector::new(0).is_competitive(100.0));
    }

    #[test]
    fn test_merge() {
        let mut left = TopDocsCollector::new(3);
        left.collect(0, 1.0);
        left.collect(1, 4.0);
        let mut right = TopDocsCollector::new(3);
        right.collect(10, 2.0);
        right.collect(11, 1.0);
        right.count_skipped();

        left.merge(right);
        let top = left.into_top_docs();
        assert_eq!(top.total_hits, 5);
        let docs: Vec<u64> = top.hits.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![1, 10, 0]);
    }
}
