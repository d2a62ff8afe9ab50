//! TF-IDF similarity.

use std::sync::Arc;

use crate::search::explanation::Explanation;
use crate::search::similarity::{SimScorer, Similarity};
use crate::search::stats::{CollectionStatistics, TermStatistics};

/// Classic TF-IDF ranking with log-scaled term frequency and
/// `1 / sqrt(length)` normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TfIdfSimilarity;

impl TfIdfSimilarity {
    /// Create a TF-IDF similarity.
    pub fn new() -> Self {
        TfIdfSimilarity
    }
}

impl Similarity for TfIdfSimilarity {
    fn name(&self) -> &'static str {
        "TfIdfSimilarity"
    }

    fn scorer(
        &self,
        boost: f32,
        collection_stats: &CollectionStatistics,
        term_stats: &TermStatistics,
    ) -> Arc<dyn SimScorer> {
        let doc_count = collection_stats.doc_count.max(term_stats.doc_freq) as f32;
        let idf = (1.0 + doc_count / term_stats.doc_freq.max(1) as f32).ln();
        Arc::new(TfIdfSimScorer {
            boost,
            idf,
            weight: boost * idf,
        })
    }
}

#[derive(Debug, Clone)]
struct TfIdfSimScorer {
    boost: f32,
    idf: f32,
    weight: f32,
}

fn tf(freq: f32) -> f32 {
    if freq <= 0.0 { 0.0 } else { 1.0 + freq.ln() }
}

fn length_norm(norm: u64) -> f32 {
    1.0 / (norm.max(1) as f32).sqrt()
}

impl SimScorer for TfIdfSimScorer {
    fn score(&self, freq: f32, norm: u64) -> f32 {
        self.weight * tf(freq) * length_norm(norm)
    }

    fn max_score(&self, max_freq: f32) -> f32 {
        self.weight * tf(max_freq)
    }

    fn explain(&self, freq: Explanation, norm: u64) -> Explanation {
        let value = self.score(freq.value(), norm);
        let tf_value = tf(freq.value());
        Explanation::matched(
            value,
            "score(freq), product of:",
            vec![
                Explanation::matched(self.boost, "boost", vec![]),
                Explanation::matched(self.idf, "idf, computed as log(1 + docCount / docFreq)", vec![]),
                Explanation::matched(tf_value, "tf, computed as 1 + log(freq) from:", vec![freq]),
                Explanation::matched(
                    length_norm(norm),
                    format!("lengthNorm, computed as 1 / sqrt(fieldLength={norm})"),
                    vec![],
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> CollectionStatistics {
        CollectionStatistics {
            field: "body".to_string(),
            max_doc: 100,
            doc_count: 100,
            sum_total_term_freq: 1_000,
            sum_doc_freq: 600,
        }
    }

    #[test]
    fn test_tfidf_score() {
        let scorer = TfIdfSimilarity::new().scorer(1.0, &collection(), &TermStatistics::new(10, 20));

        assert_eq!(scorer.score(0.0, 4), 0.0);
        assert!(scorer.score(2.0, 4) > scorer.score(1.0, 4));
        assert!(scorer.score(1.0, 1) > scorer.score(1.0, 16));
    }

    #[test]
    fn test_tfidf_max_score_bounds_scores() {
        let scorer = TfIdfSimilarity::new().scorer(1.5, &collection(), &TermStatistics::new(10, 20));
        let max_score = scorer.max_score(4.0);

        for freq in 1..=4 {
            for norm in [0, 1, 3, 50] {
                assert!(scorer.score(freq as f32, norm) <= max_score);
            }
        }
    }

    #[test]
    fn test_tfidf_explain_matches_score() {
        let scorer = TfIdfSimilarity::new().scorer(1.0, &collection(), &TermStatistics::new(10, 20));
        let explanation = scorer.explain(Explanation::matched(2.0, "termFreq=2", vec![]), 9);

        assert_eq!(explanation.value(), scorer.score(2.0, 9));
        assert_eq!(explanation.details().len(), 4);
    }
}
