//! BM25 similarity.

use std::sync::Arc;

use crate::search::explanation::Explanation;
use crate::search::similarity::{SimScorer, Similarity};
use crate::search::stats::{CollectionStatistics, TermStatistics};

/// Okapi BM25 ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BM25Similarity {
    /// Term frequency saturation.
    k1: f32,
    /// Field length normalization.
    b: f32,
}

impl Default for BM25Similarity {
    fn default() -> Self {
        BM25Similarity { k1: 1.2, b: 0.75 }
    }
}

impl BM25Similarity {
    /// Create a BM25 similarity with custom parameters.
    pub fn with_params(k1: f32, b: f32) -> Self {
        BM25Similarity { k1, b }
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f32 {
        self.b
    }

    fn idf(doc_freq: u64, doc_count: u64) -> f32 {
        let df = doc_freq as f32;
        let n = doc_count.max(doc_freq) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

impl Similarity for BM25Similarity {
    fn name(&self) -> &'static str {
        "BM25Similarity"
    }

    fn scorer(
        &self,
        boost: f32,
        collection_stats: &CollectionStatistics,
        term_stats: &TermStatistics,
    ) -> Arc<dyn SimScorer> {
        let doc_count = if collection_stats.doc_count > 0 {
            collection_stats.doc_count
        } else {
            collection_stats.max_doc
        };
        let idf = Self::idf(term_stats.doc_freq, doc_count);

        Arc::new(BM25SimScorer {
            boost,
            idf,
            weight: boost * idf,
            k1: self.k1,
            b: self.b,
            avg_field_length: collection_stats.avg_field_length(),
            doc_freq: term_stats.doc_freq,
            doc_count,
        })
    }
}

#[derive(Debug, Clone)]
struct BM25SimScorer {
    boost: f32,
    idf: f32,
    weight: f32,
    k1: f32,
    b: f32,
    avg_field_length: f32,
    doc_freq: u64,
    doc_count: u64,
}

impl BM25SimScorer {
    fn tf_norm(&self, freq: f32, field_length: f32) -> f32 {
        if freq == 0.0 {
            return 0.0;
        }
        let norm_factor = 1.0 - self.b + self.b * (field_length / self.avg_field_length);
        (freq * (self.k1 + 1.0)) / (freq + self.k1 * norm_factor)
    }
}

impl SimScorer for BM25SimScorer {
    fn score(&self, freq: f32, norm: u64) -> f32 {
        self.weight * self.tf_norm(freq, norm as f32)
    }

    fn max_score(&self, max_freq: f32) -> f32 {
        // Zero length gives the smallest denominator.
        self.weight * self.tf_norm(max_freq, 0.0)
    }

    fn explain(&self, freq: Explanation, norm: u64) -> Explanation {
        let value = self.score(freq.value(), norm);
        let field_length = norm as f32;

        let idf = Explanation::matched(
            self.idf,
            "idf, computed as log(1 + (docCount - docFreq + 0.5) / (docFreq + 0.5)) from:",
            vec![
                Explanation::matched(self.doc_freq as f32, "docFreq", vec![]),
                Explanation::matched(self.doc_count as f32, "docCount", vec![]),
            ],
        );
        let tf_norm = Explanation::matched(
            self.tf_norm(freq.value(), field_length),
            "tfNorm, computed as (freq * (k1 + 1)) / (freq + k1 * (1 - b + b * fieldLength / avgFieldLength)) from:",
            vec![
                freq,
                Explanation::matched(self.k1, "parameter k1", vec![]),
                Explanation::matched(self.b, "parameter b", vec![]),
                Explanation::matched(self.avg_field_length, "avgFieldLength", vec![]),
                Explanation::matched(field_length, "fieldLength", vec![]),
            ],
        );

        let mut details = Vec::with_capacity(3);
        if self.boost != 1.0 {
            details.push(Explanation::matched(self.boost, "boost", vec![]));
        }
        details.push(idf);
        details.push(tf_norm);

        Explanation::matched(value, "score(freq), product of:", details)
    }
}
