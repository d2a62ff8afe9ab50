//! Searcher configuration.
//!
//! Configuration is plain data with serde support so it can be loaded from a
//! JSON file:
//!
//! ```
//! use synscore::config::{SearcherConfig, SimilarityConfig};
//!
//! let config = SearcherConfig::from_json_str(
//!     r#"{ "parallel": true, "similarity": { "type": "bm25", "k1": 0.9, "b": 0.4 } }"#,
//! )
//! .unwrap();
//!
//! assert!(config.parallel);
//! assert_eq!(config.similarity, SimilarityConfig::Bm25 { k1: 0.9, b: 0.4 });
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynscoreError};
use crate::search::similarity::{BM25Similarity, Similarity, TfIdfSimilarity};

/// Which ranking model to score with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimilarityConfig {
    /// Okapi BM25.
    Bm25 {
        /// Term frequency saturation.
        k1: f32,
        /// Field length normalization.
        b: f32,
    },
    /// Classic TF-IDF.
    TfIdf,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        SimilarityConfig::Bm25 { k1: 1.2, b: 0.75 }
    }
}

impl SimilarityConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            SimilarityConfig::Bm25 { k1, b } => {
                if !k1.is_finite() || k1 < 0.0 {
                    return Err(SynscoreError::config(format!(
                        "illegal k1 value: {k1}, must be a non-negative finite value"
                    )));
                }
                if !(0.0..=1.0).contains(&b) {
                    return Err(SynscoreError::config(format!(
                        "illegal b value: {b}, must be between 0 and 1"
                    )));
                }
                Ok(())
            }
            SimilarityConfig::TfIdf => Ok(()),
        }
    }

    /// Instantiate the configured similarity.
    pub fn build(&self) -> Arc<dyn Similarity> {
        match *self {
            SimilarityConfig::Bm25 { k1, b } => Arc::new(BM25Similarity::with_params(k1, b)),
            SimilarityConfig::TfIdf => Arc::new(TfIdfSimilarity::new()),
        }
    }
}

/// Configuration for an [`IndexSearcher`](crate::search::searcher::IndexSearcher).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Score segments concurrently.
    pub parallel: bool,

    /// Thread pool size for parallel execution.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Ranking model.
    pub similarity: SimilarityConfig,
}

impl SearcherConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearcherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the configuration for invalid values.
    pub fn validate(&self) -> Result<()> {
        if self.thread_pool_size == Some(0) {
            return Err(SynscoreError::config("thread_pool_size must be at least 1"));
        }
        self.similarity.validate()
    }

    /// Number of threads a parallel searcher uses.
    pub fn thread_count(&self) -> usize {
        self.thread_pool_size.unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearcherConfig::default();

        assert!(!config.parallel);
        assert_eq!(config.thread_pool_size, None);
        assert!(config.thread_count() >= 1);
        assert_eq!(config.similarity, SimilarityConfig::Bm25 { k1: 1.2, b: 0.75 });
        assert_eq!(config.similarity.build().name(), "BM25Similarity");
    }

    #[test]
    fn test_tfidf_from_json() {
        let config = SearcherConfig::from_json_str(r#"{ "similarity": { "type": "tf_idf" } }"#).unwrap();

        assert_eq!(config.similarity, SimilarityConfig::TfIdf);
        assert_eq!(config.similarity.build().name(), "TfIdfSimilarity");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SearcherConfig::from_json_str(r#"{ "thread_pool_size": 0 }"#).unwrap_err();
        assert!(matches!(err, SynscoreError::Config(_)));

        let err = SearcherConfig::from_json_str(r#"{ "similarity": { "type": "bm25", "k1": 1.2, "b": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, SynscoreError::Config(_)));

        let err = SearcherConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SynscoreError::Json(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "parallel": true, "thread_pool_size": 2 }}"#).unwrap();

        let config = SearcherConfig::from_json_file(file.path()).unwrap();
        assert!(config.parallel);
        assert_eq!(config.thread_count(), 2);
    }

    #[test]
    fn test_round_trip_json() {
        let config = SearcherConfig {
            parallel: true,
            thread_pool_size: Some(4),
            similarity: SimilarityConfig::TfIdf,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SearcherConfig::from_json_str(&json).unwrap(), config);
    }
}
