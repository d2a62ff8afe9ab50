//! Query execution: statistics, similarities, scorers and the searcher.

pub mod collector;
pub mod disjunction;
pub mod explanation;
pub mod scorer;
pub mod searcher;
pub mod similarity;
pub mod stats;
pub mod term_states;

pub use self::collector::{ScoreDoc, TopDocs, TopDocsCollector};
pub use self::explanation::Explanation;
pub use self::searcher::IndexSearcher;
pub use self::similarity::{BM25Similarity, LeafSimScorer, SimScorer, Similarity, TfIdfSimilarity};
pub use self::stats::{CollectionStatistics, TermStatistics};
