//! # synscore
//!
//! Synonym-aware scoring for a segmented full-text index.
//!
//! A [`SynonymQuery`](query::SynonymQuery) matches documents containing any
//! of a group of terms from one field, but scores each document once, as if
//! the group were a single term whose frequency is the sum of its members'
//! frequencies and whose statistics are merged across the group.
//!
//! ```
//! use synscore::index::{MemoryDocument, MemoryIndex, Term};
//! use synscore::query::SynonymQuery;
//! use synscore::search::IndexSearcher;
//!
//! let mut index = MemoryIndex::new();
//! index.add_document(MemoryDocument::new().add_text("body", "a quick fox"));
//! index.add_document(MemoryDocument::new().add_text("body", "a fast car"));
//! index.add_document(MemoryDocument::new().add_text("body", "a slow boat"));
//! index.commit();
//!
//! let searcher = IndexSearcher::new(index.leaves());
//! let query = SynonymQuery::new(vec![Term::new("body", "quick"), Term::new("body", "fast")]).unwrap();
//! let top = searcher.search(&query, 10).unwrap();
//!
//! assert_eq!(top.total_hits, 2);
//! ```
//!
//! ## Features
//!
//! - Synonym groups scored as one virtual term
//! - Heap-based disjunction over per-segment postings
//! - Score explanations that reproduce scoring exactly
//! - BM25 and TF-IDF similarities
//! - Parallel per-segment search on a rayon pool

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod search;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
