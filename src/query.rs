//! Queries and their per-searcher weights.

pub mod boolean;
pub mod match_none;
#[allow(clippy::module_inception)]
pub mod query;
pub mod synonym;
pub mod term;

pub use self::boolean::{BooleanQuery, BooleanQueryBuilder, max_clause_count, set_max_clause_count};
pub use self::match_none::MatchNoDocsQuery;
pub use self::query::{Query, ScoreMode, Weight};
pub use self::synonym::{SynonymQuery, TermGroup};
pub use self::term::TermQuery;
