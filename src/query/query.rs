//! Base query and weight traits.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::reader::LeafContext;
use crate::index::term::Term;
use crate::search::explanation::Explanation;
use crate::search::scorer::Scorer;
use crate::search::searcher::IndexSearcher;

/// What the consumer of a weight needs from its scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScoreMode {
    /// Every matching document is scored.
    #[default]
    Complete,
    /// Only the set of matching documents matters.
    CompleteNoScores,
}

impl ScoreMode {
    /// Whether scores will be read.
    pub fn needs_scores(self) -> bool {
        matches!(self, ScoreMode::Complete)
    }
}

/// Trait for search queries.
///
/// A query is an immutable description of what to match. Executing it goes
/// through [`rewrite`](Query::rewrite) until the query is primitive and then
/// [`create_weight`](Query::create_weight), which binds it to one searcher.
pub trait Query: Send + Sync + Debug {
    /// Bind this query to a searcher.
    ///
    /// `boost` is the effective boost, which the searcher takes from
    /// [`boost`](Query::boost) and compound queries multiply down.
    fn create_weight(
        &self,
        searcher: &IndexSearcher,
        score_mode: ScoreMode,
        boost: f32,
    ) -> Result<Box<dyn Weight>>;

    /// Simplify this query. Returns `None` if it is already primitive.
    fn rewrite(&self, _searcher: &IndexSearcher) -> Result<Option<Box<dyn Query>>> {
        Ok(None)
    }

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Set the boost factor for this query.
    fn set_boost(&mut self, boost: f32);

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get the field name this query searches in, if applicable.
    /// Returns None for queries that don't target a specific field (e.g., BooleanQuery).
    fn field(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A query bound to the statistics of one searcher.
///
/// Weights are shared by the threads that score different segments, so all
/// per-segment state lives in the scorers they create.
pub trait Weight: Send + Sync + Debug {
    /// Description of the query this weight was created from.
    fn description(&self) -> String;

    /// Create a scorer for one segment, or `None` if nothing in it can match.
    fn scorer(&self, leaf: &LeafContext) -> Result<Option<Box<dyn Scorer>>>;

    /// Explain how a segment-local document scores.
    fn explain(&self, leaf: &LeafContext, doc: u64) -> Result<Explanation>;

    /// Add every term this weight scores to `terms`.
    fn extract_terms(&self, terms: &mut BTreeSet<Term>);
}
