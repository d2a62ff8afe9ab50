//! A query that matches nothing.

use std::any::Any;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::index::reader::LeafContext;
use crate::index::term::Term;
use crate::query::query::{Query, ScoreMode, Weight};
use crate::search::explanation::Explanation;
use crate::search::scorer::Scorer;
use crate::search::searcher::IndexSearcher;

/// Matches no documents. Produced by rewriting queries with nothing to match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchNoDocsQuery {
    reason: String,
    boost: f32,
}

impl MatchNoDocsQuery {
    /// Create a query that matches nothing for the given reason.
    pub fn new<S: Into<String>>(reason: S) -> Self {
        MatchNoDocsQuery {
            reason: reason.into(),
            boost: 1.0,
        }
    }

    /// Why nothing matches.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for MatchNoDocsQuery {
    fn default() -> Self {
        Self::new("")
    }
}

impl Query for MatchNoDocsQuery {
    fn create_weight(
        &self,
        _searcher: &IndexSearcher,
        _score_mode: ScoreMode,
        _boost: f32,
    ) -> Result<Box<dyn Weight>> {
        Ok(Box::new(MatchNoDocsWeight {
            description: self.description(),
            reason: self.reason.clone(),
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        format!("MatchNoDocsQuery(\"{}\")", self.reason)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct MatchNoDocsWeight {
    description: String,
    reason: String,
}

impl Weight for MatchNoDocsWeight {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn scorer(&self, _leaf: &LeafContext) -> Result<Option<Box<dyn Scorer>>> {
        Ok(None)
    }

    fn explain(&self, _leaf: &LeafContext, _doc: u64) -> Result<Explanation> {
        Ok(Explanation::no_match(self.reason.clone(), vec![]))
    }

    fn extract_terms(&self, _terms: &mut BTreeSet<Term>) {}
}
