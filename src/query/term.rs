//! Term query implementation for exact term matching.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::index::reader::LeafContext;
use crate::index::term::Term;
use crate::query::query::{Query, ScoreMode, Weight};
use crate::search::explanation::Explanation;
use crate::search::scorer::{DocIterator, Scorer, TermScorer};
use crate::search::searcher::IndexSearcher;
use crate::search::similarity::{LeafSimScorer, SimScorer};
use crate::search::stats::bound_frequency;
use crate::search::term_states::TermStates;

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    /// The term to search for.
    term: Term,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    ///
    /// The term is matched exactly and is not analyzed, so it should already
    /// be in its indexed form (e.g., lowercased).
    pub fn new(term: Term) -> Self {
        TermQuery { term, boost: 1.0 }
    }

    /// Get the term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn create_weight(
        &self,
        searcher: &IndexSearcher,
        _score_mode: ScoreMode,
        boost: f32,
    ) -> Result<Box<dyn Weight>> {
        let states = TermStates::build(searcher.leaves(), &self.term)?;
        let collection_stats = searcher.collection_statistics(self.term.field())?;
        let term_stats = searcher.term_statistics(&states);

        let sim = match (collection_stats, term_stats) {
            (Some(collection_stats), Some(term_stats)) => Some(searcher.similarity().scorer(
                boost,
                &collection_stats,
                &term_stats,
            )),
            _ => None,
        };

        Ok(Box::new(TermWeight {
            description: self.description(),
            similarity_name: searcher.similarity().name(),
            states,
            sim,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        if self.boost == 1.0 {
            self.term.to_string()
        } else {
            format!("{}^{}", self.term, self.boost)
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(self.term.field())
    }
}

/// Open a scorer over one term's postings in `leaf`.
///
/// Returns `None` if the term does not occur in the segment. Otherwise the
/// scorer comes with the term's frequency bound in the segment, which also
/// bounds the scorer's own max score.
pub(crate) fn open_term_scorer(
    leaf: &LeafContext,
    states: &TermStates,
    sim: &Arc<dyn SimScorer>,
) -> Result<Option<(TermScorer, u32)>> {
    let term = states.term();
    let Some(state) = states.get_or_resolve(leaf)? else {
        return Ok(None);
    };

    let reader = leaf.reader();
    let max_freq = bound_frequency(
        reader.index_options(term.field()),
        state.total_term_freq,
        state.doc_freq,
    );
    let postings = reader.postings(term, &state)?;
    let similarity = LeafSimScorer::new(Arc::clone(sim), Arc::clone(reader), term.field(), max_freq as f32);
    Ok(Some((TermScorer::new(postings, similarity)?, max_freq)))
}

/// Weight for [`TermQuery`].
#[derive(Debug)]
pub struct TermWeight {
    description: String,
    similarity_name: &'static str,
    states: TermStates,
    /// `None` when the term occurs nowhere in the searcher.
    sim: Option<Arc<dyn SimScorer>>,
}

impl TermWeight {
    fn term_scorer(&self, leaf: &LeafContext) -> Result<Option<TermScorer>> {
        match &self.sim {
            Some(sim) => Ok(open_term_scorer(leaf, &self.states, sim)?.map(|(scorer, _)| scorer)),
            None => Ok(None),
        }
    }
}

impl Weight for TermWeight {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn scorer(&self, leaf: &LeafContext) -> Result<Option<Box<dyn Scorer>>> {
        Ok(self
            .term_scorer(leaf)?
            .map(|scorer| Box::new(scorer) as Box<dyn Scorer>))
    }

    fn explain(&self, leaf: &LeafContext, doc: u64) -> Result<Explanation> {
        if let Some(mut scorer) = self.term_scorer(leaf)? {
            if scorer.skip_to(doc)? == doc {
                let freq = scorer.freq();
                let freq_explanation =
                    Explanation::matched(freq as f32, format!("termFreq={freq}"), vec![]);
                let score = scorer.similarity().explain(doc, freq_explanation)?;
                return Ok(Explanation::matched(
                    score.value(),
                    format!(
                        "weight({} in {}) [{}], result of:",
                        self.description, doc, self.similarity_name
                    ),
                    vec![score],
                ));
            }
        }
        Ok(Explanation::no_match("no matching term", vec![]))
    }

    fn extract_terms(&self, terms: &mut BTreeSet<Term>) {
        terms.insert(self.states.term().clone());
    }
}
