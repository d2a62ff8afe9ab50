//! Disjunctive boolean query and the global clause limit.
//!
//! Only SHOULD clauses are supported: a document matches if any clause
//! matches, and its score is the sum of the matching clauses' scores.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SynscoreError};
use crate::index::reader::LeafContext;
use crate::index::term::Term;
use crate::query::match_none::MatchNoDocsQuery;
use crate::query::query::{Query, ScoreMode, Weight};
use crate::search::disjunction::DisjunctionIterator;
use crate::search::explanation::Explanation;
use crate::search::scorer::{DocIterator, Scorer};
use crate::search::searcher::IndexSearcher;

/// Default maximum number of clauses per query.
pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 1024;

static MAX_CLAUSE_COUNT: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_CLAUSE_COUNT);

/// Maximum number of clauses a boolean or synonym query may hold.
pub fn max_clause_count() -> usize {
    MAX_CLAUSE_COUNT.load(Ordering::Relaxed)
}

/// Change the process-wide clause limit. Queries already built are unaffected.
pub fn set_max_clause_count(max: usize) -> Result<()> {
    if max == 0 {
        return Err(SynscoreError::invalid_argument(
            "max clause count must be at least 1",
        ));
    }
    MAX_CLAUSE_COUNT.store(max, Ordering::Relaxed);
    Ok(())
}

/// A query matching documents that match any of its clauses.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    /// The SHOULD clauses.
    clauses: Vec<Box<dyn Query>>,
    /// The boost factor for this query.
    boost: f32,
}

impl BooleanQuery {
    /// Start building a query bounded by the global clause limit.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::with_max_clause_count(max_clause_count())
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[Box<dyn Query>] {
        &self.clauses
    }

    /// Check if this query is empty.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Builder for [`BooleanQuery`] that enforces a clause limit.
#[derive(Debug)]
pub struct BooleanQueryBuilder {
    clauses: Vec<Box<dyn Query>>,
    max_clause_count: usize,
}

impl BooleanQueryBuilder {
    /// Create a builder with an explicit clause limit.
    pub fn with_max_clause_count(max_clause_count: usize) -> Self {
        BooleanQueryBuilder {
            clauses: Vec::new(),
            max_clause_count,
        }
    }

    /// Add a SHOULD clause.
    pub fn add_should(mut self, query: Box<dyn Query>) -> Result<Self> {
        if self.clauses.len() >= self.max_clause_count {
            return Err(SynscoreError::too_many_clauses(
                self.clauses.len() + 1,
                self.max_clause_count,
            ));
        }
        self.clauses.push(query);
        Ok(self)
    }

    /// Finish the query.
    pub fn build(self) -> BooleanQuery {
        BooleanQuery {
            clauses: self.clauses,
            boost: 1.0,
        }
    }
}

impl Query for BooleanQuery {
    fn create_weight(
        &self,
        searcher: &IndexSearcher,
        score_mode: ScoreMode,
        boost: f32,
    ) -> Result<Box<dyn Weight>> {
        let weights = self
            .clauses
            .iter()
            .map(|clause| clause.create_weight(searcher, score_mode, boost * clause.boost()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(BooleanWeight {
            description: self.description(),
            weights,
        }))
    }

    fn rewrite(&self, searcher: &IndexSearcher) -> Result<Option<Box<dyn Query>>> {
        match self.clauses.len() {
            0 => Ok(Some(Box::new(MatchNoDocsQuery::new(
                "empty BooleanQuery",
            )))),
            1 => {
                let mut single = self.clauses[0].clone();
                single.set_boost(single.boost() * self.boost);
                Ok(Some(single))
            }
            _ => {
                let mut changed = false;
                let mut clauses = Vec::with_capacity(self.clauses.len());
                for clause in &self.clauses {
                    match clause.rewrite(searcher)? {
                        Some(rewritten) => {
                            changed = true;
                            clauses.push(rewritten);
                        }
                        None => clauses.push(clause.clone()),
                    }
                }
                if changed {
                    Ok(Some(Box::new(BooleanQuery {
                        clauses,
                        boost: self.boost,
                    })))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let clauses: Vec<String> = self.clauses.iter().map(|c| c.description()).collect();
        if self.boost == 1.0 {
            format!("({})", clauses.join(" "))
        } else {
            format!("({})^{}", clauses.join(" "), self.boost)
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Weight for [`BooleanQuery`].
#[derive(Debug)]
pub struct BooleanWeight {
    description: String,
    weights: Vec<Box<dyn Weight>>,
}

impl Weight for BooleanWeight {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn scorer(&self, leaf: &LeafContext) -> Result<Option<Box<dyn Scorer>>> {
        let mut scorers = Vec::with_capacity(self.weights.len());
        for weight in &self.weights {
            if let Some(scorer) = weight.scorer(leaf)? {
                scorers.push(scorer);
            }
        }

        match scorers.len() {
            0 => Ok(None),
            1 => Ok(scorers.pop()),
            _ => Ok(Some(Box::new(DisjunctionSumScorer::new(scorers)))),
        }
    }

    fn explain(&self, leaf: &LeafContext, doc: u64) -> Result<Explanation> {
        let mut matched = Vec::new();
        for weight in &self.weights {
            let explanation = weight.explain(leaf, doc)?;
            if explanation.is_match() {
                matched.push(explanation);
            }
        }

        if matched.is_empty() {
            Ok(Explanation::no_match("no matching clause", vec![]))
        } else {
            let sum = matched.iter().map(Explanation::value).sum();
            Ok(Explanation::matched(sum, "sum of:", matched))
        }
    }

    fn extract_terms(&self, terms: &mut BTreeSet<Term>) {
        for weight in &self.weights {
            weight.extract_terms(terms);
        }
    }
}

/// Scores the union of its sub-scorers by summing the matching ones.
#[derive(Debug)]
pub struct DisjunctionSumScorer {
    disjunction: DisjunctionIterator<Box<dyn Scorer>>,
    max_score: f32,
}

impl DisjunctionSumScorer {
    /// Create a scorer over positioned sub-scorers.
    pub fn new(scorers: Vec<Box<dyn Scorer>>) -> Self {
        let max_score = scorers.iter().map(|s| s.max_score()).sum();
        DisjunctionSumScorer {
            disjunction: DisjunctionIterator::new(scorers),
            max_score,
        }
    }
}

impl DocIterator for DisjunctionSumScorer {
    fn doc_id(&self) -> u64 {
        self.disjunction.doc_id()
    }

    fn next(&mut self) -> Result<u64> {
        self.disjunction.next()
    }

    fn skip_to(&mut self, target: u64) -> Result<u64> {
        self.disjunction.skip_to(target)
    }

    fn cost(&self) -> u64 {
        self.disjunction.cost()
    }
}

impl Scorer for DisjunctionSumScorer {
    fn score(&self) -> Result<f32> {
        let mut sum = 0.0;
        for scorer in self.disjunction.matching() {
            sum += scorer.score()?;
        }
        Ok(sum)
    }

    fn max_score(&self) -> f32 {
        self.max_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::index::reader::NO_MORE_DOCS;
    use crate::query::term::TermQuery;

    fn searcher() -> IndexSearcher {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "quick fox"));
        index.add_document(MemoryDocument::new().add_text("body", "fast car"));
        index.add_document(MemoryDocument::new().add_text("body", "quick and fast"));
        index.add_document(MemoryDocument::new().add_text("body", "slow"));
        index.commit();
        IndexSearcher::new(index.leaves())
    }

    fn term(text: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(Term::new("body", text)))
    }

    #[test]
    fn test_builder_enforces_limit() {
        let builder = BooleanQueryBuilder::with_max_clause_count(2)
            .add_should(term("a"))
            .unwrap()
            .add_should(term("b"))
            .unwrap();

        let err = builder.add_should(term("c")).unwrap_err();
        assert!(matches!(err, SynscoreError::TooManyClauses { count: 3, max: 2 }));
    }

    #[test]
    fn test_set_max_clause_count_rejects_zero() {
        assert!(set_max_clause_count(0).is_err());
    }

    #[test]
    fn test_rewrite_empty_and_single() {
        let searcher = searcher();

        let empty = BooleanQuery::builder().build();
        let rewritten = empty.rewrite(&searcher).unwrap().unwrap();
        assert!(rewritten.as_any().is::<MatchNoDocsQuery>());

        let single = BooleanQuery::builder()
            .add_should(term("quick"))
            .unwrap()
            .build()
            .with_boost(3.0);
        let rewritten = single.rewrite(&searcher).unwrap().unwrap();
        let term_query = rewritten.as_any().downcast_ref::<TermQuery>().unwrap();
        assert_eq!(term_query.term(), &Term::new("body", "quick"));
        assert_eq!(rewritten.boost(), 3.0);

        let pair = BooleanQuery::builder()
            .add_should(term("quick"))
            .unwrap()
            .add_should(term("fast"))
            .unwrap()
            .build();
        assert!(pair.rewrite(&searcher).unwrap().is_none());
        assert_eq!(pair.description(), "(body:quick body:fast)");
    }

    #[test]
    fn test_disjunction_sums_scores() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let query = BooleanQuery::builder()
            .add_should(term("quick"))
            .unwrap()
            .add_should(term("fast"))
            .unwrap()
            .build();
        let weight = query.create_weight(&searcher, ScoreMode::Complete, 1.0).unwrap();

        let quick = term("quick")
            .create_weight(&searcher, ScoreMode::Complete, 1.0)
            .unwrap();
        let fast = term("fast")
            .create_weight(&searcher, ScoreMode::Complete, 1.0)
            .unwrap();

        let mut scorer = weight.scorer(leaf).unwrap().unwrap();
        let mut docs = Vec::new();
        while scorer.doc_id() != NO_MORE_DOCS {
            docs.push(scorer.doc_id());
            scorer.next().unwrap();
        }
        assert_eq!(docs, vec![0, 1, 2]);

        let mut scorer = weight.scorer(leaf).unwrap().unwrap();
        scorer.skip_to(2).unwrap();
        let expected = quick.explain(leaf, 2).unwrap().value() + fast.explain(leaf, 2).unwrap().value();
        assert!((scorer.score().unwrap() - expected).abs() < 1e-6);

        let explanation = weight.explain(leaf, 2).unwrap();
        assert_eq!(explanation.description(), "sum of:");
        assert_eq!(explanation.details().len(), 2);
        assert!(!weight.explain(leaf, 3).unwrap().is_match());
    }
}
