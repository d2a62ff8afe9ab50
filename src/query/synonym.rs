//! Synonym query: several terms of one field scored as a single term.
//!
//! A document matches a [`SynonymQuery`] if it contains any of the terms, but
//! the similarity is invoked only once per document, with the summed
//! frequency of every term present and with statistics merged across the
//! group. Documents that happen to contain several variants are therefore not
//! rewarded as if they matched several independent terms.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{Result, SynscoreError};
use crate::index::reader::LeafContext;
use crate::index::term::Term;
use crate::query::boolean::{BooleanQuery, BooleanQueryBuilder, max_clause_count};
use crate::query::match_none::MatchNoDocsQuery;
use crate::query::query::{Query, ScoreMode, Weight};
use crate::query::term::{TermQuery, open_term_scorer};
use crate::search::disjunction::DisjunctionIterator;
use crate::search::explanation::Explanation;
use crate::search::scorer::{DocIterator, Scorer, TermScorer};
use crate::search::searcher::IndexSearcher;
use crate::search::similarity::{LeafSimScorer, SimScorer};
use crate::search::stats::{TermStatistics, pseudo_statistics};
use crate::search::term_states::TermStates;

/// A validated set of terms sharing one field, kept sorted.
///
/// Duplicates are kept and count once per occurrence in the statistics.
/// Two groups built from the same terms in any order are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermGroup {
    terms: Vec<Term>,
}

impl TermGroup {
    /// Validate `terms` against the global clause limit.
    pub fn new<I: IntoIterator<Item = Term>>(terms: I) -> Result<Self> {
        Self::with_max_clause_count(terms, max_clause_count())
    }

    /// Validate `terms` against an explicit clause limit.
    ///
    /// Fails with [`SynscoreError::InvalidArgument`] if the terms do not all
    /// share one field, checked first, and with
    /// [`SynscoreError::TooManyClauses`] if there are more than
    /// `max_clause_count` terms.
    pub fn with_max_clause_count<I: IntoIterator<Item = Term>>(
        terms: I,
        max_clause_count: usize,
    ) -> Result<Self> {
        let mut terms: Vec<Term> = terms.into_iter().collect();
        if let Some((first, rest)) = terms.split_first() {
            if let Some(other) = rest.iter().find(|t| t.field() != first.field()) {
                return Err(SynscoreError::invalid_argument(format!(
                    "synonyms must be across the same field, got {first} and {other}"
                )));
            }
        }
        if terms.len() > max_clause_count {
            return Err(SynscoreError::too_many_clauses(terms.len(), max_clause_count));
        }
        terms.sort();
        Ok(TermGroup { terms })
    }

    /// The terms in ascending order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Number of terms, duplicates included.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The shared field, `None` for an empty group.
    pub fn field(&self) -> Option<&str> {
        self.terms.first().map(Term::field)
    }
}

/// A query that scores a group of synonyms as if they were one term.
#[derive(Debug, Clone)]
pub struct SynonymQuery {
    group: TermGroup,
    boost: f32,
}

impl SynonymQuery {
    /// Create a synonym query, validating the terms.
    pub fn new<I: IntoIterator<Item = Term>>(terms: I) -> Result<Self> {
        Ok(Self::from_group(TermGroup::new(terms)?))
    }

    /// Create a synonym query over an already validated group.
    pub fn from_group(group: TermGroup) -> Self {
        SynonymQuery { group, boost: 1.0 }
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// The terms in ascending order.
    pub fn terms(&self) -> &[Term] {
        self.group.terms()
    }

    /// The validated term group.
    pub fn group(&self) -> &TermGroup {
        &self.group
    }

    /// Render the query, omitting the field of terms in `default_field`.
    pub fn to_string_with_field(&self, default_field: &str) -> String {
        let terms: Vec<String> = self
            .group
            .terms()
            .iter()
            .map(|term| {
                if term.field() == default_field {
                    term.text()
                } else {
                    term.to_string()
                }
            })
            .collect();
        let mut rendered = format!("Synonym({})", terms.join(" "));
        if self.boost != 1.0 {
            rendered.push_str(&format!("^{}", self.boost));
        }
        rendered
    }

    fn term_disjunction(&self, searcher: &IndexSearcher) -> Result<BooleanQuery> {
        let mut builder = BooleanQueryBuilder::with_max_clause_count(searcher.max_clause_count());
        for term in self.group.terms() {
            builder = builder.add_should(Box::new(TermQuery::new(term.clone())))?;
        }
        Ok(builder.build())
    }
}

impl PartialEq for SynonymQuery {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.boost.to_bits() == other.boost.to_bits()
    }
}

impl Eq for SynonymQuery {}

impl Hash for SynonymQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.boost.to_bits().hash(state);
    }
}

impl fmt::Display for SynonymQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_field(""))
    }
}

impl Query for SynonymQuery {
    fn create_weight(
        &self,
        searcher: &IndexSearcher,
        score_mode: ScoreMode,
        boost: f32,
    ) -> Result<Box<dyn Weight>> {
        if score_mode.needs_scores() {
            Ok(Box::new(SynonymWeight::new(self, searcher, boost)?))
        } else {
            self.term_disjunction(searcher)?
                .create_weight(searcher, score_mode, boost)
        }
    }

    fn rewrite(&self, _searcher: &IndexSearcher) -> Result<Option<Box<dyn Query>>> {
        match self.group.terms() {
            [] => Ok(Some(Box::new(MatchNoDocsQuery::new("empty synonym group")))),
            [term] => Ok(Some(Box::new(
                TermQuery::new(term.clone()).with_boost(self.boost),
            ))),
            _ => Ok(None),
        }
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        self.to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self) -> Option<&str> {
        self.group.field()
    }
}

/// Weight for [`SynonymQuery`].
///
/// Holds the per-term segment resolutions and a single similarity bound to
/// the merged statistics of the whole group, shared by every segment.
#[derive(Debug)]
pub struct SynonymWeight {
    description: String,
    field: String,
    similarity_name: &'static str,
    terms: Vec<TermStates>,
    pseudo_stats: Option<TermStatistics>,
    /// `None` when no term of the group occurs in the searcher.
    sim: Option<Arc<dyn SimScorer>>,
}

impl SynonymWeight {
    fn new(query: &SynonymQuery, searcher: &IndexSearcher, boost: f32) -> Result<Self> {
        let field = query.group.field().unwrap_or_default().to_string();
        let terms = query
            .group
            .terms()
            .iter()
            .map(|term| TermStates::build(searcher.leaves(), term))
            .collect::<Result<Vec<_>>>()?;

        let pseudo_stats = pseudo_statistics(terms.iter().map(|states| searcher.term_statistics(states)));
        let collection_stats = searcher.collection_statistics(&field)?;

        let sim = match (&collection_stats, &pseudo_stats) {
            (Some(collection_stats), Some(pseudo_stats)) => {
                Some(searcher.similarity().scorer(boost, collection_stats, pseudo_stats))
            }
            _ => None,
        };

        log::debug!(
            "synonym weight for {}: pseudo statistics {:?}, scoreable: {}",
            query,
            pseudo_stats,
            sim.is_some()
        );

        Ok(SynonymWeight {
            description: query.to_string(),
            field,
            similarity_name: searcher.similarity().name(),
            terms,
            pseudo_stats,
            sim,
        })
    }

    /// Statistics of the virtual merged term, `None` if unscoreable.
    pub fn pseudo_statistics(&self) -> Option<TermStatistics> {
        self.pseudo_stats
    }

    /// Build the scorer for one segment.
    ///
    /// Terms missing from the segment are skipped. With no term left there is
    /// no scorer, a single term is scored by its own [`TermScorer`], and two
    /// or more are merged by a [`SynonymScorer`] whose score bound uses the
    /// sum of the per-term frequency bounds.
    pub fn segment_scorer(&self, leaf: &LeafContext) -> Result<Option<SegmentScorer>> {
        let Some(sim) = &self.sim else {
            return Ok(None);
        };

        let mut subs = Vec::with_capacity(self.terms.len());
        let mut total_max_freq: u64 = 0;
        for states in &self.terms {
            if let Some((scorer, max_freq)) = open_term_scorer(leaf, states, sim)? {
                total_max_freq += u64::from(max_freq);
                subs.push(scorer);
            }
        }

        let scorer = match subs.len() {
            0 => None,
            1 => subs.pop().map(SegmentScorer::Single),
            _ => {
                let similarity = LeafSimScorer::new(
                    Arc::clone(sim),
                    Arc::clone(leaf.reader()),
                    &self.field,
                    total_max_freq as f32,
                );
                Some(SegmentScorer::Synonym(SynonymScorer::new(similarity, subs)))
            }
        };

        log::trace!(
            "segment {}: {} of {} synonym terms present",
            leaf.ord(),
            match &scorer {
                None => 0,
                Some(SegmentScorer::Single(_)) => 1,
                Some(SegmentScorer::Synonym(s)) => s.sub_count(),
            },
            self.terms.len()
        );
        Ok(scorer)
    }
}

impl Weight for SynonymWeight {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn scorer(&self, leaf: &LeafContext) -> Result<Option<Box<dyn Scorer>>> {
        Ok(self.segment_scorer(leaf)?.map(SegmentScorer::into_boxed))
    }

    fn explain(&self, leaf: &LeafContext, doc: u64) -> Result<Explanation> {
        if let Some(mut scorer) = self.segment_scorer(leaf)? {
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
        for states in &self.terms {
            terms.insert(states.term().clone());
        }
    }
}

/// The scorer a [`SynonymWeight`] builds for one segment.
#[derive(Debug)]
pub enum SegmentScorer {
    /// Only one term of the group occurs in the segment.
    Single(TermScorer),
    /// Two or more terms occur and are merged.
    Synonym(SynonymScorer),
}

impl SegmentScorer {
    /// Combined frequency of the group in the current document.
    pub fn freq(&self) -> u32 {
        match self {
            SegmentScorer::Single(scorer) => scorer.freq(),
            SegmentScorer::Synonym(scorer) => scorer.freq(),
        }
    }

    /// The similarity scoring this segment.
    pub fn similarity(&self) -> &LeafSimScorer {
        match self {
            SegmentScorer::Single(scorer) => scorer.similarity(),
            SegmentScorer::Synonym(scorer) => scorer.similarity(),
        }
    }

    /// Unwrap into a boxed scorer, exposing a lone term scorer directly.
    pub fn into_boxed(self) -> Box<dyn Scorer> {
        match self {
            SegmentScorer::Single(scorer) => Box::new(scorer),
            SegmentScorer::Synonym(scorer) => Box::new(scorer),
        }
    }
}

impl DocIterator for SegmentScorer {
    fn doc_id(&self) -> u64 {
        match self {
            SegmentScorer::Single(scorer) => scorer.doc_id(),
            SegmentScorer::Synonym(scorer) => scorer.doc_id(),
        }
    }

    fn next(&mut self) -> Result<u64> {
        match self {
            SegmentScorer::Single(scorer) => scorer.next(),
            SegmentScorer::Synonym(scorer) => scorer.next(),
        }
    }

    fn skip_to(&mut self, target: u64) -> Result<u64> {
        match self {
            SegmentScorer::Single(scorer) => scorer.skip_to(target),
            SegmentScorer::Synonym(scorer) => scorer.skip_to(target),
        }
    }

    fn cost(&self) -> u64 {
        match self {
            SegmentScorer::Single(scorer) => scorer.cost(),
            SegmentScorer::Synonym(scorer) => scorer.cost(),
        }
    }
}

impl Scorer for SegmentScorer {
    fn score(&self) -> Result<f32> {
        match self {
            SegmentScorer::Single(scorer) => scorer.score(),
            SegmentScorer::Synonym(scorer) => scorer.score(),
        }
    }

    fn max_score(&self) -> f32 {
        match self {
            SegmentScorer::Single(scorer) => scorer.max_score(),
            SegmentScorer::Synonym(scorer) => scorer.max_score(),
        }
    }
}

/// Merges the postings of several synonyms and scores each document once
/// with the sum of their frequencies.
#[derive(Debug)]
pub struct SynonymScorer {
    disjunction: DisjunctionIterator<TermScorer>,
    similarity: LeafSimScorer,
    subs: usize,
}

impl SynonymScorer {
    /// Create a scorer over positioned term scorers.
    pub fn new(similarity: LeafSimScorer, subs: Vec<TermScorer>) -> Self {
        SynonymScorer {
            subs: subs.len(),
            disjunction: DisjunctionIterator::new(subs),
            similarity,
        }
    }

    /// Sum of the frequencies of every term on the current document.
    pub fn freq(&self) -> u32 {
        self.disjunction
            .matching()
            .fold(0u32, |sum, scorer| sum.saturating_add(scorer.freq()))
    }

    /// Number of terms on the current document.
    pub fn matching_count(&self) -> usize {
        self.disjunction.matching_count()
    }

    /// Number of term scorers merged.
    pub fn sub_count(&self) -> usize {
        self.subs
    }

    /// The similarity scoring the combined frequency.
    pub fn similarity(&self) -> &LeafSimScorer {
        &self.similarity
    }
}

impl DocIterator for SynonymScorer {
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

impl Scorer for SynonymScorer {
    fn score(&self) -> Result<f32> {
        self.similarity.score(self.doc_id(), self.freq() as f32)
    }

    fn max_score(&self) -> f32 {
        self.similarity.max_score()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::index::reader::{IndexOptions, NO_MORE_DOCS};
    use crate::search::similarity::Similarity;

    fn body(text: &str) -> Term {
        Term::new("body", text)
    }

    fn quick_fast() -> SynonymQuery {
        SynonymQuery::new(vec![body("quick"), body("fast")]).unwrap()
    }

    /// quick: doc_freq 2, total_term_freq 5. fast: doc_freq 3, total_term_freq 4.
    fn searcher() -> IndexSearcher {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "quick quick quick fast"));
        index.add_document(MemoryDocument::new().add_text("body", "quick quick fast"));
        index.add_document(MemoryDocument::new().add_text("body", "fast fast"));
        index.add_document(MemoryDocument::new().add_text("body", "slow turtle"));
        index.commit();
        IndexSearcher::new(index.leaves())
    }

    fn synonym_weight(searcher: &IndexSearcher, query: &SynonymQuery) -> SynonymWeight {
        SynonymWeight::new(query, searcher, query.boost()).unwrap()
    }

    #[test]
    fn test_group_is_sorted_and_order_insensitive() {
        let a = TermGroup::new(vec![body("quick"), body("fast"), body("rapid")]).unwrap();
        let b = TermGroup::new(vec![body("rapid"), body("quick"), body("fast")]).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.terms(), &[body("fast"), body("quick"), body("rapid")]);
        assert_eq!(a.field(), Some("body"));

        let set: HashSet<SynonymQuery> = [
            SynonymQuery::from_group(a.clone()),
            SynonymQuery::from_group(b),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 1);
        assert_ne!(
            SynonymQuery::from_group(a.clone()),
            SynonymQuery::from_group(a).with_boost(2.0)
        );
    }

    #[test]
    fn test_group_rejects_mixed_fields() {
        let err = TermGroup::new(vec![body("quick"), Term::new("title", "fast")]).unwrap_err();
        assert!(matches!(err, SynscoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_group_rejects_too_many_terms() {
        let terms = (0..5).map(|i| body(&format!("t{i}")));
        let err = TermGroup::with_max_clause_count(terms, 4).unwrap_err();
        assert!(matches!(err, SynscoreError::TooManyClauses { count: 5, max: 4 }));

        let terms = (0..4).map(|i| body(&format!("t{i}")));
        assert_eq!(TermGroup::with_max_clause_count(terms, 4).unwrap().len(), 4);
    }

    #[test]
    fn test_field_mismatch_reported_before_clause_limit() {
        let err = TermGroup::with_max_clause_count(vec![body("a"), Term::new("title", "b")], 1).unwrap_err();
        assert!(matches!(err, SynscoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_group_keeps_duplicates() {
        let group = TermGroup::new(vec![body("quick"), body("quick")]).unwrap();
        assert_eq!(group.len(), 2);

        let searcher = searcher();
        let query = SynonymQuery::from_group(group);
        let weight = synonym_weight(&searcher, &query);
        assert_eq!(weight.pseudo_statistics(), Some(TermStatistics::new(2, 10)));
    }

    #[test]
    fn test_display() {
        let query = quick_fast();
        assert_eq!(query.to_string(), "Synonym(body:fast body:quick)");
        assert_eq!(query.to_string_with_field("body"), "Synonym(fast quick)");
        assert_eq!(query.with_boost(2.0).to_string(), "Synonym(body:fast body:quick)^2");
    }

    #[test]
    fn test_rewrite() {
        let searcher = searcher();

        let empty = SynonymQuery::new(Vec::new()).unwrap();
        let rewritten = empty.rewrite(&searcher).unwrap().unwrap();
        assert!(rewritten.as_any().is::<MatchNoDocsQuery>());

        let single = SynonymQuery::new(vec![body("quick")]).unwrap().with_boost(1.5);
        let rewritten = single.rewrite(&searcher).unwrap().unwrap();
        let term_query = rewritten.as_any().downcast_ref::<TermQuery>().unwrap();
        assert_eq!(term_query.term(), &body("quick"));
        assert_eq!(term_query.boost(), 1.5);
        assert!(rewritten.rewrite(&searcher).unwrap().is_none());

        assert!(quick_fast().rewrite(&searcher).unwrap().is_none());
    }

    #[test]
    fn test_pseudo_statistics() {
        let searcher = searcher();
        let weight = synonym_weight(&searcher, &quick_fast());
        assert_eq!(weight.pseudo_statistics(), Some(TermStatistics::new(3, 9)));

        let absent = SynonymQuery::new(vec![body("nope"), body("nada")]).unwrap();
        let weight = synonym_weight(&searcher, &absent);
        assert_eq!(weight.pseudo_statistics(), None);
        assert!(weight.scorer(&searcher.leaves()[0]).unwrap().is_none());
        assert!(!weight.explain(&searcher.leaves()[0], 0).unwrap().is_match());
    }

    #[test]
    fn test_scores_with_summed_frequency() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let weight = synonym_weight(&searcher, &quick_fast());

        let collection = searcher.collection_statistics("body").unwrap().unwrap();
        let sim = searcher
            .similarity()
            .scorer(1.0, &collection, &TermStatistics::new(3, 9));

        let Some(SegmentScorer::Synonym(mut scorer)) = weight.segment_scorer(leaf).unwrap() else {
            panic!("expected a merged scorer");
        };

        // doc 0: quick x3 + fast x1, four tokens
        assert_eq!(scorer.doc_id(), 0);
        assert_eq!(scorer.matching_count(), 2);
        assert_eq!(scorer.freq(), 4);
        assert_eq!(scorer.score().unwrap(), sim.score(4.0, 4));

        // doc 1: quick x2 + fast x1, three tokens
        assert_eq!(scorer.next().unwrap(), 1);
        assert_eq!(scorer.freq(), 3);
        assert_eq!(scorer.score().unwrap(), sim.score(3.0, 3));

        // doc 2: fast x2 only
        assert_eq!(scorer.next().unwrap(), 2);
        assert_eq!(scorer.matching_count(), 1);
        assert_eq!(scorer.freq(), 2);
        assert_eq!(scorer.score().unwrap(), sim.score(2.0, 2));

        assert_eq!(scorer.next().unwrap(), NO_MORE_DOCS);
    }

    #[test]
    fn test_score_is_not_sum_of_term_scores() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let mut synonym = synonym_weight(&searcher, &quick_fast()).scorer(leaf).unwrap().unwrap();

        let quick = TermQuery::new(body("quick"))
            .create_weight(&searcher, ScoreMode::Complete, 1.0)
            .unwrap();
        let fast = TermQuery::new(body("fast"))
            .create_weight(&searcher, ScoreMode::Complete, 1.0)
            .unwrap();
        let independent = quick.explain(leaf, 1).unwrap().value() + fast.explain(leaf, 1).unwrap().value();

        synonym.skip_to(1).unwrap();
        assert!(synonym.score().unwrap() < independent);
    }

    #[test]
    fn test_max_score_bounds_every_document() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let mut scorer = synonym_weight(&searcher, &quick_fast()).scorer(leaf).unwrap().unwrap();

        let max_score = scorer.max_score();
        while scorer.doc_id() != NO_MORE_DOCS {
            assert!(scorer.score().unwrap() <= max_score);
            scorer.next().unwrap();
        }
    }

    #[test]
    fn test_segment_decision_table() {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "quick brown"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "quick and fast"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "nothing here"));
        index.commit();
        let searcher = IndexSearcher::new(index.leaves());
        let weight = synonym_weight(&searcher, &quick_fast());
        let leaves = searcher.leaves();

        assert!(matches!(
            weight.segment_scorer(&leaves[0]).unwrap(),
            Some(SegmentScorer::Single(_))
        ));
        assert!(matches!(
            weight.segment_scorer(&leaves[1]).unwrap(),
            Some(SegmentScorer::Synonym(_))
        ));
        assert!(weight.segment_scorer(&leaves[2]).unwrap().is_none());
        assert!(weight.scorer(&leaves[2]).unwrap().is_none());
    }

    #[test]
    fn test_single_segment_term_uses_merged_statistics() {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "quick brown"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "fast fast car"));
        index.commit();
        let searcher = IndexSearcher::new(index.leaves());
        let weight = synonym_weight(&searcher, &quick_fast());
        let leaf = &searcher.leaves()[0];

        let collection = searcher.collection_statistics("body").unwrap().unwrap();
        let merged = weight.pseudo_statistics().unwrap();
        assert_eq!(merged, TermStatistics::new(1, 3));
        let sim = searcher.similarity().scorer(1.0, &collection, &merged);

        let scorer = weight.scorer(leaf).unwrap().unwrap();
        assert_eq!(scorer.doc_id(), 0);
        assert_eq!(scorer.score().unwrap(), sim.score(1.0, 2));
    }

    #[test]
    fn test_explain_reproduces_score() {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "quick quick fast"));
        index.add_document(MemoryDocument::new().add_text("body", "slow"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "fast lane"));
        index.commit();
        let searcher = IndexSearcher::new(index.leaves());
        let weight = synonym_weight(&searcher, &quick_fast());

        for leaf in searcher.leaves() {
            let mut scorer = weight.scorer(leaf).unwrap().unwrap();
            while scorer.doc_id() != NO_MORE_DOCS {
                let doc = scorer.doc_id();
                let explanation = weight.explain(leaf, doc).unwrap();
                assert!(explanation.is_match());
                assert_eq!(explanation.value(), scorer.score().unwrap());
                assert_eq!(
                    explanation.description(),
                    format!("weight(Synonym(body:fast body:quick) in {doc}) [BM25Similarity], result of:")
                );
                scorer.next().unwrap();
            }
        }

        let explanation = weight.explain(&searcher.leaves()[0], 0).unwrap();
        assert!(explanation.to_string().contains("termFreq=3"));

        let missed = weight.explain(&searcher.leaves()[0], 1).unwrap();
        assert!(!missed.is_match());
        assert_eq!(missed.description(), "no matching term");
    }

    #[test]
    fn test_merged_bound_sums_term_bounds() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let weight = synonym_weight(&searcher, &quick_fast());

        let collection = searcher.collection_statistics("body").unwrap().unwrap();
        let sim = searcher
            .similarity()
            .scorer(1.0, &collection, &weight.pseudo_statistics().unwrap());

        // quick: 5 - 2 + 1, fast: 4 - 3 + 1
        let Some(SegmentScorer::Synonym(scorer)) = weight.segment_scorer(leaf).unwrap() else {
            panic!("expected a merged scorer");
        };
        assert_eq!(scorer.max_score(), sim.max_score(6.0));
    }

    #[test]
    fn test_docs_only_field_bounds_each_term_by_one() {
        let mut index = MemoryIndex::new().with_field_options("tags", IndexOptions::Docs);
        index.add_document(MemoryDocument::new().add_tokens("tags", ["red", "red", "crimson"]));
        index.add_document(MemoryDocument::new().add_tokens("tags", ["crimson"]));
        index.commit();
        let searcher = IndexSearcher::new(index.leaves());
        let query = SynonymQuery::new(vec![Term::new("tags", "red"), Term::new("tags", "crimson")]).unwrap();
        let weight = synonym_weight(&searcher, &query);
        let leaf = &searcher.leaves()[0];

        let collection = searcher.collection_statistics("tags").unwrap().unwrap();
        let sim = searcher
            .similarity()
            .scorer(1.0, &collection, &weight.pseudo_statistics().unwrap());

        let Some(SegmentScorer::Synonym(scorer)) = weight.segment_scorer(leaf).unwrap() else {
            panic!("expected a merged scorer");
        };
        assert_eq!(scorer.freq(), 2);
        assert_eq!(scorer.max_score(), sim.max_score(2.0));
    }

    #[test]
    fn test_no_scores_uses_boolean_disjunction() {
        let searcher = searcher();
        let weight = quick_fast()
            .create_weight(&searcher, ScoreMode::CompleteNoScores, 1.0)
            .unwrap();
        assert_eq!(weight.description(), "(body:fast body:quick)");

        let mut scorer = weight.scorer(&searcher.leaves()[0]).unwrap().unwrap();
        let mut docs = Vec::new();
        while scorer.doc_id() != NO_MORE_DOCS {
            docs.push(scorer.doc_id());
            scorer.next().unwrap();
        }
        assert_eq!(docs, vec![0, 1, 2]);
    }

    #[test]
    fn test_extract_terms() {
        let searcher = searcher();
        let weight = quick_fast()
            .create_weight(&searcher, ScoreMode::Complete, 1.0)
            .unwrap();

        let mut terms = BTreeSet::new();
        weight.extract_terms(&mut terms);
        assert_eq!(terms.into_iter().collect::<Vec<_>>(), vec![body("fast"), body("quick")]);
    }

    #[test]
    fn test_boost_scales_score() {
        let searcher = searcher();
        let leaf = &searcher.leaves()[0];
        let plain = synonym_weight(&searcher, &quick_fast()).scorer(leaf).unwrap().unwrap();
        let boosted = synonym_weight(&searcher, &quick_fast().with_boost(2.0))
            .scorer(leaf)
            .unwrap()
            .unwrap();

        assert!((boosted.score().unwrap() - 2.0 * plain.score().unwrap()).abs() < 1e-5);
    }
}
