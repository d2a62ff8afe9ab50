//! Index searcher: runs queries over a fixed set of segments.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::SearcherConfig;
use crate::error::{Result, SynscoreError};
use crate::index::reader::{LeafContext, LeafReader, NO_MORE_DOCS};
use crate::query::boolean::max_clause_count;
use crate::query::query::{Query, ScoreMode, Weight};
use crate::search::collector::{TopDocs, TopDocsCollector};
use crate::search::explanation::Explanation;
use crate::search::scorer::{DocIterator, Scorer};
use crate::search::similarity::Similarity;
use crate::search::stats::{CollectionStatistics, TermStatistics};
use crate::search::term_states::TermStates;

/// Searches a point-in-time view of an index made of several segments.
///
/// Document ids handed out by the searcher are global: the id of a document
/// is its segment-local id plus the number of documents in all preceding
/// segments. Segments are numbered by their position in the searcher, so
/// readers taken from several indexes can be searched together.
#[derive(Debug)]
pub struct IndexSearcher {
    leaves: Vec<LeafContext>,
    doc_bases: Vec<u64>,
    max_doc: u64,
    similarity: Arc<dyn Similarity>,
    config: SearcherConfig,
    thread_pool: Option<Arc<ThreadPool>>,
}

impl IndexSearcher {
    /// Create a sequential searcher with the default configuration.
    pub fn new(leaves: Vec<Arc<dyn LeafReader>>) -> Self {
        let config = SearcherConfig::default();
        let similarity = config.similarity.build();
        Self::assemble(leaves, config, similarity, None)
    }

    /// Create a searcher from a configuration, starting a thread pool if the
    /// configuration asks for parallel search.
    pub fn with_config(leaves: Vec<Arc<dyn LeafReader>>, config: SearcherConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = if config.parallel {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.thread_count())
                .thread_name(|i| format!("synscore-search-{i}"))
                .build()
                .map_err(|e| SynscoreError::internal(format!("Failed to create thread pool: {e}")))?;
            Some(Arc::new(pool))
        } else {
            None
        };

        let similarity = config.similarity.build();
        Ok(Self::assemble(leaves, config, similarity, thread_pool))
    }

    fn assemble(
        leaves: Vec<Arc<dyn LeafReader>>,
        config: SearcherConfig,
        similarity: Arc<dyn Similarity>,
        thread_pool: Option<Arc<ThreadPool>>,
    ) -> Self {
        let mut contexts = Vec::with_capacity(leaves.len());
        let mut doc_bases = Vec::with_capacity(leaves.len());
        let mut max_doc = 0;
        for (ord, reader) in leaves.into_iter().enumerate() {
            doc_bases.push(max_doc);
            let segment_max_doc = reader.max_doc();
            contexts.push(LeafContext::new(ord, max_doc, reader));
            max_doc += segment_max_doc;
        }

        IndexSearcher {
            leaves: contexts,
            doc_bases,
            max_doc,
            similarity,
            config,
            thread_pool,
        }
    }

    /// Replace the ranking model.
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// The segments searched, in doc id order.
    pub fn leaves(&self) -> &[LeafContext] {
        &self.leaves
    }

    /// First global doc id of each segment.
    pub fn doc_bases(&self) -> &[u64] {
        &self.doc_bases
    }

    /// One greater than the largest global doc id.
    pub fn max_doc(&self) -> u64 {
        self.max_doc
    }

    /// The ranking model.
    pub fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    /// The configuration the searcher was built with.
    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    /// The clause limit applied to queries built for this searcher.
    pub fn max_clause_count(&self) -> usize {
        max_clause_count()
    }

    /// Statistics of a field across all segments, `None` if no document
    /// has a value for it.
    pub fn collection_statistics(&self, field: &str) -> Result<Option<CollectionStatistics>> {
        let mut stats = CollectionStatistics {
            field: field.to_string(),
            max_doc: self.max_doc,
            doc_count: 0,
            sum_total_term_freq: 0,
            sum_doc_freq: 0,
        };

        for leaf in &self.leaves {
            if let Some(field_stats) = leaf.reader().field_stats(field)? {
                stats.doc_count += field_stats.doc_count;
                stats.sum_doc_freq += field_stats.sum_doc_freq;
                stats.sum_total_term_freq += field_stats.sum_total_term_freq;
            }
        }

        if stats.doc_count == 0 {
            Ok(None)
        } else {
            Ok(Some(stats))
        }
    }

    /// Statistics of a term, `None` if it occurs in no segment.
    pub fn term_statistics(&self, states: &TermStates) -> Option<TermStatistics> {
        states.statistics()
    }

    /// Rewrite a query until it no longer changes.
    pub fn rewrite(&self, query: &dyn Query) -> Result<Box<dyn Query>> {
        let mut current = query.clone_box();
        while let Some(rewritten) = current.rewrite(self)? {
            log::trace!("rewrote {} to {}", current.description(), rewritten.description());
            current = rewritten;
        }
        Ok(current)
    }

    /// Rewrite a query and bind it to this searcher.
    pub fn create_weight(&self, query: &dyn Query, score_mode: ScoreMode) -> Result<Box<dyn Weight>> {
        let rewritten = self.rewrite(query)?;
        rewritten.create_weight(self, score_mode, rewritten.boost())
    }

    /// Find the `top_k` best scoring documents.
    pub fn search(&self, query: &dyn Query, top_k: usize) -> Result<TopDocs> {
        let weight = self.create_weight(query, ScoreMode::Complete)?;
        log::debug!(
            "searching {} segments for {} (top {})",
            self.leaves.len(),
            weight.description(),
            top_k
        );

        let collector = match &self.thread_pool {
            Some(pool) => {
                let collectors = pool.install(|| {
                    (0..self.leaves.len())
                        .into_par_iter()
                        .map(|index| {
                            let mut collector = TopDocsCollector::new(top_k);
                            self.collect_leaf(weight.as_ref(), index, &mut collector)?;
                            Ok(collector)
                        })
                        .collect::<Result<Vec<_>>>()
                })?;
                let mut merged = TopDocsCollector::new(top_k);
                for collector in collectors {
                    merged.merge(collector);
                }
                merged
            }
            None => {
                let mut collector = TopDocsCollector::new(top_k);
                for index in 0..self.leaves.len() {
                    self.collect_leaf(weight.as_ref(), index, &mut collector)?;
                }
                collector
            }
        };

        log::debug!(
            "{} hits, {} counted without scoring",
            collector.total_hits(),
            collector.skipped()
        );
        Ok(collector.into_top_docs())
    }

    fn collect_leaf(
        &self,
        weight: &dyn Weight,
        index: usize,
        collector: &mut TopDocsCollector,
    ) -> Result<()> {
        let leaf = &self.leaves[index];
        let doc_base = leaf.doc_base();
        let Some(mut scorer) = weight.scorer(leaf)? else {
            return Ok(());
        };

        let max_score = scorer.max_score();
        while scorer.doc_id() != NO_MORE_DOCS {
            if collector.is_competitive(max_score) {
                collector.collect(doc_base + scorer.doc_id(), scorer.score()?);
            } else {
                collector.count_skipped();
            }
            scorer.next()?;
        }
        Ok(())
    }

    /// Count the matching documents without scoring them.
    pub fn count(&self, query: &dyn Query) -> Result<u64> {
        let weight = self.create_weight(query, ScoreMode::CompleteNoScores)?;
        let mut count = 0;
        for leaf in &self.leaves {
            if let Some(mut scorer) = weight.scorer(leaf)? {
                while scorer.doc_id() != NO_MORE_DOCS {
                    count += 1;
                    scorer.next()?;
                }
            }
        }
        Ok(count)
    }

    /// Explain how a global document id scores against a query.
    pub fn explain(&self, query: &dyn Query, doc: u64) -> Result<Explanation> {
        if doc >= self.max_doc {
            return Err(SynscoreError::invalid_argument(format!(
                "doc {doc} out of range, max doc is {}",
                self.max_doc
            )));
        }
        // Last segment whose base is <= doc, skipping empty ones.
        let index = self.doc_bases.partition_point(|&base| base <= doc) - 1;
        let weight = self.create_weight(query, ScoreMode::Complete)?;
        weight.explain(&self.leaves[index], doc - self.doc_bases[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityConfig;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::index::term::Term;
    use crate::query::synonym::SynonymQuery;
    use crate::query::term::TermQuery;
    use crate::search::similarity::TfIdfSimilarity;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_document(MemoryDocument::new().add_text("body", "the quick brown fox"));
        index.add_document(MemoryDocument::new().add_text("body", "a fast car"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "slow and steady"));
        index.add_document(MemoryDocument::new().add_text("body", "quick quick fast"));
        index.commit();
        index.add_document(MemoryDocument::new().add_text("body", "fast food"));
        index.commit();
        index
    }

    fn synonyms() -> SynonymQuery {
        SynonymQuery::new(vec![Term::new("body", "quick"), Term::new("body", "fast")]).unwrap()
    }

    #[test]
    fn test_doc_bases() {
        let searcher = IndexSearcher::new(index().leaves());
        assert_eq!(searcher.doc_bases(), &[0, 2, 4]);
        assert_eq!(searcher.max_doc(), 5);
    }

    #[test]
    fn test_collection_statistics() {
        let searcher = IndexSearcher::new(index().leaves());
        let stats = searcher.collection_statistics("body").unwrap().unwrap();
        assert_eq!(stats.max_doc, 5);
        assert_eq!(stats.doc_count, 5);
        assert_eq!(stats.sum_total_term_freq, 15);
        assert!(searcher.collection_statistics("title").unwrap().is_none());
    }

    #[test]
    fn test_search_ranks_across_segments() {
        let searcher = IndexSearcher::new(index().leaves());
        let top = searcher.search(&synonyms(), 10).unwrap();

        assert_eq!(top.total_hits, 4);
        assert_eq!(top.hits[0].doc, 3);
        let mut docs: Vec<u64> = top.hits.iter().map(|hit| hit.doc).collect();
        docs.sort();
        assert_eq!(docs, vec![0, 1, 3, 4]);
        assert_eq!(top.max_score, top.hits[0].score);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = IndexSearcher::new(index().leaves());
        let config = SearcherConfig {
            parallel: true,
            thread_pool_size: Some(2),
            ..Default::default()
        };
        let parallel = IndexSearcher::with_config(index().leaves(), config).unwrap();

        let expected = sequential.search(&synonyms(), 3).unwrap();
        let actual = parallel.search(&synonyms(), 3).unwrap();
        assert_eq!(actual.hits, expected.hits);
        assert_eq!(actual.total_hits, expected.total_hits);
    }

    #[test]
    fn test_count() {
        let searcher = IndexSearcher::new(index().leaves());
        assert_eq!(searcher.count(&synonyms()).unwrap(), 4);
        assert_eq!(
            searcher
                .count(&TermQuery::new(Term::new("body", "steady")))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_rewrite_to_fixpoint() {
        let searcher = IndexSearcher::new(index().leaves());
        let single = SynonymQuery::new(vec![Term::new("body", "quick")]).unwrap();
        let rewritten = searcher.rewrite(&single).unwrap();
        assert!(rewritten.as_any().is::<TermQuery>());

        let top = searcher.search(&single, 10).unwrap();
        let direct = searcher
            .search(&TermQuery::new(Term::new("body", "quick")), 10)
            .unwrap();
        assert_eq!(top, direct);
    }

    #[test]
    fn test_explain_uses_global_ids() {
        let searcher = IndexSearcher::new(index().leaves());
        let top = searcher.search(&synonyms(), 10).unwrap();

        for hit in &top.hits {
            let explanation = searcher.explain(&synonyms(), hit.doc).unwrap();
            assert!(explanation.is_match());
            assert_eq!(explanation.value(), hit.score);
        }
        assert!(!searcher.explain(&synonyms(), 2).unwrap().is_match());
        assert!(searcher.explain(&synonyms(), 5).is_err());
    }

    #[test]
    fn test_configured_similarity() {
        let config = SearcherConfig {
            similarity: SimilarityConfig::TfIdf,
            ..Default::default()
        };
        let searcher = IndexSearcher::with_config(index().leaves(), config).unwrap();
        assert_eq!(searcher.similarity().name(), "TfIdfSimilarity");

        let searcher = IndexSearcher::new(index().leaves()).with_similarity(Arc::new(TfIdfSimilarity::new()));
        let explanation = searcher.explain(&synonyms(), 3).unwrap();
        assert!(explanation.description().contains("[TfIdfSimilarity]"));
    }

    #[test]
    fn test_top_k_zero_still_counts() {
        let searcher = IndexSearcher::new(index().leaves());
        let top = searcher.search(&synonyms(), 0).unwrap();
        assert_eq!(top.total_hits, 4);
        assert!(top.hits.is_empty());
    }

    #[test]
    fn test_leaves_from_separate_indexes() {
        let mut first = MemoryIndex::new();
        first.add_document(MemoryDocument::new().add_text("body", "aardvark quick"));
        first.commit();
        let mut second = MemoryIndex::new();
        second.add_document(MemoryDocument::new().add_text("body", "zzz yyy xxx fast"));
        second.add_document(MemoryDocument::new().add_text("body", "quick quick"));
        second.commit();

        let mut leaves = first.leaves();
        leaves.extend(second.leaves());
        let searcher = IndexSearcher::new(leaves);
        let ords: Vec<usize> = searcher.leaves().iter().map(LeafContext::ord).collect();
        assert_eq!(ords, vec![0, 1]);
        assert_eq!(searcher.leaves()[1].doc_base(), 1);

        // the same documents sealed as two segments of one index
        let mut combined = MemoryIndex::new();
        combined.add_document(MemoryDocument::new().add_text("body", "aardvark quick"));
        combined.commit();
        combined.add_document(MemoryDocument::new().add_text("body", "zzz yyy xxx fast"));
        combined.add_document(MemoryDocument::new().add_text("body", "quick quick"));
        combined.commit();
        let expected = IndexSearcher::new(combined.leaves());

        assert_eq!(
            searcher.search(&synonyms(), 10).unwrap(),
            expected.search(&synonyms(), 10).unwrap()
        );
        let explanation = searcher.explain(&synonyms(), 0).unwrap();
        assert!(explanation.to_string().contains("termFreq=1"));
        assert!(!explanation.to_string().contains("termFreq=2"));
        let top = searcher.search(&synonyms(), 10).unwrap();
        assert_eq!(top.hits[0].doc, 2);
    }
}
