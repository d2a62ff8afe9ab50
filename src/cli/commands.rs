//! Command implementations for the synscore CLI.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SearcherConfig;
use crate::error::{Result, SynscoreError};
use crate::index::memory::{MemoryDocument, MemoryIndex, tokenize};
use crate::index::term::Term;
use crate::query::synonym::SynonymQuery;
use crate::search::searcher::IndexSearcher;
use crate::search::stats::pseudo_statistics;
use crate::search::term_states::TermStates;

/// Execute a CLI command.
pub fn execute_command(args: SynscoreArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SearcherConfig::from_json_file(path)?,
        None => SearcherConfig::default(),
    };

    match &args.command {
        Command::Search(search_args) => {
            let output = run_search(search_args, config)?;
            output_result(&output, &args)
        }
        Command::Stats(stats_args) => {
            let output = run_stats(stats_args, config)?;
            output_result(&output, &args)
        }
    }
}

/// Documents loaded from a JSONL file and indexed in memory.
#[derive(Debug)]
pub struct Corpus {
    pub index: MemoryIndex,
    /// Per global doc id: the document's `id` and its text.
    pub documents: Vec<(String, String)>,
}

/// Load a JSONL file, indexing `field` of every object.
///
/// Blank lines are skipped. Objects without the field are indexed as empty
/// documents so that doc ids stay aligned with line order.
pub fn load_corpus(path: &Path, field: &str, segment_size: Option<usize>) -> Result<Corpus> {
    if segment_size == Some(0) {
        return Err(SynscoreError::invalid_argument("segment size must be at least 1"));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut index = MemoryIndex::new();
    let mut documents = Vec::new();
    let mut pending = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line).map_err(|e| {
            SynscoreError::invalid_argument(format!("line {}: {e}", line_num + 1))
        })?;
        let text = value.get(field).and_then(Value::as_str).unwrap_or_default().to_string();
        let id = match value.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(id) => id.to_string(),
            None => (line_num + 1).to_string(),
        };

        index.add_document(MemoryDocument::new().add_text(field, &text));
        documents.push((id, text));
        pending += 1;

        if segment_size.is_some_and(|size| pending >= size) {
            index.commit();
            pending = 0;
        }
    }
    index.commit();

    log::info!(
        "loaded {} documents into {} segments from {}",
        documents.len(),
        index.segment_count(),
        path.display()
    );
    Ok(Corpus { index, documents })
}

/// Analyze the synonyms the same way documents are analyzed.
pub fn build_query(field: &str, synonyms: &[String]) -> Result<SynonymQuery> {
    let terms = synonyms
        .iter()
        .flat_map(|synonym| tokenize(synonym))
        .map(|token| Term::new(field, token));
    SynonymQuery::new(terms)
}

/// Run a search and collect its output.
pub fn run_search(args: &SearchArgs, config: SearcherConfig) -> Result<SearchOutput> {
    let corpus = load_corpus(&args.corpus.documents, &args.corpus.field, args.corpus.segment_size)?;
    let searcher = IndexSearcher::with_config(corpus.index.leaves(), config)?;
    let query = build_query(&args.corpus.field, &args.corpus.terms)?.with_boost(args.boost);

    let start_time = Instant::now();
    let top_docs = searcher.search(&query, args.top_k)?;
    let duration = start_time.elapsed();

    let mut hits = Vec::with_capacity(top_docs.hits.len());
    for hit in &top_docs.hits {
        let explanation = if args.explain {
            Some(searcher.explain(&query, hit.doc)?)
        } else {
            None
        };
        let (id, text) = corpus
            .documents
            .get(hit.doc as usize)
            .cloned()
            .ok_or_else(|| SynscoreError::internal(format!("hit {} has no document", hit.doc)))?;
        hits.push(HitOutput {
            doc: hit.doc,
            id,
            score: hit.score,
            text,
            explanation,
        });
    }

    Ok(SearchOutput {
        query: query.to_string(),
        similarity: searcher.similarity().name().to_string(),
        segments: searcher.leaves().len(),
        total_hits: top_docs.total_hits,
        duration_ms: duration.as_millis() as u64,
        hits,
    })
}

/// Compute per-term and merged statistics of the synonym group.
pub fn run_stats(args: &StatsArgs, config: SearcherConfig) -> Result<StatsOutput> {
    let corpus = load_corpus(&args.corpus.documents, &args.corpus.field, args.corpus.segment_size)?;
    let searcher = IndexSearcher::with_config(corpus.index.leaves(), config)?;
    let query = build_query(&args.corpus.field, &args.corpus.terms)?;

    let mut terms = Vec::with_capacity(query.terms().len());
    for term in query.terms() {
        let states = TermStates::build(searcher.leaves(), term)?;
        terms.push(TermStatsOutput {
            term: term.to_string(),
            statistics: searcher.term_statistics(&states),
        });
    }
    let pseudo = pseudo_statistics(terms.iter().map(|term| term.statistics));

    Ok(StatsOutput {
        query: query.to_string(),
        documents: searcher.max_doc(),
        segments: searcher.leaves().len(),
        collection: searcher.collection_statistics(&args.corpus.field)?,
        terms,
        pseudo,
        matching_documents: searcher.count(&query)?,
    })
}
