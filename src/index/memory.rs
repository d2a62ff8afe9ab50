//! In-memory segments implementing the reader traits.
//!
//! [`MemoryIndex`] buffers documents and seals them into immutable
//! [`MemorySegment`]s on [`commit`](MemoryIndex::commit). It is the storage
//! used by the CLI, the benchmarks and the test-suite.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Result, SynscoreError};
use crate::index::reader::{
    FieldInfo, FieldStats, IndexOptions, LeafReader, NO_MORE_DOCS, PostingIterator,
    SegmentTermState,
};
use crate::index::term::Term;

/// Split text on Unicode word boundaries and lowercase every word.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|word| word.to_lowercase()).collect()
}

/// A document waiting to be indexed: analyzed tokens per field.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    fields: Vec<(String, Vec<String>)>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text value, tokenized with [`tokenize`].
    pub fn add_text<F: Into<String>>(self, field: F, text: &str) -> Self {
        self.add_tokens(field, tokenize(text))
    }

    /// Add pre-analyzed tokens.
    pub fn add_tokens<F, I, T>(mut self, field: F, tokens: I) -> Self
    where
        F: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.fields
            .push((field.into(), tokens.into_iter().map(Into::into).collect()));
        self
    }
}

/// A single posting entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// Document id within the segment.
    pub doc_id: u64,
    /// Occurrences of the term in the document.
    pub frequency: u32,
}

#[derive(Debug)]
struct MemoryField {
    info: FieldInfo,
    stats: FieldStats,
    dictionary: BTreeMap<Vec<u8>, usize>,
    postings: Vec<Arc<Vec<Posting>>>,
    term_stats: Vec<(u64, u64)>,
    norms: Vec<u64>,
}

/// An immutable in-memory segment.
#[derive(Debug)]
pub struct MemorySegment {
    ord: usize,
    max_doc: u64,
    fields: AHashMap<String, MemoryField>,
}

impl MemorySegment {
    /// Position of the segment in the index that sealed it.
    pub fn ord(&self) -> usize {
        self.ord
    }

    fn build(
        ord: usize,
        docs: &[MemoryDocument],
        field_options: &AHashMap<String, IndexOptions>,
    ) -> Self {
        let max_doc = docs.len() as u64;

        // field -> token -> doc -> freq, with per-doc field lengths
        let mut inverted: AHashMap<String, BTreeMap<Vec<u8>, BTreeMap<u64, u32>>> =
            AHashMap::new();
        let mut lengths: AHashMap<String, Vec<u64>> = AHashMap::new();

        for (doc_id, doc) in docs.iter().enumerate() {
            let doc_id = doc_id as u64;
            for (field, tokens) in &doc.fields {
                let terms = inverted.entry(field.clone()).or_default();
                for token in tokens {
                    *terms
                        .entry(token.as_bytes().to_vec())
                        .or_default()
                        .entry(doc_id)
                        .or_insert(0) += 1;
                }
                let norms = lengths
                    .entry(field.clone())
                    .or_insert_with(|| vec![0; max_doc as usize]);
                norms[doc_id as usize] += tokens.len() as u64;
            }
        }

        let mut fields = AHashMap::new();
        for (name, terms) in inverted {
            let index_options = field_options
                .get(&name)
                .copied()
                .unwrap_or(IndexOptions::DocsAndFreqs);
            let has_freqs = index_options.has_freqs();

            let mut dictionary = BTreeMap::new();
            let mut postings = Vec::with_capacity(terms.len());
            let mut term_stats = Vec::with_capacity(terms.len());
            let mut stats = FieldStats::default();

            for (ord, (bytes, freqs)) in terms.into_iter().enumerate() {
                let list: Vec<Posting> = freqs
                    .into_iter()
                    .map(|(doc_id, freq)| Posting {
                        doc_id,
                        frequency: if has_freqs { freq } else { 1 },
                    })
                    .collect();
                let doc_freq = list.len() as u64;
                let total_term_freq = list.iter().map(|p| p.frequency as u64).sum();

                stats.sum_doc_freq += doc_freq;
                stats.sum_total_term_freq += total_term_freq;
                dictionary.insert(bytes, ord);
                term_stats.push((doc_freq, total_term_freq));
                postings.push(Arc::new(list));
            }

            let norms = lengths.remove(&name).unwrap_or_default();
            stats.doc_count = norms.iter().filter(|&&len| len > 0).count() as u64;

            fields.insert(
                name.clone(),
                MemoryField {
                    info: FieldInfo {
                        name,
                        index_options,
                        has_norms: true,
                    },
                    stats,
                    dictionary,
                    postings,
                    term_stats,
                    norms,
                },
            );
        }

        MemorySegment {
            ord,
            max_doc,
            fields,
        }
    }
}

impl LeafReader for MemorySegment {
    fn max_doc(&self) -> u64 {
        self.max_doc
    }

    fn field_info(&self, field: &str) -> Option<FieldInfo> {
        self.fields.get(field).map(|f| f.info.clone())
    }

    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>> {
        Ok(self.fields.get(field).map(|f| f.stats))
    }

    fn term_state(&self, term: &Term) -> Result<Option<SegmentTermState>> {
        let Some(field) = self.fields.get(term.field()) else {
            return Ok(None);
        };
        Ok(field.dictionary.get(term.bytes()).map(|&ord| {
            let (doc_freq, total_term_freq) = field.term_stats[ord];
            SegmentTermState {
                ord: ord as u64,
                doc_freq,
                total_term_freq,
            }
        }))
    }

    fn postings(&self, term: &Term, state: &SegmentTermState) -> Result<Box<dyn PostingIterator>> {
        let postings = self
            .fields
            .get(term.field())
            .and_then(|field| field.postings.get(state.ord as usize))
            .ok_or_else(|| {
                SynscoreError::storage(format!(
                    "term state {} is not valid for {} in segment {}",
                    state.ord, term, self.ord
                ))
            })?;
        Ok(Box::new(MemoryPostingIterator::new(Arc::clone(postings))))
    }

    fn norm(&self, field: &str, doc_id: u64) -> Result<Option<u64>> {
        Ok(self
            .fields
            .get(field)
            .filter(|f| f.info.has_norms)
            .and_then(|f| f.norms.get(doc_id as usize).copied()))
    }
}

/// Postings iterator over a shared, sorted posting list.
#[derive(Debug)]
pub struct MemoryPostingIterator {
    postings: Arc<Vec<Posting>>,
    position: usize,
    started: bool,
}

impl MemoryPostingIterator {
    /// Create an unpositioned iterator.
    pub fn new(postings: Arc<Vec<Posting>>) -> Self {
        MemoryPostingIterator {
            postings,
            position: 0,
            started: false,
        }
    }
}

impl PostingIterator for MemoryPostingIterator {
    fn doc_id(&self) -> u64 {
        if !self.started {
            return 0;
        }
        self.postings
            .get(self.position)
            .map(|p| p.doc_id)
            .unwrap_or(NO_MORE_DOCS)
    }

    fn term_freq(&self) -> u32 {
        if !self.started {
            return 0;
        }
        self.postings
            .get(self.position)
            .map(|p| p.frequency)
            .unwrap_or(0)
    }

    fn next(&mut self) -> Result<bool> {
        if !self.started {
            self.started = true;
        } else if self.position < self.postings.len() {
            self.position += 1;
        }
        Ok(self.position < self.postings.len())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        self.started = true;
        let remaining = &self.postings[self.position.min(self.postings.len())..];
        self.position += remaining.partition_point(|p| p.doc_id < target);
        Ok(self.position < self.postings.len())
    }

    fn cost(&self) -> u64 {
        self.postings.len() as u64
    }
}

/// Buffers documents and seals them into segments.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    field_options: AHashMap<String, IndexOptions>,
    pending: Vec<MemoryDocument>,
    segments: Vec<Arc<MemorySegment>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare what a field's postings record. Fields default to
    /// [`IndexOptions::DocsAndFreqs`].
    pub fn with_field_options<F: Into<String>>(mut self, field: F, options: IndexOptions) -> Self {
        self.field_options.insert(field.into(), options);
        self
    }

    /// Buffer a document for the next segment.
    pub fn add_document(&mut self, doc: MemoryDocument) {
        self.pending.push(doc);
    }

    /// Seal buffered documents into a new segment and return its ordinal.
    pub fn commit(&mut self) -> Option<usize> {
        if self.pending.is_empty() {
            return None;
        }
        let ord = self.segments.len();
        let segment = MemorySegment::build(ord, &self.pending, &self.field_options);
        log::debug!(
            "sealed segment {} with {} documents",
            ord,
            segment.max_doc()
        );
        self.pending.clear();
        self.segments.push(Arc::new(segment));
        Some(ord)
    }

    /// Number of sealed segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Sealed segments as reader trait objects.
    pub fn leaves(&self) -> Vec<Arc<dyn LeafReader>> {
        self.segments
            .iter()
            .map(|segment| Arc::clone(segment) as Arc<dyn LeafReader>)
            .collect()
    }
}
