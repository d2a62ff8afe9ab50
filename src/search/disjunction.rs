//! K-way merge of document iterators.
//!
//! [`DisjunctionIterator`] walks the union of its sub-iterators in document
//! order. Sub-iterators that sit on the current document form the *matching
//! set*; all others wait in a min-heap keyed by their current document.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::binary_heap::PeekMut;
use std::fmt::Debug;

use crate::error::Result;
use crate::index::reader::NO_MORE_DOCS;
use crate::search::scorer::DocIterator;

/// A sub-iterator together with its cached current document.
#[derive(Debug)]
struct Entry<S> {
    doc: u64,
    iterator: S,
}

impl<S> PartialEq for Entry<S> {
    fn eq(&self, other: &Self) -> bool {
        self.doc == other.doc
    }
}

impl<S> Eq for Entry<S> {}

impl<S> PartialOrd for Entry<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Entry<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower doc IDs come first
        other.doc.cmp(&self.doc)
    }
}

/// Union of several document iterators.
#[derive(Debug)]
pub struct DisjunctionIterator<S> {
    /// Sub-iterators positioned after the current document.
    heap: BinaryHeap<Entry<S>>,
    /// Sub-iterators positioned on the current document.
    matching: Vec<Entry<S>>,
    /// Current document ID.
    doc: u64,
    /// Total cost estimate.
    cost: u64,
}

impl<S: DocIterator> DisjunctionIterator<S> {
    /// Merge positioned sub-iterators. Exhausted ones are dropped.
    pub fn new(iterators: Vec<S>) -> Self {
        let mut heap = BinaryHeap::with_capacity(iterators.len());
        let mut cost = 0;

        for iterator in iterators {
            cost += iterator.cost();
            let doc = iterator.doc_id();
            if doc != NO_MORE_DOCS {
                heap.push(Entry { doc, iterator });
            }
        }

        let mut disjunction = DisjunctionIterator {
            heap,
            matching: Vec::new(),
            doc: NO_MORE_DOCS,
            cost,
        };
        disjunction.pull_matching();
        disjunction
    }

    /// Move every sub-iterator sitting on the smallest document into the
    /// matching set.
    fn pull_matching(&mut self) {
        debug_assert!(self.matching.is_empty());
        self.doc = match self.heap.peek() {
            Some(entry) => entry.doc,
            None => NO_MORE_DOCS,
        };
        while let Some(entry) = self.heap.peek_mut() {
            if entry.doc != self.doc {
                break;
            }
            self.matching.push(PeekMut::pop(entry));
        }
    }

    fn push(&mut self, mut entry: Entry<S>) {
        entry.doc = entry.iterator.doc_id();
        if entry.doc != NO_MORE_DOCS {
            self.heap.push(entry);
        }
    }

    /// Sub-iterators positioned on the current document.
    pub fn matching(&self) -> impl Iterator<Item = &S> {
        self.matching.iter().map(|entry| &entry.iterator)
    }

    /// Number of sub-iterators positioned on the current document.
    pub fn matching_count(&self) -> usize {
        self.matching.len()
    }

    /// Number of sub-iterators not yet exhausted.
    pub fn active_count(&self) -> usize {
        self.matching.len() + self.heap.len()
    }
}

impl<S: DocIterator> DocIterator for DisjunctionIterator<S> {
    fn doc_id(&self) -> u64 {
        self.doc
    }

    fn next(&mut self) -> Result<u64> {
        if self.doc == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        }

        for mut entry in std::mem::take(&mut self.matching) {
            entry.iterator.next()?;
            self.push(entry);
        }
        self.pull_matching();
        Ok(self.doc)
    }

    fn skip_to(&mut self, target: u64) -> Result<u64> {
        if self.doc >= target {
            return Ok(self.doc);
        }

        for mut entry in std::mem::take(&mut self.matching) {
            entry.iterator.skip_to(target)?;
            self.push(entry);
        }
        while self.heap.peek().is_some_and(|entry| entry.doc < target) {
            if let Some(mut entry) = self.heap.pop() {
                entry.iterator.skip_to(target)?;
                self.push(entry);
            }
        }
        self.pull_matching();
        Ok(self.doc)
    }

    fn cost(&self) -> u64 {
        self.cost
    }
}
