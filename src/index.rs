//! Index-side types: terms, segment readers and in-memory storage.

pub mod memory;
pub mod reader;
pub mod term;

pub use self::memory::{MemoryDocument, MemoryIndex, MemorySegment};
pub use self::reader::{
    FieldInfo, FieldStats, IndexOptions, LeafContext, LeafReader, NO_MORE_DOCS, PostingIterator,
    SegmentTermState,
};
pub use self::term::Term;
