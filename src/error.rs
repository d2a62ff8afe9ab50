//! Error types for the synscore library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SynscoreError`] enum.
//!
//! # Examples
//!
//! ```
//! use synscore::error::{Result, SynscoreError};
//!
//! fn build() -> Result<()> {
//!     Err(SynscoreError::invalid_argument("Synonyms must be across the same field"))
//! }
//!
//! assert!(build().is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for synscore operations.
#[derive(Error, Debug)]
pub enum SynscoreError {
    /// I/O errors (reading documents, config files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A query was constructed from inconsistent input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A query holds more clauses than the configured ceiling allows.
    #[error("Too many clauses: {count} exceeds maximum clause count of {max}")]
    TooManyClauses {
        /// Number of clauses the query tried to hold.
        count: usize,
        /// The configured ceiling.
        max: usize,
    },

    /// The storage layer failed while resolving terms or reading postings.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SynscoreError.
pub type Result<T> = std::result::Result<T, SynscoreError>;

impl SynscoreError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SynscoreError::InvalidArgument(msg.into())
    }

    /// Create a new too-many-clauses error.
    pub fn too_many_clauses(count: usize, max: usize) -> Self {
        SynscoreError::TooManyClauses { count, max }
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SynscoreError::Storage(msg.into())
    }

    /// Create a new config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SynscoreError::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        SynscoreError::Other(format!("Internal error: {}", msg.into()))
    }
}
