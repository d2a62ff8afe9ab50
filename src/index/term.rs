//! Terms: the (field, token) pairs that postings are keyed by.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A searchable unit: a field name and the token bytes indexed in it.
///
/// Terms are totally ordered by field name first and then by the raw token
/// bytes, compared lexicographically. Within a single field this reduces to
/// byte order of the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    field: String,
    bytes: Vec<u8>,
}

impl Term {
    /// Create a term from a field name and a UTF-8 token.
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Term {
            field: field.into(),
            bytes: text.into().into_bytes(),
        }
    }

    /// Create a term from a field name and arbitrary token bytes.
    pub fn from_bytes<F: Into<String>>(field: F, bytes: Vec<u8>) -> Self {
        Term {
            field: field.into(),
            bytes,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the raw token bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the token as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.field
            .cmp(&other.field)
            .then_with(|| self.bytes.cmp(&other.bytes))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, String::from_utf8_lossy(&self.bytes))
    }
}
