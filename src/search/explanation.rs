//! Score explanations.
//!
//! An [`Explanation`] is a tree: every node carries a value, a human readable
//! description and the sub-explanations the value was derived from.
//!
//! # Example
//!
//! ```
//! use synscore::search::explanation::Explanation;
//!
//! let freq = Explanation::matched(3.0, "termFreq=3", vec![]);
//! let score = Explanation::matched(1.5, "score(freq=3)", vec![freq]);
//!
//! assert!(score.is_match());
//! assert_eq!(score.details()[0].value(), 3.0);
//! assert_eq!(score.to_string(), "1.5 = score(freq=3)\n  3 = termFreq=3\n");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a document's score was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    is_match: bool,
    value: f32,
    description: String,
    details: Vec<Explanation>,
}

impl Explanation {
    /// Create an explanation for a matching document.
    pub fn matched<S: Into<String>>(value: f32, description: S, details: Vec<Explanation>) -> Self {
        Explanation {
            is_match: true,
            value,
            description: description.into(),
            details,
        }
    }

    /// Create an explanation for a document that does not match.
    pub fn no_match<S: Into<String>>(description: S, details: Vec<Explanation>) -> Self {
        Explanation {
            is_match: false,
            value: 0.0,
            description: description.into(),
            details,
        }
    }

    /// Whether the document matched.
    pub fn is_match(&self) -> bool {
        self.is_match
    }

    /// The explained value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// What the value represents.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The sub-explanations.
    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} = {}",
            "",
            self.value,
            self.description,
            indent = depth * 2
        )?;
        for detail in &self.details {
            detail.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
