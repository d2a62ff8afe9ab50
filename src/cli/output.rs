//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SynscoreArgs};
use crate::error::Result;
use crate::search::explanation::Explanation;
use crate::search::stats::{CollectionStatistics, TermStatistics};

/// One ranked document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitOutput {
    /// Global document id.
    pub doc: u64,
    /// The document's `id` value, or its line number.
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// Result structure for search operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    pub query: String,
    pub similarity: String,
    pub segments: usize,
    pub total_hits: u64,
    pub duration_ms: u64,
    pub hits: Vec<HitOutput>,
}

/// Statistics of one term of the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermStatsOutput {
    pub term: String,
    /// `None` if the term occurs nowhere.
    pub statistics: Option<TermStatistics>,
}

/// Result structure for the stats command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub query: String,
    pub documents: u64,
    pub segments: usize,
    pub collection: Option<CollectionStatistics>,
    pub terms: Vec<TermStatsOutput>,
    /// Merged statistics of the group, `None` if unscoreable.
    pub pseudo: Option<TermStatistics>,
    pub matching_documents: u64,
}

impl fmt::Display for SearchOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Query: {} [{}]", self.query, self.similarity)?;
        writeln!(
            f,
            "Found {} matching documents in {} segments ({}ms)",
            self.total_hits, self.segments, self.duration_ms
        )?;
        for (rank, hit) in self.hits.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "{}. {} (doc {}, score {:.4})", rank + 1, hit.id, hit.doc, hit.score)?;
            writeln!(f, "   {}", truncate(&hit.text, 120))?;
            if let Some(explanation) = &hit.explanation {
                for line in explanation.to_string().lines() {
                    writeln!(f, "   {line}")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for StatsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Query: {}", self.query)?;
        writeln!(f, "Documents: {} in {} segments", self.documents, self.segments)?;
        match &self.collection {
            Some(collection) => writeln!(
                f,
                "Field {}: docCount={} sumTotalTermFreq={} avgFieldLength={:.2}",
                collection.field,
                collection.doc_count,
                collection.sum_total_term_freq,
                collection.avg_field_length()
            )?,
            None => writeln!(f, "Field has no indexed values")?,
        }
        writeln!(f)?;
        for term in &self.terms {
            writeln!(f, "  {:<24} {}", term.term, format_stats(term.statistics.as_ref()))?;
        }
        writeln!(f, "  {:<24} {}", "(synonym)", format_stats(self.pseudo.as_ref()))?;
        writeln!(f)?;
        writeln!(f, "Matching documents: {}", self.matching_documents)
    }
}

fn format_stats(stats: Option<&TermStatistics>) -> String {
    match stats {
        Some(stats) => format!("docFreq={} totalTermFreq={}", stats.doc_freq, stats.total_term_freq),
        None => "absent".to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + fmt::Display>(result: &T, args: &SynscoreArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{result}");
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &SynscoreArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
