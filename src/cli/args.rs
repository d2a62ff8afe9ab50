//! Command line argument parsing for the synscore CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// synscore - score synonym groups over a JSONL corpus
#[derive(Parser, Debug, Clone)]
#[command(name = "synscore")]
#[command(about = "Score synonym queries over a document collection")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SynscoreArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Searcher configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "SYNSCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SynscoreArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rank documents against a synonym group
    Search(SearchArgs),

    /// Show per-term and merged statistics of a synonym group
    Stats(StatsArgs),
}

/// The corpus and synonym group shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Documents, one JSON object per line
    #[arg(value_name = "DOCUMENTS")]
    pub documents: PathBuf,

    /// Field holding the text to index and search
    #[arg(long, default_value = "body")]
    pub field: String,

    /// Comma-separated synonyms
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub terms: Vec<String>,

    /// Documents per segment (default: a single segment)
    #[arg(long, value_name = "N")]
    pub segment_size: Option<usize>,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Maximum number of results to return
    #[arg(short = 'k', long, default_value = "10")]
    pub top_k: usize,

    /// Boost applied to the synonym query
    #[arg(long, default_value = "1.0")]
    pub boost: f32,

    /// Print a score explanation for every hit
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
