//! Command line argument parsing for the pilum CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Pilum - build and query accumulator-ranked inverted indexes
#[derive(Parser, Debug, Clone)]
#[command(name = "pilum")]
#[command(about = "Build and query inverted indexes over TREC collections")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PilumArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PilumArgs {
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
    /// Index a TREC collection
    Index(IndexArgs),

    /// Run a single query
    Search(SearchArgs),

    /// Run every query of a query file
    Batch(BatchArgs),

    /// Check index files against the manifest
    Validate(ValidateArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for indexing a collection
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// TREC collection file
    #[arg(value_name = "COLLECTION")]
    pub collection: PathBuf,

    /// Directory receiving the index files
    #[arg(value_name = "INDEX_DIR")]
    pub index_path: PathBuf,

    /// Stop word list, one word per line
    #[arg(short, long, value_name = "STOPLIST")]
    pub stoplist: Option<PathBuf>,

    /// Index configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing index
    #[arg(long)]
    pub force: bool,
}

/// Arguments for a single query
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_path: PathBuf,

    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Label printed in front of each result row
    #[arg(short, long, default_value = "1")]
    pub label: String,

    /// Stop word list used when the index was built
    #[arg(short, long, value_name = "STOPLIST")]
    pub stoplist: Option<PathBuf>,

    /// Index configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Summarize each result from this collection file
    #[arg(long, value_name = "COLLECTION")]
    pub summarize: Option<PathBuf>,

    /// Sentences per summary
    #[arg(long, default_value = "3")]
    pub sentences: usize,
}

/// Arguments for running a query file
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_path: PathBuf,

    /// Query file: one `label query text` per line
    #[arg(value_name = "QUERY_FILE")]
    pub query_file: PathBuf,

    /// Maximum number of results per query
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Stop word list used when the index was built
    #[arg(short, long, value_name = "STOPLIST")]
    pub stoplist: Option<PathBuf>,

    /// Index configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for validating an index
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_path: PathBuf,

    /// Index configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_path: PathBuf,

    /// Index configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
