//! Command implementations for the pilum CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::IndexConfig;
use crate::error::{PilumError, Result};
use crate::index::manifest::IndexManifest;
use crate::ingest::index_collection;
use crate::search::engine::QueryEngine;
use crate::storage::file::FileStorageConfig;
use crate::storage::{Storage, StorageConfig, StorageFactory};
use crate::summary::{QueryBiasedSummarizer, Summarizer};

/// Execute a CLI command.
pub fn execute_command(args: PilumArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => build_index(index_args.clone(), &args),
        Command::Search(search_args) => search_index(search_args.clone(), &args),
        Command::Batch(batch_args) => run_batch(batch_args.clone(), &args),
        Command::Validate(validate_args) => validate_index(validate_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
    }
}

/// Index a collection.
fn build_index(args: IndexArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.index_path.join(&config.manifest_file).exists() && !args.force {
        return Err(PilumError::invalid_argument(format!(
            "an index already exists at {}. Use --force to overwrite.",
            args.index_path.display()
        )));
    }

    let start = Instant::now();
    let storage = open_storage(&args.index_path, &config, true)?;
    let analyzer = build_analyzer(args.stoplist.as_deref())?;
    let built = index_collection(&args.collection, storage, &config, analyzer)?;

    output_result(
        "Index built successfully",
        &IndexBuildResult {
            path: args.index_path.to_string_lossy().to_string(),
            documents: built.manifest.document_count,
            terms: built.manifest.term_count,
            postings: built.manifest.posting_count,
            postings_bytes: built.postings.size,
            lexicon_bytes: built.lexicon.size,
            catalog_bytes: built.catalog.size,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Run one query.
fn search_index(args: SearchArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = open_engine(&args.index_path, &config, args.stoplist.as_deref())?;

    let summarizer = match &args.summarize {
        Some(collection) => {
            info!("Loading {} for summaries", collection.display());
            Some(QueryBiasedSummarizer::open(
                collection,
                Arc::clone(engine.analyzer()),
                args.sentences,
            )?)
        }
        None => None,
    };

    let rows = run_query(
        &engine,
        &args.label,
        &args.query,
        args.limit,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
    )?;
    output_rows(&rows, cli_args)
}

/// Run every query of a query file, in parallel, printing results in file
/// order.
fn run_batch(args: BatchArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = open_engine(&args.index_path, &config, args.stoplist.as_deref())?;

    let content = fs::read_to_string(&args.query_file)?;
    let queries: Vec<(String, String)> = content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let parsed = parse_query_line(line);
            if parsed.is_none() && !is_blank_or_comment(line) {
                warn!("line {}: expected `label query`, skipping", i + 1);
            }
            parsed
        })
        .collect();
    info!("Running {} queries", queries.len());

    let results: Vec<Result<Vec<ResultRow>>> = queries
        .par_iter()
        .map(|(label, query)| run_query(&engine, label, query, args.limit, None))
        .collect();

    let mut rows = Vec::new();
    for ((label, _), result) in queries.iter().zip(results) {
        match result {
            Ok(query_rows) => rows.extend(query_rows),
            Err(e) if e.is_query_scoped() => warn!("query {label} failed: {e}"),
            Err(e) => return Err(e),
        }
    }

    output_rows(&rows, cli_args)
}

/// Validate index integrity.
fn validate_index(args: ValidateArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let storage = open_storage(&args.index_path, &config, false)?;
    let manifest = IndexManifest::load(storage.as_ref(), &config.manifest_file)?;
    let report = manifest.validate(storage.as_ref())?;
    let problem_count = report.problems.len();

    output_result(
        "Index validation completed",
        &ValidationResult {
            path: args.index_path.to_string_lossy().to_string(),
            files_checked: report.files_checked,
            terms_checked: report.terms_checked,
            problems: report.problems,
        },
        cli_args,
    )?;

    if problem_count > 0 {
        return Err(PilumError::corrupt_index(format!(
            "validation found {problem_count} problem(s)"
        )));
    }
    Ok(())
}

/// Show index statistics.
fn show_stats(args: StatsArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let storage = open_storage(&args.index_path, &config, false)?;
    let manifest = IndexManifest::load(storage.as_ref(), &config.manifest_file)?;

    output_result(
        "Index statistics",
        &IndexStats::from_manifest(args.index_path.to_string_lossy().to_string(), &manifest),
        cli_args,
    )
}

/// Score one query and resolve its rows, summarizing each when asked to.
pub fn run_query(
    engine: &QueryEngine,
    label: &str,
    query: &str,
    limit: usize,
    summarizer: Option<&dyn Summarizer>,
) -> Result<Vec<ResultRow>> {
    let terms = engine.analyzer().terms(query)?;
    let result = engine.score(&terms, limit)?;

    result
        .iter()
        .map(|hit| -> Result<ResultRow> {
            let entry = engine.resolve(hit.doc_id)?;
            let summary = summarizer
                .map(|s| s.summarize(&terms, &entry.doc_no))
                .transpose()?;
            Ok(ResultRow {
                label: label.to_string(),
                doc_no: entry.doc_no.clone(),
                rank: hit.rank,
                score: hit.score,
                summary,
            })
        })
        .collect()
}

/// Split a query file line into `(label, query)`.
///
/// Blank lines, `#` comments and lines without query text yield `None`.
pub fn parse_query_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if is_blank_or_comment(line) {
        return None;
    }
    let (label, query) = line.split_once(char::is_whitespace)?;
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some((label.to_string(), query.to_string()))
}

fn is_blank_or_comment(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

fn load_config(path: Option<&Path>) -> Result<IndexConfig> {
    match path {
        Some(path) => IndexConfig::from_file(path),
        None => Ok(IndexConfig::default()),
    }
}

/// Stop words are removed only when a stoplist is given.
fn build_analyzer(stoplist: Option<&Path>) -> Result<Arc<dyn Analyzer>> {
    let analyzer = match stoplist {
        Some(path) => StandardAnalyzer::with_stoplist(path)?,
        None => StandardAnalyzer::without_stop_words()?,
    };
    Ok(Arc::new(analyzer))
}

fn open_storage(path: &Path, config: &IndexConfig, create: bool) -> Result<Arc<dyn Storage>> {
    if !create && !path.is_dir() {
        return Err(PilumError::storage(format!(
            "Index directory does not exist: {}",
            path.display()
        )));
    }
    let mut storage_config = FileStorageConfig::new(path);
    storage_config.buffer_size = config.buffer_size;
    StorageFactory::create(StorageConfig::File(storage_config))
}

fn open_engine(path: &Path, config: &IndexConfig, stoplist: Option<&Path>) -> Result<QueryEngine> {
    let storage = open_storage(path, config, false)?;
    let engine = QueryEngine::open(storage, config)?;
    Ok(engine.with_analyzer(build_analyzer(stoplist)?))
}
