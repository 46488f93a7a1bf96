//! # Pilum
//!
//! An accumulator-ranked inverted index with a random-access on-disk layout.
//!
//! ## Features
//!
//! - Fixed-width posting records addressed by byte offsets from the lexicon
//! - Query-time scoring with pluggable similarity functions (BM25 by default)
//! - Deterministic top-k selection
//! - TREC collection ingestion and query-biased summaries
//! - Pluggable storage backends (directory or in-memory)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pilum::config::IndexConfig;
//! use pilum::index::{DocumentCatalog, IndexBuilder, InvertedLexicon, Posting};
//! use pilum::search::QueryEngine;
//! use pilum::storage::Storage;
//! use pilum::storage::memory::MemoryStorage;
//!
//! # fn main() -> pilum::error::Result<()> {
//! let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
//!
//! let mut catalog = DocumentCatalog::new();
//! catalog.insert(0, "DOC0", 1.2)?;
//! catalog.insert(1, "DOC1", 1.2)?;
//!
//! let mut lexicon = InvertedLexicon::new();
//! lexicon.add_posting("cat", Posting::new(0, 3));
//! lexicon.add_posting("cat", Posting::new(1, 1));
//!
//! IndexBuilder::new(storage.clone(), IndexConfig::default())?.build(&lexicon, &catalog)?;
//!
//! let engine = QueryEngine::open(storage, &IndexConfig::default())?;
//! let result = engine.search("cats and a cat", 10)?;
//! assert_eq!(engine.resolve(result.hits[0].doc_id)?.doc_no, "DOC0");
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod search;
pub mod storage;
pub mod summary;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
