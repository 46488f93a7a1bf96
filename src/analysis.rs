//! Text analysis.
//!
//! Turns raw document or query text into the normalized terms stored in the
//! lexicon. The same analyzer must be used at ingestion and query time,
//! otherwise query terms will not match indexed terms.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Terms
//! ```
//!
//! # Examples
//!
//! ```
//! use pilum::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let terms = analyzer.terms("The Cat, the HAT.").unwrap();
//! assert_eq!(terms, vec!["cat", "hat"]);
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
