//! Configuration for building and querying an index.
//!
//! Both structures deserialize from JSON with every field optional:
//!
//! ```
//! use pilum::config::IndexConfig;
//!
//! let config: IndexConfig = serde_json::from_str(r#"{ "k1": 0.9, "b": 0.4 }"#).unwrap();
//! assert_eq!(config.k1, 0.9);
//! assert_eq!(config.lexicon_file, "lexicon.bin");
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};

/// File layout and normalization parameters of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Posting-list store file name.
    pub postings_file: String,
    /// Lexicon store file name.
    pub lexicon_file: String,
    /// Document catalog file name.
    pub catalog_file: String,
    /// Manifest file name.
    pub manifest_file: String,
    /// BM25 term-frequency saturation.
    pub k1: f64,
    /// BM25 length-normalization strength (0.0-1.0).
    pub b: f64,
    /// I/O buffer size for file storage.
    pub buffer_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            postings_file: "postings.bin".to_string(),
            lexicon_file: "lexicon.bin".to_string(),
            catalog_file: "catalog.bin".to_string(),
            manifest_file: "manifest.json".to_string(),
            k1: 1.2,
            b: 0.75,
            buffer_size: 65536,
        }
    }
}

impl IndexConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PilumError::invalid_config(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let config: IndexConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges and that the four files are distinct.
    pub fn validate(&self) -> Result<()> {
        if !(self.k1 > 0.0 && self.k1.is_finite()) {
            return Err(PilumError::invalid_config(format!(
                "k1 must be positive, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(PilumError::invalid_config(format!(
                "b must be within [0, 1], got {}",
                self.b
            )));
        }
        if self.buffer_size == 0 {
            return Err(PilumError::invalid_config("buffer_size must be non-zero"));
        }

        let mut names = [
            &self.postings_file,
            &self.lexicon_file,
            &self.catalog_file,
            &self.manifest_file,
        ];
        if names.iter().any(|n| n.is_empty()) {
            return Err(PilumError::invalid_config("file names must be non-empty"));
        }
        names.sort();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(PilumError::invalid_config("index file names must be distinct"));
        }
        Ok(())
    }
}

/// Parameters of the query-biased summarizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum number of sentences in a summary.
    pub max_sentences: usize,
    /// Cosine similarity above which two sentences are linked.
    pub similarity_threshold: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            max_sentences: 3,
            similarity_threshold: 0.1,
        }
    }
}
