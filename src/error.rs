//! Error types for the Pilum library.
//!
//! All fallible operations return [`PilumError`] through the [`Result`] alias.
//! The variants follow the lifecycle of an index:
//!
//! - [`PilumError::Io`] / [`PilumError::Storage`]: a store could not be opened
//!   or written. Fatal to an index build; the partially written files are not
//!   a valid index and must be rebuilt.
//! - [`PilumError::CorruptIndex`]: a read could not retrieve the bytes the
//!   lexicon declared. Fatal to the current query only.
//! - [`PilumError::UnknownDocument`]: a posting references a document id the
//!   catalog does not know. Fatal to the current query only.
//!
//! # Examples
//!
//! ```
//! use pilum::error::{PilumError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PilumError::corrupt_index("posting list truncated"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Pilum operations.
#[derive(Error, Debug)]
pub enum PilumError {
    /// I/O errors (file open, short writes, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The on-disk index does not contain the bytes the lexicon declares.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// A posting references a document id absent from the catalog.
    #[error("Unknown document: {0}")]
    UnknownDocument(i32),

    /// Analysis-related errors (tokenization, collection parsing, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors
    #[error("Query error: {0}")]
    Query(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by pluggable collaborators
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with PilumError.
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        PilumError::Storage(msg.into())
    }

    /// Create a new corrupt index error.
    pub fn corrupt_index<S: Into<String>>(msg: S) -> Self {
        PilumError::CorruptIndex(msg.into())
    }

    /// Create a new unknown document error.
    pub fn unknown_document(doc_id: i32) -> Self {
        PilumError::UnknownDocument(doc_id)
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PilumError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PilumError::Query(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PilumError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this error is confined to a single query.
    ///
    /// Query-scoped errors leave the store files and catalog valid for
    /// subsequent queries.
    pub fn is_query_scoped(&self) -> bool {
        matches!(
            self,
            PilumError::CorruptIndex(_) | PilumError::UnknownDocument(_) | PilumError::Query(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PilumError::corrupt_index("short read");
        assert_eq!(error.to_string(), "Corrupt index: short read");

        let error = PilumError::unknown_document(42);
        assert_eq!(error.to_string(), "Unknown document: 42");

        let error = PilumError::analysis("missing DOCNO");
        assert_eq!(error.to_string(), "Analysis error: missing DOCNO");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let pilum_error = PilumError::from(io_error);

        match pilum_error {
            PilumError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_query_scoped() {
        assert!(PilumError::corrupt_index("x").is_query_scoped());
        assert!(PilumError::unknown_document(1).is_query_scoped());
        assert!(!PilumError::storage("x").is_query_scoped());
    }
}
