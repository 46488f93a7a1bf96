//! Similarity functions.
//!
//! The query engine treats scoring as a strategy: for each posting of a query
//! term it calls [`Similarity::score`] with the document's normalization
//! factor, the in-document term frequency and the term's document frequency,
//! and adds the returned contribution to the document's accumulator.
//!
//! Any `Fn(f64, i32, i32) -> f64` closure is a similarity:
//!
//! ```
//! use pilum::search::similarity::Similarity;
//!
//! let tf_over_norm = |norm: f64, tf: i32, _df: i32| tf as f64 / norm;
//! assert_eq!(tf_over_norm.score(2.0, 2, 2), 1.0);
//! ```

use std::fmt::Debug;

/// Scoring function evaluated once per (term, posting).
///
/// Implementations must be monotonic in `term_frequency`.
pub trait Similarity: Send + Sync {
    /// Contribution of one posting to its document's score.
    fn score(&self, normalization: f64, term_frequency: i32, document_frequency: i32) -> f64;

    /// Get the name of this similarity (for logging and output).
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Similarity for F
where
    F: Fn(f64, i32, i32) -> f64 + Send + Sync,
{
    fn score(&self, normalization: f64, term_frequency: i32, document_frequency: i32) -> f64 {
        self(normalization, term_frequency, document_frequency)
    }
}

/// `tf / normalization`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermFrequencyRatio;

impl Similarity for TermFrequencyRatio {
    fn score(&self, normalization: f64, term_frequency: i32, _document_frequency: i32) -> f64 {
        if normalization == 0.0 {
            return 0.0;
        }
        term_frequency as f64 / normalization
    }

    fn name(&self) -> &str {
        "tf_ratio"
    }
}

/// Okapi BM25 with the length normalization precomputed per document.
///
/// The catalog stores `K = k1 * ((1 - b) + b * doc_len / avg_len)` for every
/// document (see [`Bm25Similarity::normalization`]), so scoring a posting only
/// needs `K`, `tf` and `df`:
///
/// ```text
/// idf   = ln(1 + (N - df + 0.5) / (df + 0.5))
/// score = idf * (k1 + 1) * tf / (K + tf)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Bm25Similarity {
    k1: f64,
    total_documents: u64,
}

impl Bm25Similarity {
    /// Create a BM25 similarity over a collection of `total_documents`.
    pub fn new(k1: f64, total_documents: u64) -> Self {
        Bm25Similarity {
            k1,
            total_documents,
        }
    }

    /// Per-document length normalization `K`.
    pub fn normalization(k1: f64, b: f64, document_length: u64, average_length: f64) -> f64 {
        let relative = if average_length > 0.0 {
            document_length as f64 / average_length
        } else {
            1.0
        };
        k1 * ((1.0 - b) + b * relative)
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// Number of documents the IDF is computed against.
    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    fn idf(&self, document_frequency: i32) -> f64 {
        let n = self.total_documents as f64;
        let df = document_frequency.max(0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

impl Similarity for Bm25Similarity {
    fn score(&self, normalization: f64, term_frequency: i32, document_frequency: i32) -> f64 {
        if term_frequency <= 0 {
            return 0.0;
        }
        let tf = term_frequency as f64;
        self.idf(document_frequency) * (self.k1 + 1.0) * tf / (normalization + tf)
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

impl Debug for dyn Similarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Similarity({})", self.name())
    }
}
