//! Per-query score accumulators.

use ahash::AHashMap;

/// Running score of every document that shares at least one term with the
/// query.
///
/// A document gets an entry the first time one of its postings is scored;
/// documents never touched by the query are absent rather than zero.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    scores: AHashMap<i32, f64>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator sized for roughly `capacity` candidate documents.
    pub fn with_capacity(capacity: usize) -> Self {
        Accumulator {
            scores: AHashMap::with_capacity(capacity),
        }
    }

    /// Add one posting's contribution to `doc_id`.
    pub fn add(&mut self, doc_id: i32, contribution: f64) {
        *self.scores.entry(doc_id).or_insert(0.0) += contribution;
    }

    /// Current score of a document, if it has one.
    pub fn get(&self, doc_id: i32) -> Option<f64> {
        self.scores.get(&doc_id).copied()
    }

    /// Number of candidate documents.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no document has been scored.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate `(doc_id, score)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.scores.iter().map(|(&doc_id, &score)| (doc_id, score))
    }
}
