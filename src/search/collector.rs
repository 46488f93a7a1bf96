//! Top-k selection over accumulated scores.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::search::accumulator::Accumulator;

/// One ranked document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// 1-based rank.
    pub rank: usize,
    /// Dense document id.
    pub doc_id: i32,
    /// Accumulated score.
    pub score: f64,
}

/// Ranked hits of a query, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Hits ordered by descending score, ranks starting at 1.
    pub hits: Vec<RankedHit>,
}

impl RankedResult {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether the query matched nothing (or `top_k` was zero).
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate hits in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, RankedHit> {
        self.hits.iter()
    }
}

impl IntoIterator for RankedResult {
    type Item = RankedHit;
    type IntoIter = std::vec::IntoIter<RankedHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

/// A scored document for use in the heap.
#[derive(Debug, Clone, Copy)]
struct ScoredDoc {
    doc_id: i32,
    score: f64,
}

impl ScoredDoc {
    /// Ranking order: higher score first, then lower doc id.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    // The heap's maximum is the worst-ranked document kept so far.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Keeps the `max_docs` best documents seen.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    hits: BinaryHeap<ScoredDoc>,
    total_hits: u64,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// Number of documents offered so far.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Offer a document.
    pub fn collect(&mut self, doc_id: i32, score: f64) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }

        let scored_doc = ScoredDoc { doc_id, score };
        if self.hits.len() < self.max_docs {
            self.hits.push(scored_doc);
        } else if let Some(worst) = self.hits.peek() {
            if scored_doc.rank_cmp(worst) == Ordering::Less {
                self.hits.pop();
                self.hits.push(scored_doc);
            }
        }
    }

    /// Offer every entry of an accumulator.
    pub fn collect_all(&mut self, accumulator: &Accumulator) {
        for (doc_id, score) in accumulator.iter() {
            self.collect(doc_id, score);
        }
    }

    /// Consume the collector and assign ranks.
    pub fn into_result(self) -> RankedResult {
        let hits = self
            .hits
            .into_sorted_vec()
            .into_iter()
            .enumerate()
            .map(|(i, doc)| RankedHit {
                rank: i + 1,
                doc_id: doc.doc_id,
                score: doc.score,
            })
            .collect();
        RankedResult { hits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_docs_collector() {
        let mut collector = TopDocsCollector::new(3);

        collector.collect(1, 0.5);
        collector.collect(2, 0.8);
        collector.collect(3, 0.3);
        collector.collect(4, 0.9);
        collector.collect(5, 0.1);

        assert_eq!(collector.total_hits(), 5);
        let result = collector.into_result();
        let ids: Vec<i32> = result.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![4, 2, 1]);
        let ranks: Vec<usize> = result.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_prefer_lower_doc_id() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(9, 1.0);
        collector.collect(3, 1.0);
        collector.collect(5, 1.0);
        collector.collect(1, 0.5);

        let ids: Vec<i32> = collector.into_result().iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn test_fewer_candidates_than_k() {
        let mut collector = TopDocsCollector::new(5);
        collector.collect(1, 0.2);
        collector.collect(2, 0.4);

        let result = collector.into_result();
        assert_eq!(result.len(), 2);
        assert_eq!(result.hits[0].doc_id, 2);
    }

    #[test]
    fn test_zero_k_is_empty() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(1, 1.0);
        assert!(collector.into_result().is_empty());
    }

    #[test]
    fn test_collect_all_from_accumulator() {
        let mut acc = Accumulator::new();
        for doc_id in 0..10 {
            acc.add(doc_id, doc_id as f64);
        }
        let mut collector = TopDocsCollector::new(3);
        collector.collect_all(&acc);

        let scores: Vec<f64> = collector.into_result().iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![9.0, 8.0, 7.0]);
    }
}
