//! Turns analyzed documents into an in-memory inverted lexicon.

use std::sync::Arc;

use ahash::AHashSet;
use log::warn;

use crate::analysis::analyzer::Analyzer;
use crate::config::IndexConfig;
use crate::error::{PilumError, Result};
use crate::index::builder::{CollectionStats, InvertedLexicon};
use crate::index::catalog::DocumentCatalog;
use crate::search::similarity::Bm25Similarity;

/// Accumulates postings and document lengths for a collection.
///
/// Document ids are assigned densely from 0 in insertion order.
pub struct DocumentIndexer {
    analyzer: Arc<dyn Analyzer>,
    k1: f64,
    b: f64,
    lexicon: InvertedLexicon,
    documents: Vec<(String, u64)>,
    seen: AHashSet<String>,
    total_tokens: u64,
}

impl DocumentIndexer {
    /// Create an indexer using the normalization parameters of `config`.
    pub fn new(analyzer: Arc<dyn Analyzer>, config: &IndexConfig) -> Self {
        DocumentIndexer {
            analyzer,
            k1: config.k1,
            b: config.b,
            lexicon: InvertedLexicon::new(),
            documents: Vec::new(),
            seen: AHashSet::new(),
            total_tokens: 0,
        }
    }

    /// Analyze and index one document, returning its id.
    pub fn add_document(&mut self, doc_no: &str, text: &str) -> Result<i32> {
        let doc_id = i32::try_from(self.documents.len()).map_err(|_| {
            PilumError::invalid_argument("collection exceeds the maximum number of documents")
        })?;
        if !self.seen.insert(doc_no.to_string()) {
            warn!("document number '{doc_no}' appears more than once");
        }

        let mut length = 0u64;
        for token in self.analyzer.analyze(text)? {
            self.lexicon.record_occurrence(&token.text, doc_id);
            length += 1;
        }

        self.total_tokens += length;
        self.documents.push((doc_no.to_string(), length));
        Ok(doc_id)
    }

    /// Number of documents added so far.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Compute per-document normalization and hand over the built structures.
    pub fn finish(self) -> Result<(InvertedLexicon, DocumentCatalog, CollectionStats)> {
        let stats = CollectionStats {
            document_count: self.documents.len(),
            total_tokens: self.total_tokens,
        };
        let average_length = stats.average_document_length();

        let mut catalog = DocumentCatalog::new();
        for (doc_id, (doc_no, length)) in self.documents.into_iter().enumerate() {
            let normalization = Bm25Similarity::normalization(self.k1, self.b, length, average_length);
            catalog.insert(doc_id as i32, doc_no, normalization)?;
        }

        Ok((self.lexicon, catalog, stats))
    }
}

impl std::fmt::Debug for DocumentIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndexer")
            .field("analyzer", &self.analyzer.name())
            .field("documents", &self.documents.len())
            .field("terms", &self.lexicon.len())
            .finish()
    }
}
