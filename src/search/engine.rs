//! Accumulator-based query evaluation.
//!
//! For every query term present in the lexicon, the engine reads the term's
//! posting list from the posting store, resolves each posting's document in
//! the catalog, and adds the similarity contribution to that document's
//! accumulator. The best `top_k` accumulators form the result.
//!
//! The engine holds no mutable state: each call to [`QueryEngine::score`]
//! opens its own posting reader and owns its accumulator, so one engine can
//! serve concurrent queries.

use std::sync::Arc;

use log::debug;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::catalog::{CatalogEntry, DocumentCatalog};
use crate::index::lexicon::{LexiconEntry, LexiconStore};
use crate::index::manifest::IndexManifest;
use crate::index::posting::PostingReader;
use crate::search::accumulator::Accumulator;
use crate::search::collector::{RankedResult, TopDocsCollector};
use crate::search::similarity::{Bm25Similarity, Similarity};
use crate::storage::{Storage, StorageInput};

/// Query engine over a built index.
#[derive(Debug)]
pub struct QueryEngine {
    storage: Arc<dyn Storage>,
    postings_file: String,
    lexicon: LexiconStore,
    catalog: Arc<DocumentCatalog>,
    similarity: Arc<dyn Similarity>,
    analyzer: Arc<dyn Analyzer>,
}

impl QueryEngine {
    /// Assemble an engine from already loaded parts.
    pub fn new(
        storage: Arc<dyn Storage>,
        postings_file: impl Into<String>,
        lexicon: LexiconStore,
        catalog: Arc<DocumentCatalog>,
        similarity: Arc<dyn Similarity>,
    ) -> Result<Self> {
        Ok(QueryEngine {
            storage,
            postings_file: postings_file.into(),
            lexicon,
            catalog,
            similarity,
            analyzer: Arc::new(StandardAnalyzer::without_stop_words()?),
        })
    }

    /// Open an index written by [`IndexBuilder`](crate::index::IndexBuilder).
    ///
    /// Store names and the BM25 `k1` come from the manifest; the similarity
    /// is BM25 over the number of documents in the catalog. Stores whose size
    /// differs from the manifest are rejected as corrupt.
    pub fn open(storage: Arc<dyn Storage>, config: &IndexConfig) -> Result<Self> {
        let manifest = IndexManifest::load(storage.as_ref(), &config.manifest_file)?;
        manifest.check_sizes(storage.as_ref())?;
        let lexicon = LexiconStore::open(storage.as_ref(), &manifest.lexicon.name)?;
        let catalog = DocumentCatalog::load(storage.as_ref(), &manifest.catalog.name)?;
        let similarity = Bm25Similarity::new(manifest.k1, catalog.len() as u64);

        debug!(
            "Opened index: {} terms, {} documents, similarity={}",
            lexicon.len(),
            catalog.len(),
            similarity.name()
        );

        Self::new(
            storage,
            manifest.postings.name,
            lexicon,
            Arc::new(catalog),
            Arc::new(similarity),
        )
    }

    /// Replace the similarity function.
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Replace the analyzer used by [`QueryEngine::search`].
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Rank documents for already normalized query terms.
    ///
    /// Terms absent from the lexicon contribute nothing. A term repeated in
    /// the query is scored once per occurrence. Errors abort this query only.
    pub fn score(&self, query_terms: &[String], top_k: usize) -> Result<RankedResult> {
        if top_k == 0 {
            return Ok(RankedResult::default());
        }

        let entries: Vec<&LexiconEntry> = query_terms
            .iter()
            .filter_map(|term| {
                let entry = self.lexicon.lookup(term);
                if entry.is_none() {
                    debug!("term '{term}' not in lexicon");
                }
                entry
            })
            .collect();
        if entries.is_empty() {
            return Ok(RankedResult::default());
        }

        let mut reader = self.open_postings()?;
        let candidates: u64 = entries.iter().map(|entry| entry.count()).sum();
        let mut accumulator =
            Accumulator::with_capacity((candidates as usize).min(self.catalog.len()));

        for entry in entries {
            let postings = reader.read_postings(entry.offset(), entry.count())?;
            for posting in postings {
                let document = self.catalog.resolve(posting.doc_id)?;
                let contribution = self.similarity.score(
                    document.normalization,
                    posting.term_frequency,
                    entry.document_frequency,
                );
                accumulator.add(posting.doc_id, contribution);
            }
        }

        let mut collector = TopDocsCollector::new(top_k);
        collector.collect_all(&accumulator);
        let result = collector.into_result();

        debug!(
            "query {:?}: {} candidates, {} returned",
            query_terms,
            accumulator.len(),
            result.len()
        );
        Ok(result)
    }

    /// Analyze raw query text, then [`score`](QueryEngine::score) it.
    pub fn search(&self, query: &str, top_k: usize) -> Result<RankedResult> {
        let terms = self.analyzer.terms(query)?;
        self.score(&terms, top_k)
    }

    /// Catalog entry of a document.
    pub fn resolve(&self, doc_id: i32) -> Result<&CatalogEntry> {
        self.catalog.resolve(doc_id)
    }

    /// The analyzer applied to raw queries.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// The loaded lexicon.
    pub fn lexicon(&self) -> &LexiconStore {
        &self.lexicon
    }

    /// The shared document catalog.
    pub fn catalog(&self) -> &Arc<DocumentCatalog> {
        &self.catalog
    }

    /// Name of the active similarity.
    pub fn similarity_name(&self) -> &str {
        self.similarity.name()
    }

    fn open_postings(&self) -> Result<PostingReader<Box<dyn StorageInput>>> {
        let input = self.storage.open_input(&self.postings_file)?;
        PostingReader::new(input)
    }
}
