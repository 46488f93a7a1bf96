//! Index builder.
//!
//! Serializes an in-memory [`InvertedLexicon`] and its [`DocumentCatalog`] into
//! the posting-list, lexicon and catalog stores, then records an
//! [`IndexManifest`] describing what was written.
//!
//! Every build truncates the target files. A build that fails part way leaves
//! files that do not form a valid index; callers must rebuild from scratch.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::error::{PilumError, Result};
use crate::index::catalog::DocumentCatalog;
use crate::index::lexicon::{LexiconEntry, LexiconWriter};
use crate::index::manifest::{IndexManifest, StoreFile};
use crate::index::posting::{Posting, PostingWriter};
use crate::storage::Storage;

/// In-memory lexicon: term to posting list.
///
/// Terms are kept sorted so that building the same collection twice produces
/// byte-identical stores.
#[derive(Debug, Clone, Default)]
pub struct InvertedLexicon {
    terms: BTreeMap<String, Vec<Posting>>,
}

impl InvertedLexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a posting to a term's list.
    pub fn add_posting(&mut self, term: impl Into<String>, posting: Posting) {
        self.terms.entry(term.into()).or_default().push(posting);
    }

    /// Count one occurrence of `term` in `doc_id`.
    ///
    /// Occurrences for a document must be recorded contiguously (all of one
    /// document before the next), which is how an indexer walks a collection.
    pub fn record_occurrence(&mut self, term: &str, doc_id: i32) {
        if let Some(postings) = self.terms.get_mut(term) {
            match postings.last_mut() {
                Some(last) if last.doc_id == doc_id => last.term_frequency += 1,
                _ => postings.push(Posting::new(doc_id, 1)),
            }
            return;
        }
        self.terms
            .insert(term.to_string(), vec![Posting::new(doc_id, 1)]);
    }

    /// Postings of a term.
    pub fn get(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no term has been added.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total number of postings over all terms.
    pub fn posting_count(&self) -> u64 {
        self.terms.values().map(|p| p.len() as u64).sum()
    }

    /// Iterate terms in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }
}

impl FromIterator<(String, Vec<Posting>)> for InvertedLexicon {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Posting>)>>(iter: I) -> Self {
        InvertedLexicon {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Corpus statistics recorded in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of indexed documents.
    pub document_count: usize,
    /// Number of tokens across all documents.
    pub total_tokens: u64,
}

impl CollectionStats {
    /// Mean document length in tokens.
    pub fn average_document_length(&self) -> f64 {
        if self.document_count == 0 {
            0.0
        } else {
            self.total_tokens as f64 / self.document_count as f64
        }
    }
}

/// A store written by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHandle {
    /// File name inside the storage.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl From<&StoreFile> for StoreHandle {
    fn from(file: &StoreFile) -> Self {
        StoreHandle {
            name: file.name.clone(),
            size: file.size,
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    /// Posting-list store.
    pub postings: StoreHandle,
    /// Lexicon store.
    pub lexicon: StoreHandle,
    /// Catalog store.
    pub catalog: StoreHandle,
    /// The manifest written alongside the stores.
    pub manifest: IndexManifest,
}

/// Writes an index into a [`Storage`].
#[derive(Debug)]
pub struct IndexBuilder {
    storage: Arc<dyn Storage>,
    config: IndexConfig,
    stats: Option<CollectionStats>,
}

impl IndexBuilder {
    /// Create a builder writing into `storage` with the given file layout.
    pub fn new(storage: Arc<dyn Storage>, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(IndexBuilder {
            storage,
            config,
            stats: None,
        })
    }

    /// Record corpus statistics in the manifest.
    pub fn with_stats(mut self, stats: CollectionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Serialize `lexicon` and `catalog`.
    ///
    /// For every term, in lexicon order, the current byte count of the
    /// posting store becomes the term's offset, its postings are appended,
    /// and its lexicon record is written.
    ///
    /// The manifest is removed before any store is touched and written only
    /// after all of them are closed, so a build that fails partway leaves no
    /// index that opens.
    pub fn build(&self, lexicon: &InvertedLexicon, catalog: &DocumentCatalog) -> Result<BuiltIndex> {
        Self::check_inputs(lexicon, catalog)?;
        self.storage.delete_file(&self.config.manifest_file)?;

        let postings_output = self.storage.create_output(&self.config.postings_file)?;
        let lexicon_output = self.storage.create_output(&self.config.lexicon_file)?;
        let mut postings_writer = PostingWriter::new(postings_output);
        let mut lexicon_writer = LexiconWriter::new(lexicon_output);

        for (term, postings) in lexicon.iter() {
            if postings.is_empty() {
                continue;
            }

            let byte_offset = postings_writer.write_list(postings)?;
            let entry = LexiconEntry {
                term: term.to_string(),
                document_frequency: postings.len() as i32,
                byte_offset: byte_offset as i64,
            };
            lexicon_writer.write_entry(&entry)?;
            debug!(
                "term '{}': df={} offset={}",
                entry.term, entry.document_frequency, entry.byte_offset
            );
        }

        let posting_count = postings_writer.postings_written();
        let term_count = lexicon_writer.entries_written();
        let postings_file = postings_writer.close()?;
        let lexicon_file = lexicon_writer.close()?;

        let catalog_output = self.storage.create_output(&self.config.catalog_file)?;
        let catalog_file = catalog.write(catalog_output)?;

        let stats = self.stats.unwrap_or(CollectionStats {
            document_count: catalog.len(),
            total_tokens: 0,
        });

        let manifest = IndexManifest::new(
            &self.config,
            stats,
            term_count,
            posting_count,
            StoreFile::new(&self.config.postings_file, postings_file),
            StoreFile::new(&self.config.lexicon_file, lexicon_file),
            StoreFile::new(&self.config.catalog_file, catalog_file),
        );
        manifest.write(self.storage.as_ref(), &self.config.manifest_file)?;

        info!(
            "Built index: {} documents, {} terms, {} postings ({} bytes)",
            catalog.len(),
            term_count,
            posting_count,
            manifest.postings.size
        );

        Ok(BuiltIndex {
            postings: StoreHandle::from(&manifest.postings),
            lexicon: StoreHandle::from(&manifest.lexicon),
            catalog: StoreHandle::from(&manifest.catalog),
            manifest,
        })
    }

    fn check_inputs(lexicon: &InvertedLexicon, catalog: &DocumentCatalog) -> Result<()> {
        for (term, postings) in lexicon.iter() {
            if postings.len() > i32::MAX as usize {
                return Err(PilumError::invalid_argument(format!(
                    "term '{term}' has {} postings, more than a lexicon record can hold",
                    postings.len()
                )));
            }
            if let Some(missing) = postings.iter().find(|p| !catalog.contains(p.doc_id)) {
                return Err(PilumError::UnknownDocument(missing.doc_id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn sample_catalog() -> DocumentCatalog {
        let mut catalog = DocumentCatalog::new();
        catalog.insert(1, "DOC1", 2.0).unwrap();
        catalog.insert(2, "DOC2", 1.0).unwrap();
        catalog
    }

    #[test]
    fn test_record_occurrence() {
        let mut lexicon = InvertedLexicon::new();
        lexicon.record_occurrence("cat", 1);
        lexicon.record_occurrence("cat", 1);
        lexicon.record_occurrence("dog", 1);
        lexicon.record_occurrence("cat", 2);

        assert_eq!(
            lexicon.get("cat").unwrap(),
            &[Posting::new(1, 2), Posting::new(2, 1)]
        );
        assert_eq!(lexicon.get("dog").unwrap(), &[Posting::new(1, 1)]);
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.posting_count(), 3);
    }

    #[test]
    fn test_build_records_offsets() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
        let mut lexicon = InvertedLexicon::new();
        lexicon.add_posting("t1", Posting::new(1, 3));
        lexicon.add_posting("t2", Posting::new(1, 1));
        lexicon.add_posting("t2", Posting::new(2, 5));

        let builder = IndexBuilder::new(storage.clone(), IndexConfig::default()).unwrap();
        let built = builder.build(&lexicon, &sample_catalog()).unwrap();

        assert_eq!(built.postings.size, 24);
        assert_eq!(built.manifest.term_count, 2);
        assert_eq!(built.manifest.posting_count, 3);
        assert!(storage.file_exists("manifest.json"));
        assert!(storage.file_exists("catalog.bin"));
    }

    #[test]
    fn test_build_rejects_unknown_document() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
        let mut lexicon = InvertedLexicon::new();
        lexicon.add_posting("cat", Posting::new(9, 1));

        let builder = IndexBuilder::new(storage.clone(), IndexConfig::default()).unwrap();
        assert!(matches!(
            builder.build(&lexicon, &sample_catalog()),
            Err(PilumError::UnknownDocument(9))
        ));
        assert!(!storage.file_exists("postings.bin"));
    }

    #[test]
    fn test_empty_lists_are_skipped() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
        let lexicon: InvertedLexicon = vec![
            ("empty".to_string(), Vec::new()),
            ("full".to_string(), vec![Posting::new(2, 4)]),
        ]
        .into_iter()
        .collect();

        let builder = IndexBuilder::new(storage, IndexConfig::default()).unwrap();
        let built = builder.build(&lexicon, &sample_catalog()).unwrap();
        assert_eq!(built.manifest.term_count, 1);
        assert_eq!(built.postings.size, 8);
    }

    #[test]
    fn test_average_document_length() {
        let stats = CollectionStats {
            document_count: 4,
            total_tokens: 10,
        };
        assert_eq!(stats.average_document_length(), 2.5);
        assert_eq!(CollectionStats::default().average_document_length(), 0.0);
    }
}
