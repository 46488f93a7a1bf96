//! Index manifest and integrity validation.
//!
//! The manifest is a JSON document written next to the binary stores. It
//! records what the builder produced (counts, byte sizes, CRC32 checksums) and
//! the similarity parameters the catalog normalization was computed with, so a
//! query process can reopen the index without being told how it was built.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::error::{PilumError, Result};
use crate::index::builder::CollectionStats;
use crate::index::catalog::DocumentCatalog;
use crate::index::lexicon::LexiconStore;
use crate::index::posting::POSTING_SIZE;
use crate::storage::{Storage, StorageOutput};
use crate::storage::structured::WrittenFile;

/// Version of the on-disk layout.
pub const FORMAT_VERSION: u32 = 1;

/// One store file as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    /// File name inside the index storage.
    pub name: String,
    /// Length in bytes.
    pub size: u64,
    /// CRC32 of the whole file.
    pub crc32: u32,
}

impl StoreFile {
    /// Record a file the builder just closed.
    pub fn new(name: &str, written: WrittenFile) -> Self {
        StoreFile {
            name: name.to_string(),
            size: written.bytes,
            crc32: written.checksum,
        }
    }
}

/// Description of a built index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Layout version, see [`FORMAT_VERSION`].
    pub format_version: u32,
    /// When the build finished.
    pub created_at: DateTime<Utc>,
    /// Documents in the catalog.
    pub document_count: usize,
    /// Terms with a non-empty posting list.
    pub term_count: usize,
    /// Postings across all lists.
    pub posting_count: u64,
    /// Tokens indexed across all documents.
    pub total_tokens: u64,
    /// `total_tokens / document_count`.
    pub average_document_length: f64,
    /// BM25 `k1` used for the catalog normalization.
    pub k1: f64,
    /// BM25 `b` used for the catalog normalization.
    pub b: f64,
    /// Posting store.
    pub postings: StoreFile,
    /// Lexicon store.
    pub lexicon: StoreFile,
    /// Document catalog store.
    pub catalog: StoreFile,
}

impl IndexManifest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: &IndexConfig,
        stats: CollectionStats,
        term_count: usize,
        posting_count: u64,
        postings: StoreFile,
        lexicon: StoreFile,
        catalog: StoreFile,
    ) -> Self {
        IndexManifest {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            document_count: stats.document_count,
            term_count,
            posting_count,
            total_tokens: stats.total_tokens,
            average_document_length: stats.average_document_length(),
            k1: config.k1,
            b: config.b,
            postings,
            lexicon,
            catalog,
        }
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write(&self, storage: &dyn Storage, name: &str) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let mut output = storage.create_output(name)?;
        output.write_all(&json)?;
        output.close()
    }

    /// Load a manifest written by [`IndexManifest::write`].
    pub fn load(storage: &dyn Storage, name: &str) -> Result<Self> {
        let mut input = storage.open_input(name)?;
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;
        let manifest: IndexManifest = serde_json::from_slice(&buffer)?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(PilumError::corrupt_index(format!(
                "unsupported index format version {} (expected {FORMAT_VERSION})",
                manifest.format_version
            )));
        }
        Ok(manifest)
    }

    /// Fail with `CorruptIndex` unless every store has the recorded size.
    ///
    /// A cheap check done on open; [`IndexManifest::validate`] also compares
    /// checksums.
    pub fn check_sizes(&self, storage: &dyn Storage) -> Result<()> {
        for file in [&self.postings, &self.lexicon, &self.catalog] {
            let size = storage.file_size(&file.name)?;
            if size != file.size {
                return Err(PilumError::corrupt_index(format!(
                    "{}: size {} does not match manifest {}",
                    file.name, size, file.size
                )));
            }
        }
        Ok(())
    }

    /// Check the stores against this manifest.
    ///
    /// Verifies sizes and checksums of every store, that the posting store is
    /// record aligned, that every lexicon range lies inside it, and that the
    /// catalog decodes. Problems are collected rather than returned as errors.
    pub fn validate(&self, storage: &dyn Storage) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        for file in [&self.postings, &self.lexicon, &self.catalog] {
            report.files_checked += 1;
            if !storage.file_exists(&file.name) {
                report.problems.push(format!("{}: missing", file.name));
                continue;
            }
            let (size, crc32) = checksum(storage, &file.name)?;
            if size != file.size {
                report.problems.push(format!(
                    "{}: size {} does not match manifest {}",
                    file.name, size, file.size
                ));
            }
            if crc32 != file.crc32 {
                report.problems.push(format!(
                    "{}: checksum {:08x} does not match manifest {:08x}",
                    file.name, crc32, file.crc32
                ));
            }
        }

        if !report.problems.is_empty() {
            return Ok(report);
        }

        let postings_size = storage.file_size(&self.postings.name)?;
        if postings_size % POSTING_SIZE != 0 {
            report.problems.push(format!(
                "{}: {postings_size} bytes is not a whole number of postings",
                self.postings.name
            ));
        }

        match LexiconStore::open(storage, &self.lexicon.name) {
            Ok(lexicon) => {
                for entry in lexicon.iter() {
                    report.terms_checked += 1;
                    if entry.end() > postings_size {
                        report.problems.push(format!(
                            "term '{}': postings [{}, {}) exceed {} bytes",
                            entry.term,
                            entry.offset(),
                            entry.end(),
                            postings_size
                        ));
                    }
                }
                if lexicon.len() != self.term_count {
                    report.problems.push(format!(
                        "lexicon holds {} terms, manifest records {}",
                        lexicon.len(),
                        self.term_count
                    ));
                }
            }
            Err(e) => report.problems.push(format!("{}: {e}", self.lexicon.name)),
        }

        if let Err(e) = DocumentCatalog::load(storage, &self.catalog.name) {
            report.problems.push(format!("{}: {e}", self.catalog.name));
        }

        Ok(report)
    }
}

/// Outcome of [`IndexManifest::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Store files inspected.
    pub files_checked: usize,
    /// Lexicon entries whose posting range was checked.
    pub terms_checked: usize,
    /// One message per problem found.
    pub problems: Vec<String>,
}

impl ValidationReport {
    /// Whether no problem was found.
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

fn checksum(storage: &dyn Storage, name: &str) -> Result<(u64, u32)> {
    let mut input = storage.open_input(name)?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = [0u8; 8192];
    let mut size = 0u64;
    loop {
        let read = input.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        size += read as u64;
    }
    Ok((size, hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::{IndexBuilder, InvertedLexicon};
    use crate::index::posting::Posting;
    use crate::storage::memory::MemoryStorage;
    use std::sync::Arc;

    fn build_sample(storage: Arc<dyn Storage>) -> IndexManifest {
        let mut catalog = DocumentCatalog::new();
        catalog.insert(0, "DOC0", 1.0).unwrap();
        catalog.insert(1, "DOC1", 1.5).unwrap();
        let mut lexicon = InvertedLexicon::new();
        lexicon.add_posting("alpha", Posting::new(0, 2));
        lexicon.add_posting("beta", Posting::new(0, 1));
        lexicon.add_posting("beta", Posting::new(1, 3));

        IndexBuilder::new(storage, IndexConfig::default())
            .unwrap()
            .with_stats(CollectionStats {
                document_count: 2,
                total_tokens: 6,
            })
            .build(&lexicon, &catalog)
            .unwrap()
            .manifest
    }

    #[test]
    fn test_manifest_round_trip() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
        let manifest = build_sample(storage.clone());

        let loaded = IndexManifest::load(storage.as_ref(), "manifest.json").unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.average_document_length, 3.0);
        assert_eq!(loaded.document_count, 2);
        assert_eq!(loaded.postings.size, 24);
    }

    #[test]
    fn test_validate_clean_index() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
        let manifest = build_sample(storage.clone());

        let report = manifest.validate(storage.as_ref()).unwrap();
        assert!(report.is_valid(), "{:?}", report.problems);
        assert_eq!(report.files_checked, 3);
        assert_eq!(report.terms_checked, 2);
    }

    #[test]
    fn test_validate_detects_tampering() {
        let storage = Arc::new(MemoryStorage::new_default());
        let manifest = build_sample(storage.clone());

        let mut bytes = storage.read_all("postings.bin").unwrap();
        bytes[4] ^= 0xFF;
        let mut output = storage.create_output("postings.bin").unwrap();
        output.write_all(&bytes).unwrap();
        output.close().unwrap();

        let report = manifest.validate(storage.as_ref()).unwrap();
        assert!(!report.is_valid());
        assert!(report.problems[0].contains("checksum"));
    }
}
