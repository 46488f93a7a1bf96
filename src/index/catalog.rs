//! Document catalog.
//!
//! Maps the dense numeric document ids used in postings back to the external
//! document number shown to users, together with the per-document
//! normalization factor consumed by the similarity function.
//!
//! Persisted as a sequence of records:
//!
//! ```text
//! | doc_id: i32 | doc_no_len: varint | doc_no: UTF-8 | normalization: f64 |
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};
use crate::storage::structured::{StructReader, StructWriter, WrittenFile};
use crate::storage::{Storage, StorageOutput};

/// Catalog metadata for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Dense id assigned at ingestion.
    pub doc_id: i32,
    /// External document number used for display.
    pub doc_no: String,
    /// Document-length normalization factor.
    pub normalization: f64,
}

/// Immutable mapping from document id to [`CatalogEntry`].
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    entries: BTreeMap<i32, CatalogEntry>,
}

impl DocumentCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document. Each id may be registered once.
    pub fn insert(&mut self, doc_id: i32, doc_no: impl Into<String>, normalization: f64) -> Result<()> {
        if self.entries.contains_key(&doc_id) {
            return Err(PilumError::invalid_argument(format!(
                "document id {doc_id} registered twice"
            )));
        }
        self.entries.insert(
            doc_id,
            CatalogEntry {
                doc_id,
                doc_no: doc_no.into(),
                normalization,
            },
        );
        Ok(())
    }

    /// Resolve a document id.
    ///
    /// An id missing from the catalog means the index and catalog disagree.
    pub fn resolve(&self, doc_id: i32) -> Result<&CatalogEntry> {
        self.entries
            .get(&doc_id)
            .ok_or(PilumError::UnknownDocument(doc_id))
    }

    /// Whether the id is known.
    pub fn contains(&self, doc_id: i32) -> bool {
        self.entries.contains_key(&doc_id)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Serialize the catalog to `output`, in ascending id order.
    pub fn write<W: StorageOutput>(&self, output: W) -> Result<WrittenFile> {
        let mut writer = StructWriter::new(output);
        for entry in self.entries.values() {
            writer.write_i32(entry.doc_id)?;
            writer.write_string(&entry.doc_no)?;
            writer.write_f64(entry.normalization)?;
        }
        writer.close()
    }

    /// Load a catalog previously written with [`DocumentCatalog::write`].
    pub fn load(storage: &dyn Storage, name: &str) -> Result<Self> {
        let input = storage.open_input(name)?;
        let mut reader = StructReader::new(input)?;
        let mut catalog = DocumentCatalog::new();

        while !reader.is_eof() {
            let doc_id = reader.read_i32()?;
            let doc_no = reader.read_string()?;
            let normalization = reader.read_f64()?;
            catalog
                .insert(doc_id, doc_no, normalization)
                .map_err(|e| PilumError::corrupt_index(format!("catalog: {e}")))?;
        }

        reader.close()?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn sample() -> DocumentCatalog {
        let mut catalog = DocumentCatalog::new();
        catalog.insert(1, "DOC1", 2.0).unwrap();
        catalog.insert(2, "DOC2", 1.0).unwrap();
        catalog
    }

    #[test]
    fn test_resolve() {
        let catalog = sample();
        assert_eq!(catalog.resolve(1).unwrap().doc_no, "DOC1");
        assert_eq!(catalog.resolve(2).unwrap().normalization, 1.0);
        assert!(matches!(
            catalog.resolve(3),
            Err(PilumError::UnknownDocument(3))
        ));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut catalog = sample();
        assert!(catalog.insert(1, "DOC1-again", 1.0).is_err());
        assert_eq!(catalog.resolve(1).unwrap().doc_no, "DOC1");
    }

    #[test]
    fn test_write_and_load() {
        let storage = MemoryStorage::new_default();
        let catalog = sample();
        let output = storage.create_output("catalog.bin").unwrap();
        catalog.write(output).unwrap();

        let loaded = DocumentCatalog::load(&storage, "catalog.bin").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.iter().cloned().collect::<Vec<_>>(),
            catalog.iter().cloned().collect::<Vec<_>>()
        );
    }
}
