//! Lexicon store.
//!
//! One record per indexed term, no header:
//!
//! ```text
//! +----------------+------------+-------------------------+------------------+
//! | term_len varint| term UTF-8 | document_frequency: i32 | byte_offset: i64 |
//! +----------------+------------+-------------------------+------------------+
//! ```
//!
//! The lexicon is small relative to the posting store, so the reader loads it
//! whole into a hash map; posting lists stay on disk until a query needs them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};
use crate::index::posting::list_bytes;
use crate::storage::structured::{StructReader, StructWriter, WrittenFile};
use crate::storage::{Storage, StorageOutput};

/// Where a term's posting list lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// The normalized term.
    pub term: String,
    /// Number of postings in the term's list.
    pub document_frequency: i32,
    /// Absolute byte offset of the first posting in the posting-list store.
    pub byte_offset: i64,
}

impl LexiconEntry {
    /// Offset as an unsigned file position.
    pub fn offset(&self) -> u64 {
        self.byte_offset as u64
    }

    /// Number of postings as an unsigned count.
    pub fn count(&self) -> u64 {
        self.document_frequency as u64
    }

    /// One past the last byte of this term's posting list.
    pub fn end(&self) -> u64 {
        self.offset() + list_bytes(self.count())
    }
}

/// Sequential writer for the lexicon store.
pub struct LexiconWriter<W: StorageOutput> {
    writer: StructWriter<W>,
    entries_written: usize,
}

impl<W: StorageOutput> LexiconWriter<W> {
    /// Create a writer over a freshly truncated output.
    pub fn new(output: W) -> Self {
        LexiconWriter {
            writer: StructWriter::new(output),
            entries_written: 0,
        }
    }

    /// Append one lexicon record.
    pub fn write_entry(&mut self, entry: &LexiconEntry) -> Result<()> {
        self.writer.write_string(&entry.term)?;
        self.writer.write_i32(entry.document_frequency)?;
        self.writer.write_i64(entry.byte_offset)?;
        self.entries_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Flush and close the store.
    pub fn close(self) -> Result<WrittenFile> {
        self.writer.close()
    }
}

/// The decoded lexicon, keyed by term.
#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    entries: AHashMap<String, LexiconEntry>,
}

impl LexiconStore {
    /// Read every record of the lexicon file `name`.
    pub fn open(storage: &dyn Storage, name: &str) -> Result<Self> {
        let input = storage.open_input(name)?;
        let mut reader = StructReader::new(input)?;
        let mut entries = AHashMap::new();

        while !reader.is_eof() {
            let record_start = reader.position();
            let term = reader.read_string()?;
            let document_frequency = reader.read_i32()?;
            let byte_offset = reader.read_i64()?;

            if document_frequency < 0 || byte_offset < 0 {
                return Err(PilumError::corrupt_index(format!(
                    "lexicon record at byte {record_start} for '{term}' has df={document_frequency}, offset={byte_offset}"
                )));
            }

            let entry = LexiconEntry {
                term: term.clone(),
                document_frequency,
                byte_offset,
            };
            if entries.insert(term, entry).is_some() {
                return Err(PilumError::corrupt_index(format!(
                    "duplicate lexicon record at byte {record_start}"
                )));
            }
        }

        reader.close()?;
        Ok(LexiconStore { entries })
    }

    /// Look up a term. Absent terms were never indexed; that is not an error.
    pub fn lookup(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.get(term)
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon holds no terms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use std::io::Write;

    fn entry(term: &str, df: i32, offset: i64) -> LexiconEntry {
        LexiconEntry {
            term: term.to_string(),
            document_frequency: df,
            byte_offset: offset,
        }
    }

    #[test]
    fn test_write_and_lookup() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("lexicon.bin").unwrap();
        let mut writer = LexiconWriter::new(output);
        writer.write_entry(&entry("cat", 2, 0)).unwrap();
        writer.write_entry(&entry("naïve", 1, 16)).unwrap();
        assert_eq!(writer.entries_written(), 2);
        let written = writer.close().unwrap();

        // "cat": 1 + 3 + 4 + 8, "naïve": 1 + 6 + 4 + 8
        assert_eq!(written.bytes, 16 + 19);

        let lexicon = LexiconStore::open(&storage, "lexicon.bin").unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.lookup("cat"), Some(&entry("cat", 2, 0)));
        assert_eq!(lexicon.lookup("naïve").unwrap().end(), 24);
        assert!(lexicon.lookup("dog").is_none());
    }

    #[test]
    fn test_empty_lexicon() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("lexicon.bin").unwrap();
        LexiconWriter::new(output).close().unwrap();

        let lexicon = LexiconStore::open(&storage, "lexicon.bin").unwrap();
        assert!(lexicon.is_empty());
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("lexicon.bin").unwrap();
        let mut writer = LexiconWriter::new(output);
        writer.write_entry(&entry("cat", 2, 0)).unwrap();
        writer.close().unwrap();

        let bytes = storage.read_all("lexicon.bin").unwrap();
        let mut output = storage.create_output("lexicon.bin").unwrap();
        output.write_all(&bytes[..bytes.len() - 3]).unwrap();
        output.close().unwrap();

        assert!(matches!(
            LexiconStore::open(&storage, "lexicon.bin"),
            Err(PilumError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_negative_frequency_is_corrupt() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("lexicon.bin").unwrap();
        let mut writer = LexiconWriter::new(output);
        writer.write_entry(&entry("cat", -1, 0)).unwrap();
        writer.close().unwrap();

        assert!(matches!(
            LexiconStore::open(&storage, "lexicon.bin"),
            Err(PilumError::CorruptIndex(_))
        ));
    }
}
