//! Posting-list store.
//!
//! The store is a flat sequence of fixed-width records with no header and no
//! padding:
//!
//! ```text
//! +-------------+--------------------+
//! | doc_id: i32 | term_frequency: i32|   8 bytes, little-endian
//! +-------------+--------------------+
//! ```
//!
//! A term's list is `document_frequency` consecutive records starting at the
//! byte offset recorded in its lexicon entry.

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};
use crate::storage::structured::{StructReader, StructWriter, WrittenFile};
use crate::storage::{StorageInput, StorageOutput};

/// Size in bytes of one encoded [`Posting`].
pub const POSTING_SIZE: u64 = 8;

/// A single (document, term frequency) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Dense document id assigned at ingestion.
    pub doc_id: i32,
    /// Number of occurrences of the term in the document.
    pub term_frequency: i32,
}

impl Posting {
    /// Create a new posting.
    pub fn new(doc_id: i32, term_frequency: i32) -> Self {
        Posting {
            doc_id,
            term_frequency,
        }
    }
}

/// Byte length of a posting list holding `count` records.
pub fn list_bytes(count: u64) -> u64 {
    count * POSTING_SIZE
}

/// Append-only writer for the posting-list store.
pub struct PostingWriter<W: StorageOutput> {
    writer: StructWriter<W>,
    postings_written: u64,
}

impl<W: StorageOutput> PostingWriter<W> {
    /// Create a writer over a freshly truncated output.
    pub fn new(output: W) -> Self {
        PostingWriter {
            writer: StructWriter::new(output),
            postings_written: 0,
        }
    }

    /// Append a posting list and return the byte offset of its first record.
    ///
    /// The offset is the cumulative number of bytes written before this list.
    pub fn write_list(&mut self, postings: &[Posting]) -> Result<u64> {
        let offset = self.writer.position();
        for posting in postings {
            self.writer.write_i32(posting.doc_id)?;
            self.writer.write_i32(posting.term_frequency)?;
        }
        self.postings_written += postings.len() as u64;
        debug_assert_eq!(
            self.writer.position(),
            list_bytes(self.postings_written),
            "posting store must stay record aligned"
        );
        Ok(offset)
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.writer.position()
    }

    /// Number of postings written so far.
    pub fn postings_written(&self) -> u64 {
        self.postings_written
    }

    /// Flush and close the store.
    pub fn close(self) -> Result<WrittenFile> {
        self.writer.close()
    }
}

/// Random-access reader for the posting-list store.
///
/// Each reader owns its own input handle; queries never share a cursor.
pub struct PostingReader<R: StorageInput> {
    reader: StructReader<R>,
}

impl<R: StorageInput> PostingReader<R> {
    /// Wrap an input opened on the posting-list store.
    pub fn new(input: R) -> Result<Self> {
        Ok(PostingReader {
            reader: StructReader::new(input)?,
        })
    }

    /// Size of the underlying store in bytes.
    pub fn size(&self) -> u64 {
        self.reader.size()
    }

    /// Read exactly `count` postings starting at `byte_offset`.
    ///
    /// Fails with [`PilumError::CorruptIndex`] if the range is not fully
    /// contained in the store. Nothing beyond the declared range is read.
    pub fn read_postings(&mut self, byte_offset: u64, count: u64) -> Result<Vec<Posting>> {
        let end = byte_offset
            .checked_add(list_bytes(count))
            .ok_or_else(|| PilumError::corrupt_index("posting range overflows"))?;
        if end > self.reader.size() {
            return Err(PilumError::corrupt_index(format!(
                "posting list [{byte_offset}, {end}) exceeds store of {} bytes ({} records declared, {} available)",
                self.reader.size(),
                count,
                self.reader.size().saturating_sub(byte_offset) / POSTING_SIZE
            )));
        }

        self.reader.seek(byte_offset)?;
        let mut postings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let doc_id = self.reader.read_i32()?;
            let term_frequency = self.reader.read_i32()?;
            postings.push(Posting {
                doc_id,
                term_frequency,
            });
        }

        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    fn write_lists(storage: &MemoryStorage, lists: &[Vec<Posting>]) -> Vec<u64> {
        let output = storage.create_output("postings.bin").unwrap();
        let mut writer = PostingWriter::new(output);
        let offsets = lists.iter().map(|l| writer.write_list(l).unwrap()).collect();
        writer.close().unwrap();
        offsets
    }

    #[test]
    fn test_offsets_are_cumulative_bytes() {
        let storage = MemoryStorage::new_default();
        let offsets = write_lists(
            &storage,
            &[
                vec![Posting::new(1, 3)],
                vec![Posting::new(1, 1), Posting::new(2, 5)],
                vec![Posting::new(300, 70_000)],
            ],
        );

        assert_eq!(offsets, vec![0, 8, 24]);
        assert_eq!(storage.file_size("postings.bin").unwrap(), 32);
    }

    #[test]
    fn test_read_postings() {
        let storage = MemoryStorage::new_default();
        let offsets = write_lists(
            &storage,
            &[
                vec![Posting::new(1, 3)],
                vec![Posting::new(1, 1), Posting::new(2, 5)],
            ],
        );

        let input = storage.open_input("postings.bin").unwrap();
        let mut reader = PostingReader::new(input).unwrap();

        assert_eq!(
            reader.read_postings(offsets[1], 2).unwrap(),
            vec![Posting::new(1, 1), Posting::new(2, 5)]
        );
        assert_eq!(
            reader.read_postings(offsets[0], 1).unwrap(),
            vec![Posting::new(1, 3)]
        );
        assert!(reader.read_postings(24, 0).unwrap().is_empty());
    }

    #[test]
    fn test_short_list_is_corrupt() {
        let storage = MemoryStorage::new_default();
        write_lists(&storage, &[vec![Posting::new(1, 1), Posting::new(2, 2)]]);

        let input = storage.open_input("postings.bin").unwrap();
        let mut reader = PostingReader::new(input).unwrap();

        assert!(matches!(
            reader.read_postings(8, 2),
            Err(PilumError::CorruptIndex(_))
        ));
        assert!(matches!(
            reader.read_postings(64, 1),
            Err(PilumError::CorruptIndex(_))
        ));
    }
}
