//! Structured file I/O for binary data serialization.
//!
//! All fixed-width values are little-endian. Strings carry a varint length
//! prefix. The writer keeps a running byte position and CRC32 so callers can
//! record exact offsets and checksums without re-reading the file.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{PilumError, Result};
use crate::storage::{StorageInput, StorageOutput};
use crate::util::varint::{decode_u64, encode_u64};

/// Size and checksum of a fully written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenFile {
    /// Total bytes written.
    pub bytes: u64,
    /// CRC32 of everything written.
    pub checksum: u32,
}

/// A structured file writer for binary data.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: crc32fast::Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    /// Create a new structured file writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: crc32fast::Hasher::new(),
            position: 0,
        }
    }

    /// Write a i32 value (little-endian).
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.writer.write_i32::<LittleEndian>(value)?;
        self.advance(&value.to_le_bytes());
        Ok(())
    }

    /// Write a i64 value (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.writer.write_i64::<LittleEndian>(value)?;
        self.advance(&value.to_le_bytes());
        Ok(())
    }

    /// Write a f64 value (little-endian).
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.writer.write_f64::<LittleEndian>(value)?;
        self.advance(&value.to_le_bytes());
        Ok(())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let encoded = encode_u64(value);
        self.writer.write_all(&encoded)?;
        self.advance(&encoded);
        Ok(())
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as u64)?;
        self.writer.write_all(bytes)?;
        self.advance(bytes);
        Ok(())
    }

    /// Get current file position.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn advance(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Flush, sync and close the writer.
    pub fn close(mut self) -> Result<WrittenFile> {
        self.writer.close()?;
        Ok(WrittenFile {
            bytes: self.position,
            checksum: self.hasher.finalize(),
        })
    }
}

/// A structured file reader for binary data.
///
/// Running out of bytes mid-value is reported as [`PilumError::CorruptIndex`]:
/// every reader in this crate consumes files whose extent is declared
/// elsewhere, so a short read means the file does not match its metadata.
pub struct StructReader<R: StorageInput> {
    reader: R,
    position: u64,
    file_size: u64,
}

impl<R: StorageInput> StructReader<R> {
    /// Create a new structured file reader.
    pub fn new(reader: R) -> Result<Self> {
        let file_size = reader.size()?;
        Ok(StructReader {
            reader,
            position: 0,
            file_size,
        })
    }

    /// Seek to an absolute byte offset.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.file_size {
            return Err(PilumError::corrupt_index(format!(
                "seek to byte {offset} beyond end of file ({} bytes)",
                self.file_size
            )));
        }
        self.reader.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Read a i32 value (little-endian).
    pub fn read_i32(&mut self) -> Result<i32> {
        let value = self.reader.read_i32::<LittleEndian>();
        let value = self.check(value, 4)?;
        self.position += 4;
        Ok(value)
    }

    /// Read a i64 value (little-endian).
    pub fn read_i64(&mut self) -> Result<i64> {
        let value = self.reader.read_i64::<LittleEndian>();
        let value = self.check(value, 8)?;
        self.position += 8;
        Ok(value)
    }

    /// Read a f64 value (little-endian).
    pub fn read_f64(&mut self) -> Result<f64> {
        let value = self.reader.read_f64::<LittleEndian>();
        let value = self.check(value, 8)?;
        self.position += 8;
        Ok(value)
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.reader.read_u8();
            let byte = self.check(byte, 1)?;
            bytes.push(byte);
            if byte & 0x80 == 0 || bytes.len() > 10 {
                break;
            }
        }

        let (value, _) = decode_u64(&bytes)?;
        self.position += bytes.len() as u64;
        Ok(value)
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_varint()?;
        if length > self.remaining() {
            return Err(PilumError::corrupt_index(format!(
                "string of {length} bytes at byte {} exceeds end of file",
                self.position
            )));
        }

        let mut bytes = vec![0u8; length as usize];
        let read = self.reader.read_exact(&mut bytes);
        self.check(read, length)?;
        self.position += length;

        String::from_utf8(bytes)
            .map_err(|e| PilumError::corrupt_index(format!("Invalid UTF-8: {e}")))
    }

    /// Get current file position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get file size.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// Bytes left between the current position and end of file.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.position)
    }

    /// Check if we're at end of file.
    pub fn is_eof(&self) -> bool {
        self.position >= self.file_size
    }

    /// Close the reader.
    pub fn close(mut self) -> Result<()> {
        self.reader.close()
    }

    fn check<T>(&self, result: io::Result<T>, wanted: u64) -> Result<T> {
        result.map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                PilumError::corrupt_index(format!(
                    "unexpected end of file reading {wanted} bytes at byte {}",
                    self.position
                ))
            } else {
                PilumError::Io(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_struct_writer_reader() {
        let storage = MemoryStorage::new_default();

        let written = {
            let output = storage.create_output("test.struct").unwrap();
            let mut writer = StructWriter::new(output);

            writer.write_i32(-7).unwrap();
            writer.write_i64(9_876_543_210).unwrap();
            writer.write_f64(std::f64::consts::E).unwrap();
            writer.write_varint(300).unwrap();
            writer.write_string("Hello, World!").unwrap();
            assert_eq!(writer.position(), 4 + 8 + 8 + 2 + 1 + 13);

            writer.close().unwrap()
        };
        assert_eq!(written.bytes, 36);
        assert_eq!(storage.file_size("test.struct").unwrap(), 36);

        let bytes = storage.read_all("test.struct").unwrap();
        assert_eq!(written.checksum, crc32fast::hash(&bytes));

        let input = storage.open_input("test.struct").unwrap();
        let mut reader = StructReader::new(input).unwrap();

        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_i64().unwrap(), 9_876_543_210);
        assert!((reader.read_f64().unwrap() - std::f64::consts::E).abs() < 1e-12);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_string().unwrap(), "Hello, World!");
        assert!(reader.is_eof());
        reader.close().unwrap();
    }

    #[test]
    fn test_little_endian_layout() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("le").unwrap();
        let mut writer = StructWriter::new(output);
        writer.write_i32(1).unwrap();
        writer.close().unwrap();

        assert_eq!(storage.read_all("le").unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_short_read_is_corrupt() {
        let storage = MemoryStorage::new_default();
        let mut output = storage.create_output("short").unwrap();
        output.write_all(&[1, 2, 3]).unwrap();
        output.close().unwrap();

        let input = storage.open_input("short").unwrap();
        let mut reader = StructReader::new(input).unwrap();
        assert!(matches!(reader.read_i32(), Err(PilumError::CorruptIndex(_))));
    }

    #[test]
    fn test_seek_beyond_end() {
        let storage = MemoryStorage::new_default();
        let mut output = storage.create_output("tiny").unwrap();
        output.write_all(&[0u8; 8]).unwrap();
        output.close().unwrap();

        let input = storage.open_input("tiny").unwrap();
        let mut reader = StructReader::new(input).unwrap();
        reader.seek(8).unwrap();
        assert!(reader.is_eof());
        assert!(matches!(reader.seek(9), Err(PilumError::CorruptIndex(_))));
    }

    #[test]
    fn test_oversized_string_length() {
        let storage = MemoryStorage::new_default();
        let output = storage.create_output("str").unwrap();
        let mut writer = StructWriter::new(output);
        writer.write_varint(1_000).unwrap();
        writer.close().unwrap();

        let input = storage.open_input("str").unwrap();
        let mut reader = StructReader::new(input).unwrap();
        assert!(matches!(
            reader.read_string(),
            Err(PilumError::CorruptIndex(_))
        ));
    }
}
