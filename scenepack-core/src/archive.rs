//! Bundle container
//!
//! Thin wrappers around the `zip` crate: a writer that accumulates named
//! entries in insertion order and finalizes to an in-memory buffer, and a
//! reader that extracts entries by name. Entry order is whatever the
//! caller added, which keeps bundles reproducible for golden comparisons.

use std::io::{Cursor, Read, Write};

use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Incremental bundle writer.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add a named entry with the given contents.
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    /// Finish the bundle and hand back the buffer.
    pub fn finalize(mut self) -> Result<Vec<u8>, ArchiveError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader over a finished bundle buffer.
pub struct ArchiveReader {
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl ArchiveReader {
    pub fn open(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let zip = ZipArchive::new(Cursor::new(bytes.to_vec()))?;
        Ok(Self { zip })
    }

    /// Read an entry by name; absent entries are `None`, not errors.
    pub fn read_entry(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut file = self.zip.by_name(name).ok()?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes).ok()?;
        Some(bytes)
    }

    /// Entry names in archive order.
    pub fn entry_names(&mut self) -> Vec<String> {
        (0..self.zip.len())
            .filter_map(|i| self.zip.by_index(i).ok().map(|f| f.name().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_entries() {
        let mut writer = ArchiveWriter::new();
        writer.add_entry("movie.xml", b"<film/>").unwrap();
        writer.add_entry("thumbnail.png", &[0x89, 0x50, 0x4E, 0x47]).unwrap();
        let buffer = writer.finalize().unwrap();

        let mut reader = ArchiveReader::open(&buffer).unwrap();
        assert_eq!(reader.read_entry("movie.xml").as_deref(), Some(b"<film/>".as_slice()));
        assert_eq!(
            reader.read_entry("thumbnail.png").as_deref(),
            Some([0x89, 0x50, 0x4E, 0x47].as_slice())
        );
        assert_eq!(reader.read_entry("missing.xml"), None);
    }

    #[test]
    fn test_empty_bundle_opens() {
        let buffer = ArchiveWriter::new().finalize().unwrap();
        let mut reader = ArchiveReader::open(&buffer).unwrap();
        assert!(reader.entry_names().is_empty());
        assert_eq!(reader.read_entry("anything"), None);
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(ArchiveReader::open(b"definitely not a zip").is_err());
    }
}
