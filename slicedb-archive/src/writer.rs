//! Writes the archive container: one ZIP file with `manifest.json`, per-
//! segment TSV entries, optional DDL section entries, and optional sequence
//! sidecar files (§6 "Archive (container format)").
//!
//! The writer is shared across concurrently extracting tasks, so its
//! container file handle is guarded by a single mutex; the lock is held only
//! around one entry's lifecycle (open/write/close), not per byte, matching
//! §5's "Shared resources" note on the archive writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use slicedb_errors::{ObjectId, SliceError};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::manifest::Manifest;

pub struct ArchiveWriter {
    zip: Mutex<ZipWriter<File>>,
}

fn io_err(object: ObjectId, message: impl std::fmt::Display) -> SliceError {
    SliceError::io(object, std::io::Error::new(std::io::ErrorKind::Other, message.to_string()))
}

impl ArchiveWriter {
    pub fn create(path: &Path) -> Result<ArchiveWriter, SliceError> {
        let file = File::create(path).map_err(|e| SliceError::io(ObjectId::None, e))?;
        Ok(ArchiveWriter {
            zip: Mutex::new(ZipWriter::new(file)),
        })
    }

    fn write_entry(&self, name: &str, bytes: &[u8], large: bool) -> Result<(), SliceError> {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(large);
        let mut zip = self.zip.lock().unwrap();
        zip.start_file(name, options)
            .map_err(|e| io_err(ObjectId::None, e))?;
        zip.write_all(bytes).map_err(|e| SliceError::io(ObjectId::None, e))
    }

    /// Writes one 1-indexed table segment entry (`<table-id>/<n>.tsv`).
    /// `force_zip64` (`large_file`) is always enabled, matching §6's note
    /// that segment entries may exceed the normal ZIP size threshold.
    pub fn write_segment(&self, table_id: &str, index: u32, bytes: &[u8]) -> Result<(), SliceError> {
        self.write_entry(&format!("{table_id}/{index}.tsv"), bytes, true)
    }

    /// Writes one 1-indexed DDL statement entry under `pre-data/` or
    /// `post-data/`.
    pub fn write_schema_statement(&self, section: Section, index: u32, statement: &str) -> Result<(), SliceError> {
        self.write_entry(&format!("{}/{index}.sql", section.dir_name()), statement.as_bytes(), false)
    }

    /// Writes a sequence's sidecar value file (`<sequence-id>.txt`).
    pub fn write_sequence_value(&self, sequence_id: &str, value: i64) -> Result<(), SliceError> {
        self.write_entry(&format!("{sequence_id}.txt"), value.to_string().as_bytes(), false)
    }

    /// Seals the archive: writes `manifest.json` last and finalises the ZIP
    /// central directory. Consumes the writer — no further entries may be
    /// added once the manifest is sealed.
    pub fn finish(self, manifest: &Manifest) -> Result<(), SliceError> {
        let json = manifest.to_json()?;
        self.write_entry("manifest.json", json.as_bytes(), false)?;
        let mut zip = self.zip.into_inner().unwrap();
        zip.finish().map_err(|e| io_err(ObjectId::None, e))?;
        Ok(())
    }
}

/// Which half of the DDL a statement belongs to (§4.3.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    PreData,
    PostData,
}

impl Section {
    pub fn dir_name(self) -> &'static str {
        match self {
            Section::PreData => "pre-data",
            Section::PostData => "post-data",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ArchiveReader;

    #[test]
    fn writes_and_reads_back_segments_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.zip");

        let writer = ArchiveWriter::create(&path).unwrap();
        writer.write_segment("customer", 1, b"1\tAlice\n2\tBob\n").unwrap();
        writer
            .write_schema_statement(Section::PreData, 1, "CREATE TABLE customer (id int)")
            .unwrap();
        writer.write_sequence_value("customer_id_seq", 42).unwrap();

        let mut manifest = Manifest::default();
        manifest.tables.insert(
            "customer".to_string(),
            crate::manifest::TableManifestEntry {
                schema: "public".into(),
                name: "customer".into(),
                columns: vec!["id".into(), "name".into()],
                segments: vec![crate::manifest::SegmentManifestEntry { row_count: 2 }],
            },
        );
        writer.finish(&manifest).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        let read_manifest = reader.read_manifest().unwrap();
        assert_eq!(read_manifest.tables["customer"].segments[0].row_count, 2);

        let segment = reader.read_segment("customer", 1).unwrap();
        assert_eq!(segment, b"1\tAlice\n2\tBob\n");

        let statement = reader.read_schema_statement(Section::PreData, 1).unwrap();
        assert_eq!(statement, "CREATE TABLE customer (id int)");

        let seq_value = reader.read_sequence_value("customer_id_seq").unwrap();
        assert_eq!(seq_value, Some(42));
    }
}
