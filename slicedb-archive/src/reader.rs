//! Reads entries back out of the archive container (§6). `zip::ZipArchive`
//! needs `&mut self` to read an entry, so callers needing concurrent access
//! (the restore scheduler's parallel per-table loaders) wrap this behind
//! their own mutex rather than this crate assuming a particular concurrency
//! model.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use slicedb_errors::{ObjectId, SliceError};
use zip::ZipArchive;

use crate::manifest::Manifest;
use crate::writer::Section;

pub struct ArchiveReader {
    zip: ZipArchive<File>,
}

impl ArchiveReader {
    pub fn open(path: &Path) -> Result<ArchiveReader, SliceError> {
        let file = File::open(path).map_err(|e| SliceError::io(ObjectId::None, e))?;
        let zip = ZipArchive::new(file)
            .map_err(|e| SliceError::io(ObjectId::None, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        Ok(ArchiveReader { zip })
    }

    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, SliceError> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(SliceError::io(
                    ObjectId::None,
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                ))
            }
        };
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(|e| SliceError::io(ObjectId::None, e))?;
        Ok(Some(bytes))
    }

    pub fn read_manifest(&mut self) -> Result<Manifest, SliceError> {
        let bytes = self.read_entry("manifest.json")?.ok_or_else(|| {
            SliceError::configuration(ObjectId::None, "archive is missing manifest.json".to_string())
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SliceError::data(ObjectId::None, format!("manifest.json is not UTF-8: {e}")))?;
        Manifest::from_json(&text)
    }

    pub fn read_segment(&mut self, table_id: &str, index: u32) -> Result<Vec<u8>, SliceError> {
        self.read_entry(&format!("{table_id}/{index}.tsv"))?.ok_or_else(|| {
            SliceError::configuration(
                ObjectId::Segment(table_id.to_string(), index),
                "segment entry missing from archive".to_string(),
            )
        })
    }

    pub fn read_schema_statement(&mut self, section: Section, index: u32) -> Result<String, SliceError> {
        let bytes = self
            .read_entry(&format!("{}/{index}.sql", section.dir_name()))?
            .ok_or_else(|| {
                SliceError::configuration(ObjectId::None, format!("missing {}/{index}.sql", section.dir_name()))
            })?;
        String::from_utf8(bytes).map_err(|e| SliceError::data(ObjectId::None, format!("statement is not UTF-8: {e}")))
    }

    pub fn read_sequence_value(&mut self, sequence_id: &str) -> Result<Option<i64>, SliceError> {
        let Some(bytes) = self.read_entry(&format!("{sequence_id}.txt"))? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes)
            .map_err(|e| SliceError::data(ObjectId::None, format!("sequence value is not UTF-8: {e}")))?;
        text.trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| SliceError::data(ObjectId::Sequence(sequence_id.to_string()), format!("not a decimal value: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ArchiveWriter;

    #[test]
    fn missing_segment_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.zip");
        let writer = ArchiveWriter::create(&path).unwrap();
        writer.finish(&Manifest::default()).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        let err = reader.read_segment("customer", 1).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn missing_sequence_value_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.zip");
        let writer = ArchiveWriter::create(&path).unwrap();
        writer.finish(&Manifest::default()).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.read_sequence_value("nope").unwrap(), None);
    }
}
