//! The archive's typed manifest (§3 "Manifest", §6 "Archive"): what tables,
//! segments, schema sections, and sequences the container holds, without
//! opening any of their entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slicedb_errors::SliceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentManifestEntry {
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableManifestEntry {
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    pub segments: Vec<SegmentManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceManifestEntry {
    pub schema: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSectionsManifest {
    pub pre_data: usize,
    pub post_data: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub tables: HashMap<String, TableManifestEntry>,
    #[serde(default)]
    pub sections: Option<SchemaSectionsManifest>,
    #[serde(default)]
    pub sequences: HashMap<String, SequenceManifestEntry>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String, SliceError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SliceError::io(slicedb_errors::ObjectId::None, std::io::Error::new(std::io::ErrorKind::Other, e)))
    }

    pub fn from_json(text: &str) -> Result<Manifest, SliceError> {
        serde_json::from_str(text)
            .map_err(|e| SliceError::io(slicedb_errors::ObjectId::None, std::io::Error::new(std::io::ErrorKind::Other, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut tables = HashMap::new();
        tables.insert(
            "customer".to_string(),
            TableManifestEntry {
                schema: "public".into(),
                name: "customer".into(),
                columns: vec!["id".into(), "name".into()],
                segments: vec![SegmentManifestEntry { row_count: 3 }],
            },
        );
        let manifest = Manifest {
            tables,
            sections: Some(SchemaSectionsManifest { pre_data: 2, post_data: 1 }),
            sequences: HashMap::new(),
        };
        let json = manifest.to_json().unwrap();
        let parsed = Manifest::from_json(&json).unwrap();
        assert_eq!(parsed.tables["customer"].segments[0].row_count, 3);
        assert_eq!(parsed.sections.unwrap().pre_data, 2);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"tables": {}, "extra": "ignored"}"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert!(manifest.tables.is_empty());
    }
}
