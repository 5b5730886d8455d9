//! Accumulates the archive's manifest during a dump (§3 "Manifest" /
//! §5 "Shared resources": "Manifest accumulator — mutex-guarded; updated on
//! each `add` that yielded novelty").

use std::collections::HashMap;
use std::sync::Mutex;

use slicedb_archive::{Manifest, SchemaSectionsManifest, SegmentManifestEntry, SequenceManifestEntry, TableManifestEntry};
use slicedb_schema::Schema;

struct TableAcc {
    schema: String,
    name: String,
    columns: Vec<String>,
    segments: HashMap<u32, SegmentManifestEntry>,
}

#[derive(Default)]
pub struct ManifestBuilder {
    tables: Mutex<HashMap<String, TableAcc>>,
    sequences: Mutex<HashMap<String, SequenceManifestEntry>>,
    sections: Mutex<Option<SchemaSectionsManifest>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        ManifestBuilder::default()
    }

    /// Records one segment's row count. Segment indices may be recorded out
    /// of creation order across tables, but never out of order within a
    /// table's own assignment sequence — see §4.3.4.
    pub fn record_segment(&self, schema: &Schema, table_id: &str, index: u32, row_count: usize) {
        let table = schema.table(table_id).expect("segment for unknown table");
        let mut tables = self.tables.lock().unwrap();
        let acc = tables.entry(table_id.to_string()).or_insert_with(|| TableAcc {
            schema: table.schema.clone(),
            name: table.name.clone(),
            columns: table.columns.clone(),
            segments: HashMap::new(),
        });
        acc.segments.insert(index, SegmentManifestEntry { row_count });
    }

    pub fn record_sequence(&self, sequence_id: &str, schema: &str, name: &str) {
        self.sequences.lock().unwrap().insert(
            sequence_id.to_string(),
            SequenceManifestEntry {
                schema: schema.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub fn record_sections(&self, pre_data: usize, post_data: usize) {
        *self.sections.lock().unwrap() = Some(SchemaSectionsManifest { pre_data, post_data });
    }

    pub fn build(self) -> Manifest {
        let mut tables = HashMap::new();
        for (table_id, acc) in self.tables.into_inner().unwrap() {
            let mut indices: Vec<u32> = acc.segments.keys().copied().collect();
            indices.sort_unstable();
            let segments = indices
                .into_iter()
                .map(|i| acc.segments[&i].clone())
                .collect();
            tables.insert(
                table_id,
                TableManifestEntry {
                    schema: acc.schema,
                    name: acc.name,
                    columns: acc.columns,
                    segments,
                },
            );
        }
        Manifest {
            tables,
            sections: self.sections.into_inner().unwrap(),
            sequences: self.sequences.into_inner().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicedb_schema::SchemaConfig;
    use std::collections::HashMap as StdHashMap;

    fn sample_schema() -> Schema {
        let mut tables = StdHashMap::new();
        tables.insert(
            "customer".to_string(),
            slicedb_schema::TableConfig {
                schema: "public".into(),
                name: "customer".into(),
                columns: vec!["id".into()],
                sequences: vec![],
            },
        );
        Schema::from_config(SchemaConfig {
            references: StdHashMap::new(),
            sequences: StdHashMap::new(),
            tables,
        })
        .unwrap()
    }

    #[test]
    fn accumulates_segments_in_index_order_regardless_of_arrival_order() {
        let schema = sample_schema();
        let builder = ManifestBuilder::new();
        builder.record_segment(&schema, "customer", 2, 5);
        builder.record_segment(&schema, "customer", 1, 10);
        let manifest = builder.build();
        let segments = &manifest.tables["customer"].segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].row_count, 10);
        assert_eq!(segments[1].row_count, 5);
    }
}
