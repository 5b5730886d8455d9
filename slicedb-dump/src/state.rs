//! Per-dump mutable state the traversal engine owns exclusively (§3
//! "Ownership"): one [`slicedb_util::RowIdSet`] per table plus the
//! per-table segment-index counter that makes segment numbering monotonic
//! in creation order (§4.3.4). Lives only for the duration of one dump.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use slicedb_schema::{Schema, TableId};
use slicedb_util::{RowId, RowIdSet};

struct TableState {
    row_ids: RowIdSet,
    next_segment_index: AtomicU32,
}

/// Owns every table's [`RowIdSet`] and segment-index counter for the
/// lifetime of a single dump.
pub struct DumpState {
    tables: HashMap<TableId, TableState>,
    row_count_estimates: Mutex<HashMap<TableId, i64>>,
}

impl DumpState {
    pub fn new(schema: &Schema, row_count_estimates: HashMap<TableId, i64>) -> DumpState {
        let tables = schema
            .tables()
            .map(|table| {
                (
                    table.id.clone(),
                    TableState {
                        row_ids: RowIdSet::new(),
                        next_segment_index: AtomicU32::new(1),
                    },
                )
            })
            .collect();
        DumpState {
            tables,
            row_count_estimates: Mutex::new(row_count_estimates),
        }
    }

    fn table(&self, table_id: &str) -> &TableState {
        self.tables.get(table_id).expect("table id resolves in the schema")
    }

    /// Adds candidate ids to `table_id`'s set, returning the novel subset.
    pub fn admit(&self, table_id: &str, candidates: &[RowId]) -> Vec<RowId> {
        self.table(table_id).row_ids.add(candidates)
    }

    /// Number of distinct rows admitted so far for `table_id`.
    pub fn row_count(&self, table_id: &str) -> usize {
        self.table(table_id).row_ids.len()
    }

    /// Claims the next 1-indexed segment slot for `table_id`.
    pub fn next_segment_index(&self, table_id: &str) -> u32 {
        self.table(table_id).next_segment_index.fetch_add(1, Ordering::SeqCst)
    }

    /// The planner's row-count estimate for a table, used only to order
    /// discovery queries by the opposite table's size (§4.3.2 step 4).
    pub fn row_count_estimate(&self, table_id: &str) -> i64 {
        self.row_count_estimates.lock().unwrap().get(table_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn schema_with_one_table() -> Schema {
        let mut tables = StdHashMap::new();
        tables.insert(
            "t".to_string(),
            slicedb_schema::TableConfig {
                schema: "public".into(),
                name: "t".into(),
                columns: vec!["id".into()],
                sequences: vec![],
            },
        );
        Schema::from_config(slicedb_schema::SchemaConfig {
            references: StdHashMap::new(),
            sequences: StdHashMap::new(),
            tables,
        })
        .unwrap()
    }

    #[test]
    fn segment_indices_are_monotonic_per_table() {
        let schema = schema_with_one_table();
        let state = DumpState::new(&schema, StdHashMap::new());
        assert_eq!(state.next_segment_index("t"), 1);
        assert_eq!(state.next_segment_index("t"), 2);
        assert_eq!(state.next_segment_index("t"), 3);
    }

    #[test]
    fn admit_deduplicates_against_table_state() {
        let schema = schema_with_one_table();
        let state = DumpState::new(&schema, StdHashMap::new());
        let ids = vec![RowId::from_packed(1, "t").unwrap(), RowId::from_packed(2, "t").unwrap()];
        assert_eq!(state.admit("t", &ids).len(), 2);
        assert_eq!(state.admit("t", &ids).len(), 0);
        assert_eq!(state.row_count("t"), 2);
    }
}
