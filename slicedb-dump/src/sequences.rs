//! Sequence discovery (§4.3.5): after all row traversal completes, every
//! sequence reachable via a discovered table is read once and written to the
//! archive as a sidecar value. Run after traversal rather than during it, so
//! (per §9's open question) long-running dumps capture each sequence's
//! `last_value` later than the snapshot — acceptable because restore's
//! `setval` is monotonic, never rewinding.

use std::collections::HashSet;
use std::sync::Arc;

use slicedb_archive::ArchiveWriter;
use slicedb_db::SnapshotPool;
use slicedb_errors::{ObjectId, SliceError};
use slicedb_schema::Schema;

use crate::manifest_builder::ManifestBuilder;
use crate::state::DumpState;

/// Reads and records every sequence owned by a table that ended up with at
/// least one row in the slice.
pub async fn dump_reachable_sequences(
    schema: &Schema,
    state: &DumpState,
    pool: &Arc<SnapshotPool>,
    archive: &ArchiveWriter,
    manifest: &ManifestBuilder,
) -> Result<(), SliceError> {
    let mut sequence_ids = HashSet::new();
    for table in schema.tables() {
        if state.row_count(&table.id) == 0 {
            continue;
        }
        sequence_ids.extend(table.sequences.iter().cloned());
    }
    if sequence_ids.is_empty() {
        return Ok(());
    }

    let session = pool.acquire().await;
    for sequence_id in sequence_ids {
        let sequence = schema
            .sequence(&sequence_id)
            .expect("manifest-reachable sequence resolves in the schema");
        let row = session
            .query_one(&format!("SELECT last_value FROM {}", sequence.quoted_name()), &[])
            .await
            .map_err(|e| {
                SliceError::database(ObjectId::Sequence(sequence_id.clone()), format!("failed to read last_value: {e}"))
            })?;
        let value: i64 = row.get(0);
        manifest.record_sequence(&sequence_id, &sequence.schema, &sequence.name);
        archive.write_sequence_value(&sequence_id, value)?;
    }
    Ok(())
}
