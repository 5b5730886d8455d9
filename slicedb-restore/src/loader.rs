//! `RestoreItem` (§4.5 step 6-7): one table's segments, loaded in order via
//! bulk `COPY ... FROM STDIN`, after every non-deferrable parent table has
//! finished loading.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::SinkExt;
use slicedb_archive::{ArchiveReader, TableManifestEntry};
use slicedb_errors::{ObjectId, SliceError};
use slicedb_util::TaskJoin;
use tokio::sync::{watch, Mutex};

use crate::graph::DependencyGraph;
use crate::pool::RestorePool;

/// Coordination shared by every `RestoreItem`: a `watch` channel per table
/// that flips to `true` once that table's own load has finished, so
/// dependents can wait on it without racing a signal sent before they
/// started watching.
pub struct RestoreCoordinator {
    done_rx: HashMap<String, watch::Receiver<bool>>,
    done_tx: HashMap<String, watch::Sender<bool>>,
}

impl RestoreCoordinator {
    pub fn new<I: IntoIterator<Item = String>>(table_ids: I) -> RestoreCoordinator {
        let mut done_rx = HashMap::new();
        let mut done_tx = HashMap::new();
        for id in table_ids {
            let (tx, rx) = watch::channel(false);
            done_tx.insert(id.clone(), tx);
            done_rx.insert(id, rx);
        }
        RestoreCoordinator { done_rx, done_tx }
    }

    async fn wait_for(&self, table_id: &str) -> Result<(), SliceError> {
        let mut rx = self
            .done_rx
            .get(table_id)
            .expect("parent table id resolves in the manifest")
            .clone();
        while !*rx.borrow() {
            rx.changed()
                .await
                .map_err(|_| SliceError::database(ObjectId::Table(table_id.to_string()), "parent load was cancelled".to_string()))?;
        }
        Ok(())
    }

    fn mark_done(&self, table_id: &str) {
        let _ = self.done_tx.get(table_id).expect("table id resolves").send(true);
    }
}

/// Runs one table's `RestoreItem`: waits for its non-deferrable parents,
/// then streams each segment through a bulk `COPY ... FROM STDIN` in
/// segment-index order.
pub async fn run_restore_item(
    pool: Arc<RestorePool>,
    reader: Arc<Mutex<ArchiveReader>>,
    coordinator: Arc<RestoreCoordinator>,
    graph: Arc<DependencyGraph>,
    table_id: String,
    entry: TableManifestEntry,
) -> Result<(), SliceError> {
    for parent in graph.parents_of(&table_id) {
        coordinator.wait_for(&parent).await?;
    }

    let session = pool.acquire().await;
    let quoted_columns = entry.columns.iter().map(|c| format!("\"{}\"", c.replace('"', "\"\""))).collect::<Vec<_>>().join(", ");
    let quoted_table = format!("\"{}\".\"{}\"", entry.schema.replace('"', "\"\""), entry.name.replace('"', "\"\""));
    let copy_sql = format!("COPY {quoted_table} ({quoted_columns}) FROM STDIN");

    for (zero_based, _segment) in entry.segments.iter().enumerate() {
        let index = (zero_based + 1) as u32;
        let bytes = {
            let mut reader = reader.lock().await;
            reader.read_segment(&table_id, index)?
        };

        let mut sink = session.copy_in(&copy_sql).await.map_err(|e| {
            SliceError::database(ObjectId::Segment(table_id.clone(), index), format!("copy in failed to start: {e}"))
        })?;
        sink.send(Bytes::from(bytes))
            .await
            .map_err(|e| SliceError::database(ObjectId::Segment(table_id.clone(), index), format!("copy in failed: {e}")))?;
        sink.close()
            .await
            .map_err(|e| SliceError::database(ObjectId::Segment(table_id.clone(), index), format!("copy in failed to finish: {e}")))?;
    }

    coordinator.mark_done(&table_id);
    Ok(())
}

/// Spawns one `RestoreItem` per manifest table onto `task_join`.
pub async fn spawn_restore_items(
    pool: Arc<RestorePool>,
    reader: Arc<Mutex<ArchiveReader>>,
    coordinator: Arc<RestoreCoordinator>,
    graph: Arc<DependencyGraph>,
    task_join: &TaskJoin,
    tables: HashMap<String, TableManifestEntry>,
) {
    for (table_id, entry) in tables {
        let pool = Arc::clone(&pool);
        let reader = Arc::clone(&reader);
        let coordinator = Arc::clone(&coordinator);
        let graph = Arc::clone(&graph);
        task_join
            .spawn(async move { run_restore_item(pool, reader, coordinator, graph, table_id, entry).await })
            .await;
    }
}
