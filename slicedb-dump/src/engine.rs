//! The traversal engine (§4.3): `RootTask` seeds each root's matching rows,
//! `TableTask` walks the reference graph outward from one segment,
//! discovering and extracting as it goes. Both task types share a
//! [`DumpContext`] that owns every piece of state the engine mutates.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use itertools::Itertools;
use slicedb_archive::ArchiveWriter;
use slicedb_db::SnapshotPool;
use slicedb_errors::{ObjectId, SliceError};
use slicedb_schema::{Direction, Reference, ReferenceId, Root, Schema, TableId, TableSegment};
use slicedb_transform::TransformSet;
use slicedb_util::{partition_into_segments, RowId, TaskJoin};
use tokio_postgres::Client;

use crate::extract::extract_segment;
use crate::manifest_builder::ManifestBuilder;
use crate::query::{
    analyze_temp_table_sql, build_discovery_query, create_temp_table_sql, insert_row_ids_sql, root_query_sql,
    truncate_temp_table_sql,
};
use crate::state::DumpState;

/// Shared, immutable-after-construction state every task needs; the mutable
/// parts (`state`, `manifest`) are internally synchronised so tasks can hold
/// just an `Arc<DumpContext>` each.
pub struct DumpContext {
    pub schema: Arc<Schema>,
    pub pool: Arc<SnapshotPool>,
    pub archive: Arc<ArchiveWriter>,
    pub manifest: Arc<ManifestBuilder>,
    pub state: Arc<DumpState>,
    pub transforms: Option<Arc<TransformSet>>,
    pub task_join: Arc<TaskJoin>,
    pub fork_isolation: bool,
}

/// `RootTask` (§4.3.1): finds a root's matching rows, partitions the novel
/// ones into segments, and spawns one `TableTask` per segment.
pub async fn run_root_task(ctx: Arc<DumpContext>, root: Root) -> Result<(), SliceError> {
    let session = ctx.pool.acquire().await;
    let sql = root_query_sql(&ctx.schema, &root.table, &root.condition);
    let rows = session
        .query(&sql, &[])
        .await
        .map_err(|e| SliceError::database(ObjectId::Table(root.table.clone()), format!("root query failed: {e}")))?;
    drop(session);

    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows {
        let text: String = row.get(0);
        ids.push(RowId::from_ctid_text(&text, &root.table)?);
    }

    spawn_segments_for_novel_ids(&ctx, &root.table, &ids).await?;
    Ok(())
}

/// Splits `ids` into the novel subset, assigns each resulting chunk the next
/// segment index for `table_id`, records it in the manifest, and spawns a
/// `TableTask` for each onto the shared `TaskJoin`.
async fn spawn_segments_for_novel_ids(ctx: &Arc<DumpContext>, table_id: &str, ids: &[RowId]) -> Result<(), SliceError> {
    spawn_segments(ctx, table_id, ids, None).await
}

async fn spawn_segments(
    ctx: &Arc<DumpContext>,
    table_id: &str,
    ids: &[RowId],
    arrived_via: Option<(ReferenceId, Direction)>,
) -> Result<(), SliceError> {
    let novel = ctx.state.admit(table_id, ids);
    if novel.is_empty() {
        return Ok(());
    }

    for chunk in partition_into_segments(&novel) {
        let index = ctx.state.next_segment_index(table_id);
        ctx.manifest.record_segment(&ctx.schema, table_id, index, chunk.len());
        let segment = TableSegment {
            table: table_id.to_string(),
            index,
            row_ids: chunk,
        };
        let task_ctx = Arc::clone(ctx);
        let task_arrived_via = arrived_via.clone();
        ctx.task_join
            .spawn(async move { run_table_task(task_ctx, segment, task_arrived_via).await })
            .await;
    }
    Ok(())
}

/// `TableTask` (§4.3.1, §4.3.2): discovers the opposite side of every
/// eligible reference, then extracts the segment's own rows. Recursive
/// (child segments spawn further `TableTask`s), so the body is boxed.
pub fn run_table_task(
    ctx: Arc<DumpContext>,
    segment: TableSegment,
    arrived_via: Option<(ReferenceId, Direction)>,
) -> BoxFuture<'static, Result<(), SliceError>> {
    async move {
        let session = ctx.pool.acquire().await;

        session
            .batch_execute(&create_temp_table_sql())
            .await
            .map_err(|e| SliceError::database(ObjectId::Table(segment.table.clone()), format!("temp table setup failed: {e}")))?;
        session
            .batch_execute(&truncate_temp_table_sql())
            .await
            .map_err(|e| SliceError::database(ObjectId::Table(segment.table.clone()), format!("temp table truncate failed: {e}")))?;

        let literals: Vec<String> = segment.row_ids.iter().map(|id| id.to_ctid_literal()).collect();
        session
            .batch_execute(&insert_row_ids_sql(&literals))
            .await
            .map_err(|e| SliceError::database(ObjectId::Table(segment.table.clone()), format!("temp table insert failed: {e}")))?;
        session
            .batch_execute(&analyze_temp_table_sql())
            .await
            .map_err(|e| SliceError::database(ObjectId::Table(segment.table.clone()), format!("temp table analyze failed: {e}")))?;

        discover_neighbors(&ctx, &session, &segment, arrived_via.as_ref()).await?;

        extract_segment(
            &ctx.schema,
            &session,
            &segment.table,
            segment.index,
            ctx.transforms.as_ref(),
            ctx.fork_isolation,
            &ctx.archive,
        )
        .await?;

        Ok(())
    }
    .boxed()
}

/// One eligible candidate to discover: the reference, the direction we'd
/// traverse it in, and the table on the opposite side (used only to order
/// discovery by that table's estimated row count — §4.3.2 step 4).
struct Candidate<'a> {
    reference: &'a Reference,
    direction: Direction,
    opposite_table: &'a TableId,
}

async fn discover_neighbors(
    ctx: &Arc<DumpContext>,
    session: &Client,
    segment: &TableSegment,
    arrived_via: Option<&(ReferenceId, Direction)>,
) -> Result<(), SliceError> {
    let table = ctx
        .schema
        .table(&segment.table)
        .expect("segment table resolves in the schema");

    let mut candidates = Vec::new();
    for reference_id in &table.references {
        let reference = ctx.schema.reference(reference_id).expect("reference resolves");
        candidates.push(Candidate {
            reference,
            direction: Direction::Forward,
            opposite_table: &reference.reference_table,
        });
    }
    for reference_id in &table.reverse_references {
        let reference = ctx.schema.reference(reference_id).expect("reference resolves");
        candidates.push(Candidate {
            reference,
            direction: Direction::Reverse,
            opposite_table: &reference.table,
        });
    }

    let arrived = arrived_via.map(|(id, dir)| (id, *dir));
    let eligible: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| {
            c.direction
                .eligible(c.reference.directions, arrived.map(|(id, dir)| (id, dir)), &c.reference.id)
        })
        .sorted_by_key(|c| ctx.state.row_count_estimate(c.opposite_table))
        .collect();

    for candidate in eligible {
        let sql = build_discovery_query(&ctx.schema, candidate.reference, candidate.direction);
        let rows = session.query(&sql, &[]).await.map_err(|e| {
            SliceError::database(
                ObjectId::Reference(candidate.reference.id.clone()),
                format!("discovery query failed: {e}"),
            )
        })?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let text: String = row.get(0);
            ids.push(RowId::from_ctid_text(&text, candidate.opposite_table)?);
        }

        spawn_segments(
            ctx,
            candidate.opposite_table,
            &ids,
            Some((candidate.reference.id.clone(), candidate.direction)),
        )
        .await?;
    }

    Ok(())
}
