//! Orchestrates one slice dump end to end (§3, §4): opens a shared-snapshot
//! session pool, estimates row counts, walks the reference graph outward
//! from each configured root, then (optionally) appends schema DDL and
//! reachable sequence values before sealing the archive.

pub mod ddl_tool;
pub mod engine;
pub mod extract;
pub mod manifest_builder;
pub mod query;
pub mod row_counts;
pub mod sections;
pub mod sequences;
pub mod state;
pub mod subprocess;

use std::path::Path;
use std::sync::Arc;

use slicedb_archive::ArchiveWriter;
use slicedb_db::{ConnectionConfig, SnapshotPool};
use slicedb_errors::SliceError;
use slicedb_schema::{Root, Schema};
use slicedb_transform::TransformSet;
use slicedb_util::TaskJoin;
use tracing::info;

use crate::ddl_tool::{DdlProvider, PgDumpTool};
use crate::engine::{run_root_task, DumpContext};
use crate::manifest_builder::ManifestBuilder;
use crate::row_counts::estimate_row_counts;
use crate::sections::dump_schema_sections;
use crate::sequences::dump_reachable_sequences;
use crate::state::DumpState;

/// Everything the caller (CLI) chooses: where the output goes, which rows
/// to start from, how many sessions to parallelise over, and the optional
/// transform/schema/fork settings.
pub struct DumpOptions {
    pub output_path: std::path::PathBuf,
    pub roots: Vec<Root>,
    pub jobs: usize,
    pub transforms: Option<Arc<TransformSet>>,
    pub include_schema: bool,
    pub fork_isolation: bool,
}

/// Runs a complete dump against `connection`, writing the resulting archive
/// to `options.output_path`. Any failure anywhere in the traversal, the
/// schema dump, or the sequence dump aborts the whole operation — no
/// partial archive is sealed.
pub async fn run_dump(connection: ConnectionConfig, schema: Arc<Schema>, options: DumpOptions) -> Result<(), SliceError> {
    info!(jobs = options.jobs, roots = options.roots.len(), "starting dump");

    let pool = SnapshotPool::open(&connection, options.jobs.max(1)).await?;
    let row_count_estimates = {
        let session = pool.acquire().await;
        estimate_row_counts(&session, &schema).await?
    };

    let state = Arc::new(DumpState::new(&schema, row_count_estimates));
    let archive = Arc::new(ArchiveWriter::create(&options.output_path)?);
    let manifest = Arc::new(ManifestBuilder::new());
    let task_join = Arc::new(TaskJoin::new());

    let ctx = Arc::new(DumpContext {
        schema: Arc::clone(&schema),
        pool: Arc::clone(&pool),
        archive: Arc::clone(&archive),
        manifest: Arc::clone(&manifest),
        state: Arc::clone(&state),
        transforms: options.transforms.clone(),
        task_join: Arc::clone(&task_join),
        fork_isolation: options.fork_isolation,
    });

    for root in options.roots {
        let root_ctx = Arc::clone(&ctx);
        task_join.spawn(async move { run_root_task(root_ctx, root).await }).await;
    }
    drop(ctx);
    task_join.join().await?;

    if options.include_schema {
        let ddl: Arc<dyn DdlProvider> = Arc::new(PgDumpTool::new(connection));
        dump_schema_sections(ddl, Arc::clone(&archive), Arc::clone(&manifest)).await?;
    }

    dump_reachable_sequences(&schema, &state, &pool, &archive, &manifest).await?;

    info!("traversal complete, sealing archive");
    let manifest = Arc::try_unwrap(manifest)
        .unwrap_or_else(|_| panic!("manifest still shared after all tasks joined"))
        .build();
    let archive = Arc::try_unwrap(archive).unwrap_or_else(|_| panic!("archive still shared after all tasks joined"));
    archive.finish(&manifest)?;

    info!(path = %options.output_path.display(), "dump complete");
    Ok(())
}

/// Convenience wrapper over [`run_dump`] for a single `(table, condition)`
/// root with no transform — used by integration tests and the CLI's
/// simplest invocation shape.
pub async fn run_dump_single_root(
    connection: ConnectionConfig,
    schema: Arc<Schema>,
    table: impl Into<String>,
    condition: impl Into<String>,
    output_path: impl AsRef<Path>,
) -> Result<(), SliceError> {
    run_dump(
        connection,
        schema,
        DumpOptions {
            output_path: output_path.as_ref().to_path_buf(),
            roots: vec![Root {
                table: table.into(),
                condition: condition.into(),
            }],
            jobs: 1,
            transforms: None,
            include_schema: false,
            fork_isolation: false,
        },
    )
    .await
}
