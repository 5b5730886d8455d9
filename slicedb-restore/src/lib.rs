//! Orchestrates one slice restore end to end (§4.5): replays `pre-data`
//! DDL, advances sequences, discovers the live foreign-key graph, loads
//! every manifest table under dependency order with deferrable constraints
//! set aside, then replays `post-data` DDL.

pub mod constraints;
pub mod ddl;
pub mod graph;
pub mod loader;
pub mod pool;
pub mod sequences;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use slicedb_archive::{ArchiveReader, Section};
use slicedb_db::ConnectionConfig;
use slicedb_errors::{ObjectId, SliceError};
use slicedb_util::TaskJoin;
use tokio::sync::Mutex;
use tracing::info;

use crate::constraints::discover_constraints;
use crate::ddl::execute_section;
use crate::graph::DependencyGraph;
use crate::loader::{spawn_restore_items, RestoreCoordinator};
use crate::pool::RestorePool;
use crate::sequences::restore_sequence;

pub struct RestoreOptions {
    pub archive_path: PathBuf,
    pub jobs: usize,
    /// When set, every session shares a single transaction (forcing `jobs`
    /// to 1), enabling deferrable constraints to be deferred rather than
    /// rejected with [`SliceError::Configuration`].
    pub transaction: bool,
}

/// Runs a complete restore from `options.archive_path` against `connection`.
/// Any failure aborts the whole operation; nothing is retried.
pub async fn run_restore(connection: ConnectionConfig, options: RestoreOptions) -> Result<(), SliceError> {
    let jobs = if options.transaction { 1 } else { options.jobs.max(1) };
    let pool = RestorePool::open(&connection, jobs, options.transaction).await?;
    let leader = pool.acquire().await;

    if options.transaction {
        leader
            .batch_execute("BEGIN")
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("failed to start restore transaction: {e}")))?;
    }

    let mut reader = ArchiveReader::open(&options.archive_path)?;
    let manifest = reader.read_manifest()?;
    info!(tables = manifest.tables.len(), "restoring archive");

    if let Some(sections) = &manifest.sections {
        execute_section(&leader, &mut reader, Section::PreData, sections.pre_data).await?;
    }

    for (sequence_id, entry) in &manifest.sequences {
        restore_sequence(&leader, &mut reader, sequence_id, entry).await?;
    }

    let live_constraints = discover_constraints(&leader, &manifest).await?;

    let mut deferred_names = Vec::new();
    let mut dag_edges = Vec::new();
    for constraint in &live_constraints {
        if constraint.deferrable {
            if !options.transaction {
                return Err(SliceError::configuration(
                    ObjectId::Constraint(constraint.name.clone()),
                    "deferrable constraint requires restoring inside a single transaction".to_string(),
                ));
            }
            deferred_names.push(constraint.name.clone());
        } else {
            dag_edges.push((constraint.to_table.clone(), constraint.from_table.clone()));
        }
    }

    if !deferred_names.is_empty() {
        let quoted = deferred_names
            .iter()
            .map(|n| format!("\"{}\"", n.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(", ");
        leader
            .batch_execute(&format!("SET CONSTRAINTS {quoted} DEFERRED"))
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("failed to defer constraints: {e}")))?;
    }

    let graph = Arc::new(DependencyGraph::build(manifest.tables.keys().cloned(), &dag_edges));
    graph.check_acyclic()?;

    drop(leader);

    let reader = Arc::new(Mutex::new(reader));
    let coordinator = Arc::new(RestoreCoordinator::new(manifest.tables.keys().cloned()));
    let task_join = Arc::new(TaskJoin::new());

    let tables: HashMap<String, _> = manifest.tables.clone();
    spawn_restore_items(
        Arc::clone(&pool),
        Arc::clone(&reader),
        Arc::clone(&coordinator),
        Arc::clone(&graph),
        &task_join,
        tables,
    )
    .await;
    task_join.join().await?;

    if let Some(sections) = &manifest.sections {
        let post_leader = pool.acquire().await;
        let mut reader = reader.lock().await;
        execute_section(&post_leader, &mut reader, Section::PostData, sections.post_data).await?;
    }

    if options.transaction {
        let leader = pool.acquire().await;
        leader
            .batch_execute("COMMIT")
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("failed to commit restore transaction: {e}")))?;
    }

    info!("restore complete");
    Ok(())
}
