//! Snapshot pool (§4.2): an N-session pool where every session sees the
//! same exportable transactional snapshot. The leader opens the snapshot;
//! every follower imports it before being released to callers. The leader's
//! transaction is kept open for the pool's whole lifetime.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use slicedb_errors::{ObjectId, SliceError};
use slicedb_util::{LifoPermit, LifoSemaphore};
use tokio_postgres::{Client, NoTls};

use crate::config::ConnectionConfig;
use crate::session::{apply_leader_session_settings, apply_session_settings};

struct Session {
    client: Client,
}

/// An N-session pool sharing one exported snapshot. `sessions` also doubles
/// as the parallelism bound: only a task holding a session can do
/// heavyweight (database-touching) work.
pub struct SnapshotPool {
    sessions: Vec<Session>,
    semaphore: Arc<LifoSemaphore>,
    free: Mutex<VecDeque<usize>>,
}

impl SnapshotPool {
    /// Opens `session_count` sessions against `config`, all bound to one
    /// repeatable-read snapshot. Fails the whole operation if any session or
    /// the snapshot export/import fails — snapshot setup failures are fatal
    /// per §4.2.
    pub async fn open(config: &ConnectionConfig, session_count: usize) -> Result<Arc<SnapshotPool>, SliceError> {
        assert!(session_count >= 1, "a snapshot pool needs at least one session");

        let leader = connect(config).await?;
        leader
            .batch_execute("BEGIN ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("leader transaction start failed: {e}")))?;
        apply_leader_session_settings(&leader).await?;

        let row = leader
            .query_one("SELECT pg_export_snapshot()", &[])
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("snapshot export failed: {e}")))?;
        let snapshot_id: String = row.get(0);

        let mut sessions = Vec::with_capacity(session_count);
        sessions.push(Session { client: leader });

        for _ in 1..session_count {
            let client = connect(config).await?;
            client
                .batch_execute("BEGIN ISOLATION LEVEL REPEATABLE READ READ ONLY")
                .await
                .map_err(|e| SliceError::database(ObjectId::None, format!("follower transaction start failed: {e}")))?;
            client
                .batch_execute(&format!("SET TRANSACTION SNAPSHOT '{snapshot_id}'"))
                .await
                .map_err(|e| SliceError::database(ObjectId::None, format!("snapshot import failed: {e}")))?;
            apply_session_settings(&client).await?;
            sessions.push(Session { client });
        }

        let free = (0..session_count).collect();
        Ok(Arc::new(SnapshotPool {
            sessions,
            semaphore: Arc::new(LifoSemaphore::new(session_count)),
            free: Mutex::new(free),
        }))
    }

    /// Acquires one session, suspending until one is free. Returned guard
    /// releases the session (and the parallelism permit) back to the pool on
    /// drop.
    pub async fn acquire(self: &Arc<Self>) -> SnapshotSession {
        let permit = self.semaphore.acquire().await;
        let index = self
            .free
            .lock()
            .unwrap()
            .pop_front()
            .expect("a free session must exist whenever a permit was granted");
        SnapshotSession {
            pool: Arc::clone(self),
            index: Some(index),
            _permit: permit,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// A borrowed session, released back to the pool on drop.
pub struct SnapshotSession {
    pool: Arc<SnapshotPool>,
    index: Option<usize>,
    _permit: LifoPermit,
}

impl std::ops::Deref for SnapshotSession {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.pool.sessions[self.index.expect("session already released")].client
    }
}

impl Drop for SnapshotSession {
    fn drop(&mut self) {
        if let Some(index) = self.index.take() {
            self.pool.free.lock().unwrap().push_front(index);
        }
    }
}

async fn connect(config: &ConnectionConfig) -> Result<Client, SliceError> {
    let (client, connection) = config
        .to_tokio_config()
        .connect(NoTls)
        .await
        .map_err(|e| SliceError::database(ObjectId::None, format!("connection failed: {e}")))?;

    // tokio-postgres splits the client handle from the I/O driver; the
    // driver must be polled somewhere for the connection to make progress.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "database connection driver exited with an error");
        }
    });

    Ok(client)
}
