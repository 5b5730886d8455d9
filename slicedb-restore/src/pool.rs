//! Restore session pool (§4.5): unlike the dump side's [`SnapshotPool`],
//! restore sessions share no snapshot. They may, however, share a single
//! logical transaction when the caller asks for deferred constraints — in
//! that mode the pool degenerates to one connection and `RestoreItem`s
//! serialise on it, since Postgres has no notion of one transaction spread
//! across connections.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use slicedb_db::ConnectionConfig;
use slicedb_errors::{ObjectId, SliceError};
use slicedb_util::{LifoPermit, LifoSemaphore};
use tokio_postgres::{Client, NoTls};

struct Session {
    client: Client,
}

pub struct RestorePool {
    sessions: Vec<Session>,
    semaphore: Arc<LifoSemaphore>,
    free: Mutex<VecDeque<usize>>,
    in_transaction: bool,
}

impl RestorePool {
    /// Opens `session_count` independent connections. When `in_transaction`
    /// is set, `session_count` must be 1 (see module docs) and the caller is
    /// responsible for issuing `BEGIN`/`COMMIT` around the restore.
    pub async fn open(config: &ConnectionConfig, session_count: usize, in_transaction: bool) -> Result<Arc<RestorePool>, SliceError> {
        assert!(session_count >= 1, "a restore pool needs at least one session");
        if in_transaction {
            assert_eq!(session_count, 1, "a shared transaction requires exactly one session");
        }

        let mut sessions = Vec::with_capacity(session_count);
        for _ in 0..session_count {
            sessions.push(Session { client: connect(config).await? });
        }

        let free = (0..session_count).collect();
        Ok(Arc::new(RestorePool {
            sessions,
            semaphore: Arc::new(LifoSemaphore::new(session_count)),
            free: Mutex::new(free),
            in_transaction,
        }))
    }

    pub async fn acquire(self: &Arc<Self>) -> RestoreSession {
        let permit = self.semaphore.acquire().await;
        let index = self
            .free
            .lock()
            .unwrap()
            .pop_front()
            .expect("a free session must exist whenever a permit was granted");
        RestoreSession {
            pool: Arc::clone(self),
            index: Some(index),
            _permit: permit,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

pub struct RestoreSession {
    pool: Arc<RestorePool>,
    index: Option<usize>,
    _permit: LifoPermit,
}

impl std::ops::Deref for RestoreSession {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.pool.sessions[self.index.expect("session already released")].client
    }
}

impl Drop for RestoreSession {
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

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "database connection driver exited with an error");
        }
    });

    Ok(client)
}
