//! Per-session configuration applied on acquisition (§5, §6): timeouts are
//! disabled so the operator, not the server, controls how long a dump or
//! restore runs.

use slicedb_errors::{ObjectId, SliceError};
use tokio_postgres::Client;

const FOLLOWER_SETTINGS: &str = "\
    SET lock_timeout = 0; \
    SET statement_timeout = 0; \
    SET row_security = off; \
    SET search_path = '';";

const LEADER_EXTRA_SETTINGS: &str = "SET idle_in_transaction_session_timeout = 0;";

/// Applies the settings every session needs regardless of role.
pub async fn apply_session_settings(client: &Client) -> Result<(), SliceError> {
    client
        .batch_execute(FOLLOWER_SETTINGS)
        .await
        .map_err(|e| SliceError::database(ObjectId::None, format!("session setup failed: {e}")))
}

/// Applies the extra setting only the leader session of a snapshot pool
/// needs: its transaction stays open for the whole dump, so its idle-in-
/// transaction timeout must not fire.
pub async fn apply_leader_session_settings(client: &Client) -> Result<(), SliceError> {
    apply_session_settings(client).await?;
    client
        .batch_execute(LEADER_EXTRA_SETTINGS)
        .await
        .map_err(|e| SliceError::database(ObjectId::None, format!("leader session setup failed: {e}")))
}
