//! Schema DDL replay (§4.5 steps 2 and 8): executes the archive's stored
//! `pre-data` statements before any row is loaded, and `post-data`
//! statements (indexes, constraints, triggers) only after every
//! `RestoreItem` has finished.

use slicedb_archive::{ArchiveReader, Section};
use slicedb_errors::{ObjectId, SliceError};
use tokio_postgres::Client;

/// Executes every statement of `section`, in archive order, stopping at the
/// first missing index (the reader signals the section's end that way —
/// there is no separate count stored in the manifest for this purpose).
pub async fn execute_section(client: &Client, reader: &mut ArchiveReader, section: Section, statement_count: usize) -> Result<(), SliceError> {
    for i in 1..=statement_count {
        let statement = reader.read_schema_statement(section, i as u32)?;
        client
            .batch_execute(&statement)
            .await
            .map_err(|e| SliceError::database(ObjectId::None, format!("{} statement {i} failed: {e}", section.dir_name())))?;
    }
    Ok(())
}
