//! Sequence restoration (§4.5 step 3): advances each manifest sequence to
//! at least the dumped value, never rewinding a sequence that has already
//! moved further ahead (e.g. because the target database kept accepting
//! writes after the dump's snapshot was taken).

use slicedb_archive::{ArchiveReader, SequenceManifestEntry};
use slicedb_errors::{ObjectId, SliceError};
use tokio_postgres::Client;

pub async fn restore_sequence(
    client: &Client,
    reader: &mut ArchiveReader,
    sequence_id: &str,
    entry: &SequenceManifestEntry,
) -> Result<(), SliceError> {
    let Some(value) = reader.read_sequence_value(sequence_id)? else {
        return Ok(());
    };
    let quoted = format!("\"{}\".\"{}\"", entry.schema.replace('"', "\"\""), entry.name.replace('"', "\"\""));
    client
        .execute(
            &format!("SELECT setval('{quoted}', $1) FROM {quoted} WHERE last_value < $1"),
            &[&value],
        )
        .await
        .map_err(|e| SliceError::database(ObjectId::Sequence(sequence_id.to_string()), format!("setval failed: {e}")))?;
    Ok(())
}
