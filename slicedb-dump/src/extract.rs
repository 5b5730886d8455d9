//! Extracts a segment's own rows (§4.3.2 step 5-6): `COPY ... TO STDOUT`
//! into a temporary file, then either passes the bytes straight into the
//! archive or feeds them through the table's configured transform.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use futures_util::TryStreamExt;
use slicedb_archive::ArchiveWriter;
use slicedb_copy::{parse_row, serialize_row};
use slicedb_errors::{ObjectId, SliceError};
use slicedb_schema::Schema;
use slicedb_transform::TransformSet;
use tokio_postgres::Client;

use crate::query::extract_segment_sql;
use crate::subprocess::maybe_forked;

/// Runs the segment's extraction query against the temp-table-restricted
/// rows already loaded into `_slice_db` on `session`, transforms them if a
/// transform is registered for `table_id`, and writes the result as the
/// archive's `<table_id>/<index>.tsv` entry.
pub async fn extract_segment(
    schema: &Schema,
    session: &Client,
    table_id: &str,
    index: u32,
    transforms: Option<&Arc<TransformSet>>,
    fork_isolation: bool,
    archive: &ArchiveWriter,
) -> Result<(), SliceError> {
    let sql = extract_segment_sql(schema, table_id);
    let mut temp_file = tempfile::NamedTempFile::new()
        .map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?;

    let mut stream = session
        .copy_out(&sql)
        .await
        .map_err(|e| SliceError::database(ObjectId::Table(table_id.to_string()), format!("copy out failed: {e}")))?;
    while let Some(chunk) = stream
        .try_next()
        .await
        .map_err(|e| SliceError::database(ObjectId::Table(table_id.to_string()), format!("copy out failed: {e}")))?
    {
        temp_file
            .write_all(&chunk)
            .map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?;
    }
    temp_file
        .flush()
        .map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?;

    let has_transform = transforms
        .and_then(|set| set.table(table_id))
        .map(|t| !t.is_identity())
        .unwrap_or(false);

    let bytes = if !has_transform {
        std::fs::read(temp_file.path()).map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?
    } else {
        let transforms = Arc::clone(transforms.expect("has_transform implies transforms is Some"));
        let table_id_owned = table_id.to_string();
        let columns = schema
            .table(table_id)
            .expect("segment table resolves in the schema")
            .columns
            .clone();
        let path = temp_file.path().to_path_buf();

        let run = move || -> Result<Vec<u8>, SliceError> {
            transform_file(&path, &table_id_owned, &columns, &transforms)
        };

        if fork_isolation {
            maybe_forked(run)?
        } else {
            run()?
        }
    };

    archive.write_segment(table_id, index, &bytes)
}

/// Parses every line of `path` as a COPY-format row, applies `table_id`'s
/// transform to the targeted columns, and re-serialises (§4.4.4).
fn transform_file(
    path: &Path,
    table_id: &str,
    columns: &[String],
    transforms: &TransformSet,
) -> Result<Vec<u8>, SliceError> {
    let table_transformer = transforms
        .table(table_id)
        .expect("caller only invokes transform_file when a transform is registered");

    let file = std::fs::File::open(path).map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?;
    let reader = BufReader::new(file);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| SliceError::io(ObjectId::Table(table_id.to_string()), e))?;
        let mut row = parse_row(&line, table_id)?;
        table_transformer.apply(table_id, columns, &mut row)?;
        out.extend_from_slice(serialize_row(&row).as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}
