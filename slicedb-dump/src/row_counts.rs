//! One-time approximate row count lookup (§4.3.2 step 4: "sorted by the
//! row-count of the opposite table ascending"). Uses `pg_class.reltuples`,
//! the planner's own estimate, rather than `COUNT(*)`, since the ordering
//! only needs to be roughly right and a full count over every table would
//! itself be an expensive sequential scan.

use std::collections::HashMap;

use slicedb_errors::{ObjectId, SliceError};
use slicedb_schema::{Schema, TableId};
use tokio_postgres::Client;

pub async fn estimate_row_counts(client: &Client, schema: &Schema) -> Result<HashMap<TableId, i64>, SliceError> {
    let mut counts = HashMap::with_capacity(schema.tables().count());
    for table in schema.tables() {
        let row = client
            .query_one(
                "SELECT reltuples::bigint FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE n.nspname = $1 AND c.relname = $2",
                &[&table.schema, &table.name],
            )
            .await
            .map_err(|e| {
                SliceError::database(
                    ObjectId::Table(table.id.clone()),
                    format!("failed to estimate row count: {e}"),
                )
            })?;
        let estimate: i64 = row.get(0);
        counts.insert(table.id.clone(), estimate.max(0));
    }
    Ok(counts)
}
