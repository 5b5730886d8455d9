//! Live foreign-key discovery (§4.5 step 4): queries `pg_constraint` for
//! every foreign key whose endpoints are both tables present in the
//! manifest, matched by `(schema, name)` rather than by any id the archive
//! itself assigns.

use std::collections::HashMap;

use slicedb_archive::Manifest;
use slicedb_errors::{ObjectId, SliceError};
use tokio_postgres::Client;

/// One live foreign key relevant to this restore: the constraint's own
/// name (needed to `SET CONSTRAINTS <name> DEFERRED`), the manifest table
/// ids on either end, and whether Postgres considers it deferrable.
#[derive(Debug, Clone)]
pub struct LiveConstraint {
    pub name: String,
    pub from_table: String,
    pub to_table: String,
    pub deferrable: bool,
}

const QUERY: &str = "
    SELECT
        con.conname,
        ns1.nspname, cl1.relname,
        ns2.nspname, cl2.relname,
        con.condeferrable
    FROM pg_constraint con
    JOIN pg_class cl1 ON cl1.oid = con.conrelid
    JOIN pg_namespace ns1 ON ns1.oid = cl1.relnamespace
    JOIN pg_class cl2 ON cl2.oid = con.confrelid
    JOIN pg_namespace ns2 ON ns2.oid = cl2.relnamespace
    WHERE con.contype = 'f'
";

pub async fn discover_constraints(client: &Client, manifest: &Manifest) -> Result<Vec<LiveConstraint>, SliceError> {
    let mut table_by_schema_name: HashMap<(String, String), String> = HashMap::with_capacity(manifest.tables.len());
    for (table_id, entry) in &manifest.tables {
        table_by_schema_name.insert((entry.schema.clone(), entry.name.clone()), table_id.clone());
    }

    let rows = client
        .query(QUERY, &[])
        .await
        .map_err(|e| SliceError::database(ObjectId::None, format!("failed to query live foreign keys: {e}")))?;

    let mut constraints = Vec::new();
    for row in &rows {
        let name: String = row.get(0);
        let from_schema: String = row.get(1);
        let from_name: String = row.get(2);
        let to_schema: String = row.get(3);
        let to_name: String = row.get(4);
        let deferrable: bool = row.get(5);

        let from_table = table_by_schema_name.get(&(from_schema, from_name));
        let to_table = table_by_schema_name.get(&(to_schema, to_name));
        let (Some(from_table), Some(to_table)) = (from_table, to_table) else {
            continue;
        };

        constraints.push(LiveConstraint {
            name,
            from_table: from_table.clone(),
            to_table: to_table.clone(),
            deferrable,
        });
    }

    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicedb_archive::TableManifestEntry;
    use std::collections::HashMap as StdHashMap;

    fn manifest_with_two_tables() -> Manifest {
        let mut tables = StdHashMap::new();
        tables.insert(
            "orders".to_string(),
            TableManifestEntry {
                schema: "public".into(),
                name: "orders".into(),
                columns: vec!["id".into()],
                segments: vec![],
            },
        );
        tables.insert(
            "customers".to_string(),
            TableManifestEntry {
                schema: "public".into(),
                name: "customers".into(),
                columns: vec!["id".into()],
                segments: vec![],
            },
        );
        Manifest {
            tables,
            sections: None,
            sequences: StdHashMap::new(),
        }
    }

    #[test]
    fn matches_are_keyed_by_schema_and_name_not_archive_ids() {
        let manifest = manifest_with_two_tables();
        let mut by_schema_name: HashMap<(String, String), String> = HashMap::new();
        for (table_id, entry) in &manifest.tables {
            by_schema_name.insert((entry.schema.clone(), entry.name.clone()), table_id.clone());
        }
        assert_eq!(by_schema_name.get(&("public".to_string(), "orders".to_string())), Some(&"orders".to_string()));
    }
}
