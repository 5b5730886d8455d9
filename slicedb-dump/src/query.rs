//! Builds the SQL the per-segment discovery protocol needs (§4.3.2): the
//! temp-table bootstrap statements and the join query for one eligible
//! reference in one direction.

use slicedb_schema::{Direction, Reference, Schema};

pub const TEMP_TABLE: &str = "_slice_db";

pub fn create_temp_table_sql() -> String {
    format!("CREATE TEMP TABLE IF NOT EXISTS {TEMP_TABLE} (tid tid) ON COMMIT DELETE ROWS")
}

pub fn truncate_temp_table_sql() -> String {
    format!("TRUNCATE {TEMP_TABLE}")
}

pub fn analyze_temp_table_sql() -> String {
    format!("ANALYZE {TEMP_TABLE}")
}

/// Builds `INSERT INTO _slice_db VALUES ('(1,2)'::tid), ('(3,4)'::tid), ...`
/// for a batch of row-id literals. The literals are our own packed ids, not
/// user input, so inlining them is safe.
pub fn insert_row_ids_sql(ctid_literals: &[String]) -> String {
    let values = ctid_literals
        .iter()
        .map(|lit| format!("('{lit}'::tid)"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {TEMP_TABLE} (tid) VALUES {values}")
}

/// Builds the join query that discovers the opposite side of `reference` in
/// `direction`, restricted to the current segment via `_slice_db`.
///
/// FORWARD: segment table is the reference's source (child); discovers the
/// referenced (parent) rows, de-duplicated since many children can share one
/// parent. REVERSE: segment table is the reference's target (parent);
/// discovers dependent (child) rows.
pub fn build_discovery_query(schema: &Schema, reference: &Reference, direction: Direction) -> String {
    match direction {
        Direction::Forward => {
            let from_table = schema.table(&reference.table).expect("reference endpoint resolves");
            let to_table = schema
                .table(&reference.reference_table)
                .expect("reference endpoint resolves");
            let join_cond = join_condition("f", &reference.columns, "t", &reference.reference_columns);
            format!(
                "SELECT DISTINCT t.ctid::text FROM {} t JOIN {} f ON {} JOIN {TEMP_TABLE} s ON f.ctid = s.tid",
                to_table.quoted_name(),
                from_table.quoted_name(),
                join_cond,
            )
        }
        Direction::Reverse => {
            let child_table = schema.table(&reference.table).expect("reference endpoint resolves");
            let parent_table = schema
                .table(&reference.reference_table)
                .expect("reference endpoint resolves");
            let join_cond = join_condition("c", &reference.columns, "p", &reference.reference_columns);
            format!(
                "SELECT c.ctid::text FROM {} c JOIN {} p ON {} JOIN {TEMP_TABLE} s ON p.ctid = s.tid",
                child_table.quoted_name(),
                parent_table.quoted_name(),
                join_cond,
            )
        }
    }
}

fn join_condition(left_alias: &str, left_cols: &[String], right_alias: &str, right_cols: &[String]) -> String {
    left_cols
        .iter()
        .zip(right_cols.iter())
        .map(|(l, r)| format!("{left_alias}.\"{l}\" = {right_alias}.\"{r}\""))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// The root discovery query (§4.3.1): `ORDER BY ctid` makes segment
/// partitioning deterministic across runs over an unchanged table.
pub fn root_query_sql(schema: &Schema, table_id: &str, condition: &str) -> String {
    let table = schema.table(table_id).expect("root table resolves");
    format!(
        "SELECT ctid::text FROM {} WHERE {} ORDER BY ctid",
        table.quoted_name(),
        condition,
    )
}

/// The extraction query for a segment's own rows (§4.3.2 step 5).
pub fn extract_segment_sql(schema: &Schema, table_id: &str) -> String {
    let table = schema.table(table_id).expect("segment table resolves");
    format!(
        "COPY (SELECT {} FROM {} WHERE ctid = ANY(SELECT tid FROM {TEMP_TABLE})) TO STDOUT",
        table.quoted_columns().join(", "),
        table.quoted_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicedb_schema::SchemaConfig;
    use std::collections::HashMap;

    fn sample_schema() -> Schema {
        let mut tables = HashMap::new();
        tables.insert(
            "parent".to_string(),
            slicedb_schema::TableConfig {
                schema: "public".into(),
                name: "parent".into(),
                columns: vec!["id".into()],
                sequences: vec![],
            },
        );
        tables.insert(
            "child".to_string(),
            slicedb_schema::TableConfig {
                schema: "public".into(),
                name: "child".into(),
                columns: vec!["id".into(), "parent_id".into()],
                sequences: vec![],
            },
        );
        let mut references = HashMap::new();
        references.insert(
            "fk".to_string(),
            slicedb_schema::ReferenceConfig {
                columns: vec!["parent_id".into()],
                reference_columns: vec!["id".into()],
                reference_table: "parent".into(),
                table: "child".into(),
                directions: vec!["forward".into(), "reverse".into()],
                deferrable: false,
                name: Some("fk".into()),
            },
        );
        Schema::from_config(SchemaConfig {
            references,
            sequences: HashMap::new(),
            tables,
        })
        .unwrap()
    }

    #[test]
    fn forward_query_joins_to_the_reference_table_with_distinct() {
        let schema = sample_schema();
        let reference = schema.reference("fk").unwrap();
        let sql = build_discovery_query(&schema, reference, Direction::Forward);
        assert!(sql.contains("SELECT DISTINCT t.ctid::text"));
        assert!(sql.contains("\"public\".\"parent\" t"));
        assert!(sql.contains("f.\"parent_id\" = t.\"id\""));
    }

    #[test]
    fn reverse_query_has_no_distinct() {
        let schema = sample_schema();
        let reference = schema.reference("fk").unwrap();
        let sql = build_discovery_query(&schema, reference, Direction::Reverse);
        assert!(!sql.contains("DISTINCT"));
        assert!(sql.contains("\"public\".\"child\" c"));
    }

    #[test]
    fn insert_sql_casts_each_literal_to_tid() {
        let sql = insert_row_ids_sql(&["(1,2)".to_string(), "(3,4)".to_string()]);
        assert_eq!(sql, "INSERT INTO _slice_db (tid) VALUES ('(1,2)'::tid), ('(3,4)'::tid)");
    }
}
