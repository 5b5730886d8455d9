//! The in-memory schema: tables, references, and sequences, resolved and
//! cross-linked from the raw [`crate::config::SchemaConfig`] document.
//!
//! Built once per dump/restore invocation and immutable thereafter — see
//! spec §3's lifecycle note. Every reference endpoint is guaranteed to
//! resolve to a table by the time [`Schema::from_config`] returns
//! successfully.

use std::collections::HashMap;

use slicedb_errors::{ObjectId, SliceError};
use slicedb_util::RowId;

use crate::config::SchemaConfig;

pub type TableId = String;
pub type ReferenceId = String;
pub type SequenceId = String;

/// Which way a [`Reference`] may be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directions {
    pub forward: bool,
    pub reverse: bool,
}

impl Directions {
    pub fn none() -> Self {
        Directions {
            forward: false,
            reverse: false,
        }
    }

    pub fn both() -> Self {
        Directions {
            forward: true,
            reverse: true,
        }
    }

    pub fn is_inert(self) -> bool {
        !self.forward && !self.reverse
    }

    fn from_strings(values: &[String]) -> Self {
        let mut d = Directions::none();
        for v in values {
            match v.to_ascii_lowercase().as_str() {
                "forward" => d.forward = true,
                "reverse" => d.reverse = true,
                _ => {}
            }
        }
        d
    }
}

/// The traversal direction a discovery task is currently exploring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// "Don't traverse back the way you came" — §4.3.3. `arrived_via` is the
    /// `(reference, direction)` pair the current task was spawned through,
    /// if any.
    pub fn eligible(
        self,
        directions: Directions,
        arrived_via: Option<(&ReferenceId, Direction)>,
        this_reference: &ReferenceId,
    ) -> bool {
        let permitted = match self {
            Direction::Forward => directions.forward,
            Direction::Reverse => directions.reverse,
        };
        if !permitted {
            return false;
        }
        match arrived_via {
            Some((ref_id, arrived_direction)) if ref_id == this_reference => {
                // Walking the same direction we just arrived through keeps
                // going outward; walking the opposite direction on this edge
                // would walk straight back, so only `arrived_direction ==
                // self` is eligible.
                arrived_direction == self
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    pub sequences: Vec<SequenceId>,
    pub references: Vec<ReferenceId>,
    pub reverse_references: Vec<ReferenceId>,
}

impl Table {
    /// Double-quoted, schema-qualified SQL identifier: `"schema"."name"`.
    pub fn quoted_name(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    pub fn quoted_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| quote_ident(c)).collect()
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub id: ReferenceId,
    pub table: TableId,
    pub columns: Vec<String>,
    pub reference_table: TableId,
    pub reference_columns: Vec<String>,
    pub directions: Directions,
    pub deferrable: bool,
    /// Live constraint name; required only when `deferrable` and the
    /// restore scheduler needs to `SET CONSTRAINTS <name> DEFERRED`.
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: SequenceId,
    pub schema: String,
    pub name: String,
}

impl Sequence {
    pub fn quoted_name(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

/// A `(table, predicate)` traversal entry point. The predicate is trusted —
/// it is injected verbatim into a `WHERE` clause.
#[derive(Debug, Clone)]
pub struct Root {
    pub table: TableId,
    pub condition: String,
}

/// The unit of extraction and of the manifest: a bounded, numbered chunk of
/// a table's discovered row ids.
#[derive(Debug, Clone)]
pub struct TableSegment {
    pub table: TableId,
    pub index: u32,
    pub row_ids: Vec<RowId>,
}

/// The fully resolved, cross-linked schema. Constructed once from a
/// [`SchemaConfig`]; immutable thereafter.
#[derive(Debug, Clone)]
pub struct Schema {
    tables: HashMap<TableId, Table>,
    references: HashMap<ReferenceId, Reference>,
    sequences: HashMap<SequenceId, Sequence>,
}

impl Schema {
    pub fn from_config(config: SchemaConfig) -> Result<Schema, SliceError> {
        let mut tables: HashMap<TableId, Table> = HashMap::with_capacity(config.tables.len());
        for (id, table_config) in &config.tables {
            tables.insert(
                id.clone(),
                Table {
                    id: id.clone(),
                    schema: table_config.schema.clone(),
                    name: table_config.name.clone(),
                    columns: table_config.columns.clone(),
                    sequences: table_config.sequences.clone(),
                    references: Vec::new(),
                    reverse_references: Vec::new(),
                },
            );
        }

        let mut references: HashMap<ReferenceId, Reference> =
            HashMap::with_capacity(config.references.len());
        for (id, reference_config) in &config.references {
            if !tables.contains_key(&reference_config.table) {
                return Err(SliceError::configuration(
                    ObjectId::Reference(id.clone()),
                    format!("no table {}", reference_config.table),
                ));
            }
            if !tables.contains_key(&reference_config.reference_table) {
                return Err(SliceError::configuration(
                    ObjectId::Reference(id.clone()),
                    format!("no table {}", reference_config.reference_table),
                ));
            }

            let directions = Directions::from_strings(&reference_config.directions);
            references.insert(
                id.clone(),
                Reference {
                    id: id.clone(),
                    table: reference_config.table.clone(),
                    columns: reference_config.columns.clone(),
                    reference_table: reference_config.reference_table.clone(),
                    reference_columns: reference_config.reference_columns.clone(),
                    directions,
                    deferrable: reference_config.deferrable,
                    name: reference_config.name.clone(),
                },
            );

            tables
                .get_mut(&reference_config.table)
                .unwrap()
                .references
                .push(id.clone());
            tables
                .get_mut(&reference_config.reference_table)
                .unwrap()
                .reverse_references
                .push(id.clone());
        }

        let mut sequences: HashMap<SequenceId, Sequence> =
            HashMap::with_capacity(config.sequences.len());
        for (id, sequence_config) in &config.sequences {
            sequences.insert(
                id.clone(),
                Sequence {
                    id: id.clone(),
                    schema: sequence_config.schema.clone(),
                    name: sequence_config.name.clone(),
                },
            );
        }
        for table in tables.values() {
            for seq_id in &table.sequences {
                if !sequences.contains_key(seq_id) {
                    return Err(SliceError::configuration(
                        ObjectId::Table(table.id.clone()),
                        format!("no sequence {seq_id}"),
                    ));
                }
            }
        }

        Ok(Schema {
            tables,
            references,
            sequences,
        })
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.get(id)
    }

    pub fn reference(&self, id: &str) -> Option<&Reference> {
        self.references.get(id)
    }

    pub fn sequence(&self, id: &str) -> Option<&Sequence> {
        self.sequences.get(id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = &TableId> {
        self.tables.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReferenceConfig, TableConfig};
    use std::collections::HashMap;

    fn sample_config() -> SchemaConfig {
        let mut tables = HashMap::new();
        tables.insert(
            "parent".to_string(),
            TableConfig {
                schema: "public".into(),
                name: "parent".into(),
                columns: vec!["id".into()],
                sequences: vec![],
            },
        );
        tables.insert(
            "child".to_string(),
            TableConfig {
                schema: "public".into(),
                name: "child".into(),
                columns: vec!["id".into(), "parent_id".into()],
                sequences: vec![],
            },
        );
        let mut references = HashMap::new();
        references.insert(
            "child_parent_id_fkey".to_string(),
            ReferenceConfig {
                columns: vec!["parent_id".into()],
                reference_columns: vec!["id".into()],
                reference_table: "parent".into(),
                table: "child".into(),
                directions: vec!["forward".into(), "reverse".into()],
                deferrable: false,
                name: Some("child_parent_id_fkey".into()),
            },
        );
        SchemaConfig {
            references,
            sequences: HashMap::new(),
            tables,
        }
    }

    #[test]
    fn cross_links_forward_and_reverse_references() {
        let schema = Schema::from_config(sample_config()).unwrap();
        let child = schema.table("child").unwrap();
        let parent = schema.table("parent").unwrap();
        assert_eq!(child.references, vec!["child_parent_id_fkey".to_string()]);
        assert_eq!(
            parent.reverse_references,
            vec!["child_parent_id_fkey".to_string()]
        );
    }

    #[test]
    fn rejects_dangling_reference_endpoints() {
        let mut config = sample_config();
        config
            .references
            .get_mut("child_parent_id_fkey")
            .unwrap()
            .reference_table = "missing".into();
        let err = Schema::from_config(config).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn direction_filtering_prevents_immediate_backtrack() {
        let directions = Directions::both();
        let reference_id = "r".to_string();
        // Arrived via `r` FORWARD: REVERSE back through the same edge is
        // not eligible, but FORWARD through a *different* edge still is.
        assert!(!Direction::Reverse.eligible(
            directions,
            Some((&reference_id, Direction::Forward)),
            &reference_id
        ));
        assert!(Direction::Forward.eligible(
            directions,
            Some((&reference_id, Direction::Forward)),
            &reference_id
        ));
        assert!(Direction::Forward.eligible(directions, None, &reference_id));
    }

    #[test]
    fn inert_edge_permits_neither_direction() {
        let directions = Directions::none();
        let reference_id = "r".to_string();
        assert!(!Direction::Forward.eligible(directions, None, &reference_id));
        assert!(!Direction::Reverse.eligible(directions, None, &reference_id));
    }
}
