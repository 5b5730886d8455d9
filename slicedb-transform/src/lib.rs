//! Deterministic field transformation and pseudonymisation (§4.4): a small
//! pipeline of named, composable transformers applied per column during
//! extraction, plus the per-table row-level driver that applies them over a
//! COPY-format stream.
//!
//! Every transformer is a pure function of `(input, pepper)`: the same row
//! value, re-extracted with the same pepper, always comes out the same way.
//! Nothing here talks to a database or a file; [`TransformSet`] is built
//! once from a parsed [`config::TransformConfig`] and handed to the
//! extraction engine, which streams rows through it.

pub mod config;
pub mod context;
pub mod corpora;
pub mod seed;
pub mod transforms;
pub mod word_case;

use std::collections::HashMap;
use std::sync::Arc;

use slicedb_errors::{ObjectId, SliceError};

pub use config::TransformConfig;
pub use context::Context;

/// A deterministic field transform: `transform(input)` depends only on
/// `input` and whatever pepper the transformer was constructed with.
pub trait Transformer: Send + Sync {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError>;
}

/// The transforms configured for one table, keyed by column name. Columns
/// with no entry pass through unchanged.
pub struct TableTransformer {
    by_column: HashMap<String, Arc<dyn Transformer>>,
}

impl TableTransformer {
    /// Applies the configured transform to each column of `row` in place.
    /// `columns` gives the column name for each positional field in `row`;
    /// it must be the same length as `row`.
    pub fn apply(
        &self,
        table: &str,
        columns: &[String],
        row: &mut [slicedb_copy::Field],
    ) -> Result<(), SliceError> {
        for (column, field) in columns.iter().zip(row.iter_mut()) {
            if let Some(transformer) = self.by_column.get(column) {
                let input = field.as_deref();
                *field = transformer.transform(input).map_err(|e| match e {
                    SliceError::Data { message, .. } => SliceError::data(
                        ObjectId::Table(table.to_string()),
                        format!("column {column}: {message}"),
                    ),
                    other => other,
                })?;
            }
        }
        Ok(())
    }

    /// `true` when no column of this table has a configured transform — lets
    /// the extraction engine skip the parse/transform/serialise round trip
    /// entirely and copy rows through verbatim.
    pub fn is_identity(&self) -> bool {
        self.by_column.is_empty()
    }
}

/// The whole transform document, resolved into runnable transformers, one
/// [`TableTransformer`] per table that has any configured column.
pub struct TransformSet {
    tables: HashMap<String, TableTransformer>,
}

impl TransformSet {
    /// Builds every named transform in `config.transforms`, then assembles
    /// each table's column map. Each transformer is seeded with `pepper`
    /// concatenated with its own registered name, not the bare pepper —
    /// this keeps the same pepper from correlating two distinct transforms
    /// of the same class. The same pepper must be used for a dump to be
    /// reproducible, and a different pepper for it to diverge.
    pub fn build(config: &TransformConfig, pepper: &[u8]) -> Result<TransformSet, SliceError> {
        let context = Context::new(config.transforms.keys().cloned());

        let mut resolved: HashMap<String, Arc<dyn Transformer>> =
            HashMap::with_capacity(config.transforms.len());
        for (name, entry) in &config.transforms {
            let seed = [pepper, name.as_bytes()].concat();
            let transformer =
                transforms::build_transformer(&entry.class, entry.config.as_ref(), &context, &seed)
                    .map_err(|e| match e {
                        SliceError::Configuration { message, .. } => SliceError::configuration(
                            ObjectId::Transform(name.clone()),
                            message,
                        ),
                        other => other,
                    })?;
            resolved.insert(name.clone(), transformer);
        }
        for (name, transformer) in &resolved {
            if let Some(handle) = context.handle(name) {
                handle.resolve(Arc::clone(transformer));
            }
        }

        let mut tables = HashMap::with_capacity(config.tables.len());
        for (table_id, table_config) in &config.tables {
            let mut by_column = HashMap::with_capacity(table_config.columns.len());
            for (column, transform_name) in &table_config.columns {
                let transformer = resolved.get(transform_name).cloned().ok_or_else(|| {
                    SliceError::configuration(
                        ObjectId::Table(table_id.clone()),
                        format!("column {column} references unknown transform {transform_name}"),
                    )
                })?;
                by_column.insert(column.clone(), transformer);
            }
            tables.insert(table_id.clone(), TableTransformer { by_column });
        }

        Ok(TransformSet { tables })
    }

    pub fn table(&self, table_id: &str) -> Option<&TableTransformer> {
        self.tables.get(table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{TransformEntryConfig, TransformTableConfig};

    fn sample_config() -> TransformConfig {
        let mut transforms = HashMap::new();
        transforms.insert(
            "blank".to_string(),
            TransformEntryConfig {
                class: "Null".to_string(),
                config: None,
            },
        );
        let mut tables = HashMap::new();
        let mut columns = HashMap::new();
        columns.insert("email".to_string(), "blank".to_string());
        tables.insert("customer".to_string(), TransformTableConfig { columns });
        TransformConfig { transforms, tables }
    }

    #[test]
    fn applies_configured_column_transform_and_skips_others() {
        let set = TransformSet::build(&sample_config(), b"pepper").unwrap();
        let table = set.table("customer").unwrap();
        assert!(!table.is_identity());

        let columns = vec!["id".to_string(), "email".to_string()];
        let mut row: Vec<slicedb_copy::Field> =
            vec![Some("1".to_string()), Some("a@example.com".to_string())];
        table.apply("customer", &columns, &mut row).unwrap();
        assert_eq!(row, vec![Some("1".to_string()), None]);
    }

    #[test]
    fn table_with_no_transforms_is_identity() {
        let config = TransformConfig {
            transforms: HashMap::new(),
            tables: HashMap::new(),
        };
        let set = TransformSet::build(&config, b"pepper").unwrap();
        assert!(set.table("anything").is_none());
    }

    #[test]
    fn rejects_unknown_transform_reference() {
        let mut config = sample_config();
        config
            .tables
            .get_mut("customer")
            .unwrap()
            .columns
            .insert("phone".to_string(), "does-not-exist".to_string());
        let err = TransformSet::build(&config, b"pepper").unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn compose_can_reference_a_transform_defined_later() {
        let mut transforms = HashMap::new();
        transforms.insert(
            "pipeline".to_string(),
            TransformEntryConfig {
                class: "Compose".to_string(),
                config: Some(serde_json::json!(["step2"])),
            },
        );
        transforms.insert(
            "step2".to_string(),
            TransformEntryConfig {
                class: "Null".to_string(),
                config: None,
            },
        );
        let mut columns = HashMap::new();
        columns.insert("note".to_string(), "pipeline".to_string());
        let mut tables = HashMap::new();
        tables.insert("t".to_string(), TransformTableConfig { columns });
        let config = TransformConfig { transforms, tables };

        let set = TransformSet::build(&config, b"pepper").unwrap();
        let table = set.table("t").unwrap();
        let cols = vec!["note".to_string()];
        let mut row: Vec<slicedb_copy::Field> = vec![Some("x".to_string())];
        table.apply("t", &cols, &mut row).unwrap();
        assert_eq!(row, vec![None]);
    }
}
