//! The JSON wire shape of the input schema document (§6: "Schema JSON").
//! Unknown fields are ignored, so older documents stay loadable as new
//! optional fields are added.

use std::collections::HashMap;

use serde::Deserialize;

fn default_directions() -> Vec<String> {
    vec!["forward".to_string(), "reverse".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    pub columns: Vec<String>,
    #[serde(rename = "referenceColumns")]
    pub reference_columns: Vec<String>,
    #[serde(rename = "referenceTable")]
    pub reference_table: String,
    pub table: String,
    #[serde(default = "default_directions")]
    pub directions: Vec<String>,
    #[serde(default)]
    pub deferrable: bool,
    /// Live constraint name, used to `SET CONSTRAINTS ... DEFERRED`.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub sequences: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    pub schema: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub references: HashMap<String, ReferenceConfig>,
    #[serde(default)]
    pub sequences: HashMap<String, SequenceConfig>,
    pub tables: HashMap<String, TableConfig>,
}

impl SchemaConfig {
    pub fn from_json_str(text: &str) -> serde_json::Result<SchemaConfig> {
        serde_json::from_str(text)
    }
}
