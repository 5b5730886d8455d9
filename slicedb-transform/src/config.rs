//! The JSON wire shape of the transform document (§6: "Transform JSON").

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct TransformEntryConfig {
    pub class: String,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformTableConfig {
    pub columns: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub transforms: HashMap<String, TransformEntryConfig>,
    #[serde(default)]
    pub tables: HashMap<String, TransformTableConfig>,
}

impl TransformConfig {
    pub fn from_json_str(text: &str) -> serde_json::Result<TransformConfig> {
        serde_json::from_str(text)
    }
}
