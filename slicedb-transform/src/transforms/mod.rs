//! The transform class registry (§4.4.2): maps a config `class` name to the
//! constructor that builds its `Transformer`.

pub mod address;
pub mod alphanumeric;
pub mod choice;
pub mod common;
pub mod date_year;
pub mod fpe;
pub mod json_path;
pub mod person;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;
use slicedb_errors::{ObjectId, SliceError};

use crate::context::Context;
use crate::Transformer;

type Constructor = fn(Option<&Value>, &Context, &[u8]) -> Result<Arc<dyn Transformer>, SliceError>;

static REGISTRY: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Constructor> = HashMap::new();
    m.insert("Null", common::construct_null);
    m.insert("Const", common::construct_const);
    m.insert("Compose", common::construct_compose);
    m.insert("Replace", common::construct_replace);
    m.insert("IncrementingConst", common::construct_incrementing_const);
    m.insert("GivenName", person::construct_given_name);
    m.insert("Surname", person::construct_surname);
    m.insert("AddressLine1", address::construct_address_line1);
    m.insert("AddressLine2", address::construct_address_line2);
    m.insert("City", address::construct_city);
    m.insert("UsState", address::construct_us_state);
    m.insert("Geozip", address::construct_geozip);
    m.insert("DateYear", date_year::construct_date_year);
    m.insert("Alphanumeric", alphanumeric::construct_alphanumeric);
    m.insert("JsonPath", json_path::construct_json_path);
    m
});

/// Builds the transformer for one config entry by its `class` name.
pub fn build_transformer(
    class: &str,
    config: Option<&Value>,
    context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let constructor = REGISTRY.get(class).ok_or_else(|| {
        SliceError::configuration(ObjectId::Transform(class.to_string()), "unknown transform class".to_string())
    })?;
    constructor(config, context, pepper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_registered_class() {
        let context = Context::default();
        for class in [
            "Null",
            "Const",
            "Replace",
            "IncrementingConst",
            "GivenName",
            "Surname",
            "AddressLine1",
            "AddressLine2",
            "City",
            "UsState",
            "Geozip",
            "DateYear",
            "Alphanumeric",
        ] {
            build_transformer(class, None, &context, b"pepper")
                .unwrap_or_else(|e| panic!("{class} failed to construct: {e}"));
        }
    }

    #[test]
    fn rejects_unknown_class() {
        let context = Context::default();
        assert!(build_transformer("NoSuchThing", None, &context, b"pepper").is_err());
    }
}
