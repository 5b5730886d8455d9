//! `Null`, `Const`, `Compose`, plus two additional transformers:
//! `Replace` (case-insensitive literal substring replacement) and
//! `IncrementingConst` (a constant suffixed with a monotonically
//! increasing counter, with an optional skip predicate).

use std::sync::{Arc, Mutex};

use regex::RegexBuilder;
use serde_json::Value;
use slicedb_errors::{ObjectId, SliceError};

use crate::context::Context;
use crate::Transformer;

pub struct NullTransformer;

impl Transformer for NullTransformer {
    fn transform(&self, _input: Option<&str>) -> Result<Option<String>, SliceError> {
        Ok(None)
    }
}

pub fn construct_null(
    _config: Option<&Value>,
    _context: &Context,
    _pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(NullTransformer))
}

pub struct ConstTransformer {
    value: Option<String>,
}

impl Transformer for ConstTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        // Nulls pass through unchanged; only non-null input is replaced.
        Ok(input.and(self.value.clone()))
    }
}

pub fn construct_const(
    config: Option<&Value>,
    _context: &Context,
    _pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let value = config.and_then(|c| c.get("value")).and_then(|v| v.as_str());
    Ok(Arc::new(ConstTransformer {
        value: value.map(str::to_string),
    }))
}

pub struct ComposeTransformer {
    steps: Vec<Arc<dyn Transformer>>,
}

impl Transformer for ComposeTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let mut current = input.map(str::to_string);
        for step in &self.steps {
            current = step.transform(current.as_deref())?;
        }
        Ok(current)
    }
}

pub fn construct_compose(
    config: Option<&Value>,
    context: &Context,
    _pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let names = config
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            SliceError::configuration(
                ObjectId::None,
                "Compose requires a config array of transform names".to_string(),
            )
        })?
        .iter()
        .map(|v| {
            v.as_str().ok_or_else(|| {
                SliceError::configuration(ObjectId::None, "Compose entries must be strings".to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let steps = names
        .into_iter()
        .map(|name| context.get_transform(name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arc::new(ComposeTransformer { steps }))
}

pub struct ReplaceTransformer {
    old: String,
    new: String,
}

impl Transformer for ReplaceTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else {
            return Ok(None);
        };
        let regex = RegexBuilder::new(&regex::escape(&self.old))
            .case_insensitive(true)
            .build()
            .expect("escaped literal is always a valid regex");
        Ok(Some(regex.replace_all(text, self.new.as_str()).into_owned()))
    }
}

pub fn construct_replace(
    config: Option<&Value>,
    _context: &Context,
    _pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let old = config
        .and_then(|c| c.get("old"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let new = config
        .and_then(|c| c.get("new"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(Arc::new(ReplaceTransformer { old, new }))
}

pub struct IncrementingConstTransformer {
    value: String,
    exclude: Option<String>,
    count: Mutex<u64>,
}

impl Transformer for IncrementingConstTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else {
            return Ok(None);
        };
        if text.is_empty() {
            return Ok(Some(text.to_string()));
        }
        if let Some(exclude) = &self.exclude {
            if text.contains(exclude.as_str()) {
                return Ok(Some(text.to_string()));
            }
        }
        let mut count = self.count.lock().unwrap();
        *count += 1;
        Ok(Some(format!("{} {}", self.value, *count)))
    }
}

pub fn construct_incrementing_const(
    config: Option<&Value>,
    _context: &Context,
    _pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let value = config
        .and_then(|c| c.get("value"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let exclude = config
        .and_then(|c| c.get("exclude"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Ok(Arc::new(IncrementingConstTransformer {
        value,
        exclude,
        count: Mutex::new(0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_passes_null_through() {
        let t = ConstTransformer {
            value: Some("x".into()),
        };
        assert_eq!(t.transform(None).unwrap(), None);
        assert_eq!(t.transform(Some("anything")).unwrap(), Some("x".to_string()));
    }

    #[test]
    fn incrementing_const_counts_up_and_skips_excluded() {
        let t = IncrementingConstTransformer {
            value: "Customer".into(),
            exclude: Some("VIP".into()),
            count: Mutex::new(0),
        };
        assert_eq!(t.transform(Some("a")).unwrap(), Some("Customer 1".into()));
        assert_eq!(t.transform(Some("b")).unwrap(), Some("Customer 2".into()));
        assert_eq!(t.transform(Some("VIP-b")).unwrap(), Some("VIP-b".into()));
    }

    #[test]
    fn replace_is_case_insensitive() {
        let t = ReplaceTransformer {
            old: "secret".into(),
            new: "REDACTED".into(),
        };
        assert_eq!(
            t.transform(Some("a Secret value")).unwrap(),
            Some("a REDACTED value".into())
        );
    }
}
