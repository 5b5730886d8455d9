use std::sync::Arc;

use serde_json::Value;
use slicedb_errors::SliceError;

use crate::context::Context;
use crate::corpora::{GIVEN_NAMES, SURNAMES};
use crate::transforms::choice::Choice;
use crate::word_case::reshape_like;
use crate::Transformer;

struct NameTransformer {
    choice: Choice,
    pepper: Vec<u8>,
}

impl Transformer for NameTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else {
            return Ok(None);
        };
        let picked = self.choice.choose(&text.to_uppercase(), &self.pepper);
        Ok(Some(reshape_like(picked, text)))
    }
}

pub fn construct_given_name(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(NameTransformer {
        choice: Choice::new(GIVEN_NAMES),
        pepper: pepper.to_vec(),
    }))
}

pub fn construct_surname(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(NameTransformer {
        choice: Choice::new(SURNAMES),
        pepper: pepper.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_name_is_deterministic_and_preserves_case() {
        let t = construct_given_name(None, &Context::default(), b"abc").unwrap();
        let a = t.transform(Some("John")).unwrap().unwrap();
        let b = t.transform(Some("John")).unwrap().unwrap();
        assert_eq!(a, b);
        // Title case in, title case out.
        assert_eq!(a.chars().next().unwrap().is_uppercase(), true);
        assert_eq!(a.chars().skip(1).all(|c| c.is_lowercase()), true);
    }

    #[test]
    fn given_name_preserves_uppercase_shape() {
        let t = construct_given_name(None, &Context::default(), b"abc").unwrap();
        let upper = t.transform(Some("SUE")).unwrap().unwrap();
        assert_eq!(upper, upper.to_uppercase());
    }

    #[test]
    fn null_passes_through() {
        let t = construct_surname(None, &Context::default(), b"abc").unwrap();
        assert_eq!(t.transform(None).unwrap(), None);
    }
}
