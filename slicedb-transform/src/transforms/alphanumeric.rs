use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use slicedb_errors::SliceError;

use crate::seed::seeded_rng;
use crate::transforms::fpe;
use crate::word_case::{char_category, CharCategory};
use crate::{context::Context, Transformer};

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

pub struct AlphanumericTransformer {
    unique: bool,
    pepper: Vec<u8>,
}

impl Transformer for AlphanumericTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };
        if self.unique {
            Ok(Some(self.transform_unique(text)))
        } else {
            Ok(Some(self.transform_per_char(text)))
        }
    }
}

impl AlphanumericTransformer {
    fn transform_per_char(&self, text: &str) -> String {
        let mut rng = seeded_rng(text.to_uppercase().as_bytes(), &self.pepper);
        text.chars()
            .map(|c| match char_category(c) {
                CharCategory::Uppercase => {
                    (rng.gen_range(b'A'..=b'Z')) as char
                }
                CharCategory::Lowercase => (rng.gen_range(b'a'..=b'z')) as char,
                CharCategory::Number => (rng.gen_range(b'0'..=b'9')) as char,
                CharCategory::Other => c,
            })
            .collect()
    }

    fn transform_unique(&self, text: &str) -> String {
        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        for c in text.chars() {
            match char_category(c) {
                CharCategory::Uppercase => has_upper = true,
                CharCategory::Lowercase => has_lower = true,
                CharCategory::Number => has_digit = true,
                CharCategory::Other => {}
            }
        }

        let mut alphabet: Vec<u8> = Vec::new();
        if has_upper {
            alphabet.extend_from_slice(UPPER);
        }
        if has_lower {
            alphabet.extend_from_slice(LOWER);
        }
        if has_digit {
            alphabet.extend_from_slice(DIGITS);
        }
        if alphabet.is_empty() {
            alphabet.extend_from_slice(UPPER);
            alphabet.extend_from_slice(LOWER);
            alphabet.extend_from_slice(DIGITS);
        }

        let index_of = |c: char| -> usize {
            let byte = c as u32;
            alphabet
                .iter()
                .position(|&a| a as u32 == byte)
                .unwrap_or((byte as usize) % alphabet.len())
        };

        let digits: Vec<u8> = text.chars().map(|c| index_of(c) as u8).collect();
        let cipher_digits = fpe::encrypt(&digits, alphabet.len(), &self.pepper_key(text));

        cipher_digits
            .iter()
            .map(|&d| alphabet[d as usize] as char)
            .collect()
    }

    fn pepper_key(&self, text: &str) -> Vec<u8> {
        // The FPE key is the pepper alone (it must be stable for a given
        // pepper so repeated runs over the same input converge), but we fold
        // in the input length so otherwise-identical pepper/alphabet
        // combinations over different-length inputs still diverge.
        let mut key = self.pepper.clone();
        key.extend_from_slice(&(text.chars().count() as u32).to_be_bytes());
        key
    }
}

pub fn construct_alphanumeric(
    config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let unique = config
        .and_then(|c| c.get("unique"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Ok(Arc::new(AlphanumericTransformer {
        unique,
        pepper: pepper.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_category_shape_per_char() {
        let t = construct_alphanumeric(None, &Context::default(), b"pepper").unwrap();
        let out = t.transform(Some("AB-12")).unwrap().unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(&out[2..3], "-");
        assert!(out.chars().nth(0).unwrap().is_ascii_uppercase());
        assert!(out.chars().nth(3).unwrap().is_ascii_digit());
    }

    #[test]
    fn unique_mode_preserves_length_and_is_deterministic() {
        let t = construct_alphanumeric(
            Some(&serde_json::json!({"unique": true})),
            &Context::default(),
            b"pepper",
        )
        .unwrap();
        let a = t.transform(Some("AB1234cd")).unwrap().unwrap();
        let b = t.transform(Some("AB1234cd")).unwrap().unwrap();
        assert_eq!(a.len(), "AB1234cd".len());
        assert_eq!(a, b);
    }

    #[test]
    fn null_passes_through() {
        let t = construct_alphanumeric(None, &Context::default(), b"pepper").unwrap();
        assert_eq!(t.transform(None).unwrap(), None);
    }
}
