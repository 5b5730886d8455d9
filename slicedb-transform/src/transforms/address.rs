use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use slicedb_errors::SliceError;

use crate::context::Context;
use crate::corpora::{CITIES, STREETS, US_STATES, US_STATE_ABBR, ZIPS};
use crate::seed::seeded_rng;
use crate::transforms::choice::Choice;
use crate::word_case::{letters_only, reshape_like, word_case, WordCase};
use crate::Transformer;

struct AddressLine1Transformer {
    streets: Choice,
    pepper: Vec<u8>,
}

impl Transformer for AddressLine1Transformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };
        if text.is_empty() {
            return Ok(Some(String::new()));
        }
        let street = self.streets.choose(text, &self.pepper);
        let case = word_case(&letters_only(text));
        let street = if case != WordCase::Titlecase {
            crate::word_case::apply_case(street, case)
        } else {
            street.to_string()
        };
        let mut rng = seeded_rng(text.as_bytes(), &self.pepper);
        let n: u32 = rng.gen_range(1..=9999);
        Ok(Some(format!("{n} {street}")))
    }
}

pub fn construct_address_line1(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(AddressLine1Transformer {
        streets: Choice::new(STREETS),
        pepper: pepper.to_vec(),
    }))
}

struct AddressLine2Transformer {
    pepper: Vec<u8>,
}

impl Transformer for AddressLine2Transformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };
        if text.is_empty() {
            return Ok(Some(String::new()));
        }
        let mut rng = seeded_rng(text.as_bytes(), &self.pepper);
        let n: u32 = rng.gen_range(1..=999);
        Ok(Some(format!("#{n}")))
    }
}

pub fn construct_address_line2(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(AddressLine2Transformer {
        pepper: pepper.to_vec(),
    }))
}

struct CityTransformer {
    cities: Choice,
    pepper: Vec<u8>,
}

impl Transformer for CityTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };
        if text.is_empty() {
            return Ok(Some(String::new()));
        }
        let city = self.cities.choose(text, &self.pepper);
        Ok(Some(reshape_like(city, text)))
    }
}

pub fn construct_city(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(CityTransformer {
        cities: Choice::new(CITIES),
        pepper: pepper.to_vec(),
    }))
}

struct UsStateTransformer {
    states: Choice,
    pepper: Vec<u8>,
}

impl Transformer for UsStateTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };
        if text.is_empty() {
            return Ok(Some(String::new()));
        }
        let picked = self.states.choose(&text.to_uppercase(), &self.pepper);
        Ok(Some(reshape_like(picked, picked)))
    }
}

pub fn construct_us_state(
    config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let abbr = config
        .and_then(|c| c.get("abbr"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let states = if abbr { US_STATE_ABBR } else { US_STATES };
    Ok(Arc::new(UsStateTransformer {
        states: Choice::new(states),
        pepper: pepper.to_vec(),
    }))
}

struct GeozipTransformer {
    by_prefix: HashMap<String, Choice>,
    all: Choice,
    pepper: Vec<u8>,
}

impl Transformer for GeozipTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(zip) = input else { return Ok(None) };
        if zip.len() < 3 {
            let picked = self.all.choose(zip, &self.pepper);
            return Ok(Some(format!("{:0>5}", picked)));
        }
        let prefix = &zip[0..3];
        let picked = match self.by_prefix.get(prefix) {
            Some(choice) => choice.choose(zip, &self.pepper),
            None => self.all.choose(zip, &self.pepper),
        };
        Ok(Some(format!("{:0>5}", picked)))
    }
}

pub fn construct_geozip(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for zip in ZIPS {
        let padded = format!("{:0>5}", zip);
        grouped
            .entry(padded[0..3].to_string())
            .or_default()
            .push(padded);
    }
    let by_prefix = grouped
        .into_iter()
        .map(|(prefix, options)| (prefix, Choice::from_strings(options)))
        .collect();
    Ok(Arc::new(GeozipTransformer {
        by_prefix,
        all: Choice::new(ZIPS),
        pepper: pepper.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geozip_prefers_same_prefix() {
        let t = construct_geozip(None, &Context::default(), b"pepper").unwrap();
        let out = t.transform(Some("10005")).unwrap().unwrap();
        assert_eq!(&out[0..3], "100");
    }

    #[test]
    fn geozip_falls_back_for_unknown_prefix() {
        let t = construct_geozip(None, &Context::default(), b"pepper").unwrap();
        let out = t.transform(Some("99999")).unwrap().unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn address_line1_is_deterministic() {
        let t = construct_address_line1(None, &Context::default(), b"pepper").unwrap();
        let a = t.transform(Some("123 Old Rd")).unwrap().unwrap();
        let b = t.transform(Some("123 Old Rd")).unwrap().unwrap();
        assert_eq!(a, b);
        assert!(a.chars().next().unwrap().is_ascii_digit());
    }
}
