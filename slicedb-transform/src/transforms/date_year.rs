use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde_json::Value;
use slicedb_errors::{ObjectId, SliceError};

use crate::context::Context;
use crate::seed::seeded_rng;
use crate::Transformer;

pub struct DateYearTransformer {
    pepper: Vec<u8>,
}

impl Transformer for DateYearTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let Some(text) = input else { return Ok(None) };

        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            SliceError::data(
                ObjectId::Transform("DateYear".to_string()),
                format!("{text:?} is not an ISO date (YYYY-MM-DD)"),
            )
        })?;

        let year = date.year();
        let days_in_year = if NaiveDate::from_ymd_opt(year, 12, 31).unwrap().leap_year() {
            366
        } else {
            365
        };

        let mut rng = seeded_rng(text.as_bytes(), &self.pepper);
        let offset: i64 = rng.gen_range(0..days_in_year);

        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let new_date = jan1 + chrono::Duration::days(offset);
        Ok(Some(new_date.format("%Y-%m-%d").to_string()))
    }
}

trait LeapYear {
    fn leap_year(&self) -> bool;
}

impl LeapYear for NaiveDate {
    fn leap_year(&self) -> bool {
        let y = self.year();
        (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
    }
}

pub fn construct_date_year(
    _config: Option<&Value>,
    _context: &Context,
    pepper: &[u8],
) -> Result<Arc<dyn Transformer>, SliceError> {
    Ok(Arc::new(DateYearTransformer {
        pepper: pepper.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_year_and_is_deterministic() {
        let t = construct_date_year(None, &Context::default(), b"abc").unwrap();
        let a = t.transform(Some("2020-06-15")).unwrap().unwrap();
        let b = t.transform(Some("2020-06-15")).unwrap().unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("2020-"));
    }

    #[test]
    fn rejects_non_iso_dates() {
        let t = construct_date_year(None, &Context::default(), b"abc").unwrap();
        assert!(t.transform(Some("06/15/2020")).is_err());
    }

    #[test]
    fn null_passes_through() {
        let t = construct_date_year(None, &Context::default(), b"abc").unwrap();
        assert_eq!(t.transform(None).unwrap(), None);
    }
}
