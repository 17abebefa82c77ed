use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both optional
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    pub fn bounds(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let start = parse_bound("start_date", self.start_date.as_deref())?;
        let end = parse_bound("end_date", self.end_date.as_deref())?;
        Ok((start, end))
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(Some(date)),
        Err(_) => bail!("{} must be a YYYY-MM-DD date, got '{}'", field, value),
    }
}
