use chrono::NaiveDate;
use shared_types::{CallRecord, DateRange, MergedRecord};

/// A row that carries a derived call date.
pub trait Dated {
    fn call_date(&self) -> Option<NaiveDate>;
}

impl Dated for MergedRecord {
    fn call_date(&self) -> Option<NaiveDate> {
        self.call_date
    }
}

impl Dated for CallRecord {
    fn call_date(&self) -> Option<NaiveDate> {
        self.call_date
    }
}

/// Rows whose call date falls inside `range`. No range means no rows.
pub fn filter_by_date<'a, R: Dated>(records: &'a [R], range: Option<&DateRange>) -> Vec<&'a R> {
    let Some(range) = range else {
        return Vec::new();
    };

    records
        .iter()
        .filter(|r| range.contains(r.call_date()))
        .collect()
}

/// Min/max call dates of `records`.
pub fn observed_range<R: Dated>(records: &[R]) -> Option<DateRange> {
    DateRange::observed(records.iter().map(|r| r.call_date()))
}

/// Fills missing bounds from the observed range.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    observed: Option<&DateRange>,
) -> Option<DateRange> {
    let start = start.or_else(|| observed.map(|r| r.start))?;
    let end = end.or_else(|| observed.map(|r| r.end))?;
    Some(DateRange::new(start, end))
}
