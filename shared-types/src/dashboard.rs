use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Inclusive calendar date range used to filter calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A null date is never inside any range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => self.start <= d && d <= self.end,
            None => false,
        }
    }

    /// Smallest range covering every non-null date, or `None` when there are none.
    pub fn observed<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<NaiveDate>>,
    {
        dates
            .into_iter()
            .flatten()
            .fold(None, |range: Option<Self>, d| match range {
                Some(r) => Some(Self::new(r.start.min(d), r.end.max(d))),
                None => Some(Self::new(d, d)),
            })
    }
}

/// Headline numbers shown as metric cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DashboardMetrics {
    pub total_calls: usize,
    pub picked_up_calls: usize,
    pub purchases_after_calls: usize,
    pub conversion_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct DailyPurchases {
    pub date: NaiveDate,
    pub purchases: usize,
}

/// One entry of a `value_counts` style breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Equal-width histogram bin, `[lower, upper)` except the last one which is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum CallOutcome {
    Successful,
    Failed,
    Other,
}

impl CallOutcome {
    /// Classifies a raw `CallSuccessful` cell.
    pub fn classify(flag: &str) -> Self {
        match flag.trim().to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" | "yes" => CallOutcome::Successful,
            "0" | "0.0" | "false" | "no" => CallOutcome::Failed,
            _ => CallOutcome::Other,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            CallOutcome::Successful => "green",
            CallOutcome::Failed => "red",
            CallOutcome::Other => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CallOutcomeCount {
    /// Raw status value as it appears in the source
    pub status: String,
    pub outcome: CallOutcome,
    pub count: usize,
}

/// Everything the dashboard renders for one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DashboardSnapshot {
    /// Range actually applied, `None` when no bounds were given or observable
    pub range: Option<DateRange>,
    /// Min/max call dates of the merged table
    pub observed: Option<DateRange>,
    pub metrics: DashboardMetrics,
    pub daily_purchases: Vec<DailyPurchases>,
    pub duration_histogram: Vec<HistogramBin>,
    pub sentiment: Vec<CategoryCount>,
    pub disconnection_reasons: Vec<CategoryCount>,
    pub call_outcomes: Vec<CallOutcomeCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EmailMatchResponse {
    pub matched_purchases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SourceStatus {
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct HealthResponse {
    pub status: String,
    pub merged: SourceStatus,
    pub calls: SourceStatus,
    pub orders: SourceStatus,
}
