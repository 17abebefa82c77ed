pub mod dashboard;
pub mod record;
pub mod source;

pub use dashboard::{
    CallOutcome, CallOutcomeCount, CategoryCount, DailyPurchases, DashboardMetrics,
    DashboardSnapshot, DateRange, EmailMatchResponse, HealthResponse, HistogramBin, SourceStatus,
};
pub use record::{CallRecord, MergedRecord, OrderRecord, Table};
pub use source::SourceError;

