//! Loaders Crate
//!
//! Reads the call and order sources behind the dashboard, normalizes their
//! cells, and turns them into the aggregates the presenter renders.
//!
//! # Pipeline
//!
//! - **Load**: `SourceLoader` reads `merged_data.csv`, `call_data.csv` and
//!   `shopify_orders.csv` into typed tables
//! - **Normalize**: timestamps become calendar dates (or `None`), call
//!   durations coerce to numbers with a zero default, emails are lowercased
//! - **Filter**: `filter_by_date` keeps rows inside an inclusive date range
//! - **Aggregate**: `build_snapshot` produces metrics and chart series
//! - **Export**: `export_merged` writes a filtered merged table back to CSV
//!
//! # Example
//!
//! ```rust,ignore
//! use loaders::{build_snapshot, SourceLoader};
//!
//! let loader = SourceLoader::new();
//! let merged = loader.load_merged(Path::new("data/merged_data.csv"))?;
//! let calls = loader.load_calls(Path::new("data/call_data.csv"))?;
//! let snapshot = build_snapshot(&merged, &calls, None, None);
//! ```

pub mod csv_parser;
pub mod date_parser;
pub mod export;
pub mod filter;
pub mod metrics;
pub mod tables;

// Re-export commonly used items
pub use csv_parser::CsvParser;
pub use export::{export_merged, EXPORT_FILE_NAME};
pub use filter::{filter_by_date, observed_range, resolve_range, Dated};
pub use metrics::{build_snapshot, email_matched_purchases};
pub use tables::SourceLoader;
