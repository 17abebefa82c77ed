use crate::csv_parser::{CsvParser, RawTable};
use crate::date_parser::{
    coerce_duration, non_empty, normalize_email, parse_call_date, parse_number,
};
use shared_types::{CallRecord, MergedRecord, OrderRecord, SourceError, Table};
use std::fs;
use std::path::Path;

pub mod columns {
    pub const START_TIMESTAMP: &str = "StartTimestamp";
    pub const USER_SENTIMENT: &str = "UserSentiment";
    pub const DISCONNECTION_REASON: &str = "DisconnectionReason";
    pub const DURATION_SECONDS: &str = "DurationSeconds";
    pub const CALL_SUCCESSFUL: &str = "CallSuccessful";
    pub const ORDER_NUMBER: &str = "order_number";
    pub const TOTAL_DURATION: &str = "TotalDuration (in sec)";
    pub const EMAIL: &str = "Email";
    pub const CONTACT_EMAIL: &str = "contact_email";
    /// Derived column appended on export
    pub const CALL_DATE: &str = "call_date";
}

/// Reads the three dashboard sources and normalizes their cells.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    csv_parser: CsvParser,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            csv_parser: CsvParser::new(),
        }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            csv_parser: CsvParser::with_delimiter(delimiter),
        }
    }

    pub fn csv_parser(&self) -> &CsvParser {
        &self.csv_parser
    }

    pub fn load_merged(&self, path: &Path) -> Result<Table<MergedRecord>, SourceError> {
        let content = read_source(path)?;
        let table = self.merged_from_bytes(&display_name(path), &content)?;
        tracing::info!("Loaded {} merged rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn load_calls(&self, path: &Path) -> Result<Table<CallRecord>, SourceError> {
        let content = read_source(path)?;
        let table = self.calls_from_bytes(&display_name(path), &content)?;
        tracing::info!("Loaded {} call rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn load_orders(&self, path: &Path) -> Result<Table<OrderRecord>, SourceError> {
        let content = read_source(path)?;
        let table = self.orders_from_bytes(&display_name(path), &content)?;
        tracing::info!("Loaded {} order rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn merged_from_bytes(
        &self,
        file: &str,
        content: &[u8],
    ) -> Result<Table<MergedRecord>, SourceError> {
        let raw = self.csv_parser.parse_file(content)?;

        let timestamp = raw.require(file, columns::START_TIMESTAMP)?;
        let sentiment = raw.require(file, columns::USER_SENTIMENT)?;
        let reason = raw.require(file, columns::DISCONNECTION_REASON)?;
        let duration = raw.require(file, columns::DURATION_SECONDS)?;
        let successful = raw.require(file, columns::CALL_SUCCESSFUL)?;
        let order = raw.require(file, columns::ORDER_NUMBER)?;

        let RawTable { headers, rows } = raw;
        let records = rows
            .into_iter()
            .map(|cells| MergedRecord {
                start_timestamp: cells[timestamp].clone(),
                call_date: parse_call_date(&cells[timestamp]),
                user_sentiment: non_empty(&cells[sentiment]),
                disconnection_reason: non_empty(&cells[reason]),
                duration_seconds: parse_number(&cells[duration]),
                call_successful: non_empty(&cells[successful]),
                order_number: non_empty(&cells[order]),
                cells,
            })
            .collect();

        Ok(Table::new(headers, records))
    }

    pub fn calls_from_bytes(
        &self,
        file: &str,
        content: &[u8],
    ) -> Result<Table<CallRecord>, SourceError> {
        let raw = self.csv_parser.parse_file(content)?;

        let timestamp = raw.require(file, columns::START_TIMESTAMP)?;
        let duration = raw.require(file, columns::TOTAL_DURATION)?;
        let email = raw.require(file, columns::EMAIL)?;

        let records = raw
            .rows
            .iter()
            .map(|cells| CallRecord {
                start_timestamp: cells[timestamp].clone(),
                call_date: parse_call_date(&cells[timestamp]),
                total_duration_secs: coerce_duration(&cells[duration]),
                email: normalize_email(&cells[email]),
            })
            .collect();

        Ok(Table::new(raw.headers, records))
    }

    pub fn orders_from_bytes(
        &self,
        file: &str,
        content: &[u8],
    ) -> Result<Table<OrderRecord>, SourceError> {
        let raw = self.csv_parser.parse_file(content)?;

        let email = raw.require(file, columns::CONTACT_EMAIL)?;

        let records = raw
            .rows
            .iter()
            .map(|cells| OrderRecord {
                contact_email: normalize_email(&cells[email]),
            })
            .collect();

        Ok(Table::new(raw.headers, records))
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>, SourceError> {
    fs::read(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
