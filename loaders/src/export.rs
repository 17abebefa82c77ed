use crate::csv_parser::CsvParser;
use crate::tables::columns;
use shared_types::{MergedRecord, SourceError, Table};

pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// Writes `rows` with the source column order of `table`, plus a `call_date`
/// column holding the derived date (empty when the timestamp did not parse).
pub fn export_merged(
    parser: &CsvParser,
    table: &Table<MergedRecord>,
    rows: &[&MergedRecord],
) -> Result<Vec<u8>, SourceError> {
    let mut headers = table.headers.clone();
    let date_column = match table.column_index(columns::CALL_DATE) {
        Some(idx) => idx,
        None => {
            headers.push(columns::CALL_DATE.to_string());
            headers.len() - 1
        }
    };

    let width = headers.len();
    let lines = rows.iter().map(|record| {
        let mut cells = record.cells.clone();
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        cells[date_column] = record
            .call_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        cells
    });

    parser.write_rows(&headers, lines)
}
