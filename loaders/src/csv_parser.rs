use csv::{ReaderBuilder, WriterBuilder};
use shared_types::SourceError;

/// Header row plus raw string cells, padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of `column`, or a `MissingColumn` error naming `file`.
    pub fn require(&self, file: &str, column: &str) -> Result<usize, SourceError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| SourceError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_headers: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::new()
        }
    }

    pub fn parse_file(&self, content: &[u8]) -> Result<RawTable, SourceError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(content);

        let mut headers: Vec<String> = reader
            .headers()
            .map_err(|e| SourceError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        // Spreadsheet exports often start with a byte order mark
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let mut rows = Vec::new();

        for result in reader.records() {
            match result {
                Ok(record) => {
                    let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
                    if row.len() > headers.len() {
                        // blank cells past the header are dropped, any value there rejects the row
                        if row[headers.len()..].iter().any(|cell| !cell.trim().is_empty()) {
                            tracing::warn!(
                                "Skipping CSV row with {} fields, header has {}",
                                row.len(),
                                headers.len()
                            );
                            continue;
                        }
                        row.truncate(headers.len());
                    }
                    row.resize(headers.len(), String::new());
                    rows.push(row);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            }
        }

        Ok(RawTable { headers, rows })
    }

    pub fn write_rows<I>(&self, headers: &[String], rows: I) -> Result<Vec<u8>, SourceError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_writer(Vec::new());

        writer
            .write_record(headers)
            .map_err(|e| SourceError::Csv(e.to_string()))?;

        for row in rows {
            writer
                .write_record(&row)
                .map_err(|e| SourceError::Csv(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| SourceError::Csv(e.to_string()))
    }
}
