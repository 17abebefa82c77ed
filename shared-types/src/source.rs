/// Errors raised while reading a source table
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },
}
