use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to open observation file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' not found in header")]
    MissingColumn { column: &'static str },

    #[error("data row {line_index} invalid: {message}")]
    DataRow { line_index: usize, message: String },

    #[error("data row {line_index} has unparseable timestamp '{value}'")]
    InvalidTimestamp { line_index: usize, value: String },

    #[error("polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
