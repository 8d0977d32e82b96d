// crates/rainfall-core/src/error.rs

use std::path::PathBuf;

use rainfall_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("Failed to load observations: {0}")]
    Parse(#[from] ParserError),

    #[error("Unsupported resolution '{0}' (expected one of D, M, Y)")]
    InvalidResolution(String),

    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid options file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Data processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, ResampleError>;
