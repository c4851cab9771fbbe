//! Error types for the report-tables CLI

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Core error: {0}")]
    Core(#[from] report_tables_core::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid event script: {0}")]
    Script(String),
}
