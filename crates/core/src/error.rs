//! Error types for report-tables-core

use thiserror::Error;

/// Result type alias for report-tables-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or validating a page snapshot.
///
/// Interaction-time problems (unknown targets, unparsable numbers) never
/// surface here; they degrade to no-ops.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
