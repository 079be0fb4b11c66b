//! Error types for blinko-core

use thiserror::Error;

/// Result type alias using blinko-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blinko-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API returned an error response
    #[error("API error: {0}")]
    Api(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A dispatched background task did not complete
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}
