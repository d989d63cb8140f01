//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Per-candidate problems (missing values, malformed addresses, duplicates)
/// are not errors; they are reported as [`crate::IngestOutcome`] and folded
/// into the session statistics.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while opening or reading a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular source could not be parsed (malformed quoting, bad encoding).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Address pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Background reader task failed.
    #[error("Reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Text source is not valid UTF-8.
    #[error("Source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Source or engine configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation is not allowed in the controller's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Source ingestion was cancelled.
    #[error("Ingestion cancelled")]
    Cancelled,

    /// The engine task has shut down.
    #[error("Engine is no longer running")]
    EngineClosed,
}

impl Error {
    /// Returns true if this error rejects a source before any row was read.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
