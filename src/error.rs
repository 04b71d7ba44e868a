//! Common error types for the barkartan pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level errors.
///
/// These are the fatal precondition failures: a pass that hits one aborts
/// before touching its output file and the process exits non-zero.
/// Per-record enrichment failures never surface here; the workflow passes
/// log them and carry on.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialize error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parse or write error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file or record not found
    #[error("Not found: {0}")]
    NotFound(String),
}
