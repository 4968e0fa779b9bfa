/// sqlbatch Error Module
///
/// Two layers of errors live here. `BatchError` covers everything that can
/// stop a run before (or while writing) its report: opening the database,
/// reading the SQL file, loading configuration. `StatementExecutionError`
/// is the per-statement failure, which never leaves the batch loop and is
/// reported as an outcome instead.
use thiserror::Error;

/// Setup and I/O errors for the batch runner.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Errors opening or configuring the SQLite connection
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system errors (SQL file, config file, output sink)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON export errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported output format or rendering problems
    #[error("Output error: {0}")]
    Output(String),
}

/// Type alias for Result to use BatchError as the error type.
pub type Result<T> = std::result::Result<T, BatchError>;

/// A single statement failed to prepare, execute, or materialize.
///
/// `index` is the 1-based position of the statement in its batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error in Query {index}: {message}")]
pub struct StatementExecutionError {
    pub index: usize,
    pub message: String,
}

impl StatementExecutionError {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        StatementExecutionError {
            index,
            message: message.into(),
        }
    }
}
