/// Core Module for sqlbatch
///
/// Shared infrastructure used by the batch runner: the database layer and
/// the crate-wide error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{BatchError, Result, StatementExecutionError};
