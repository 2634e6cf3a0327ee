//! Error type definitions.
//!
//! This module defines the error types used throughout the application.
//! Configuration and initialization errors are fatal and abort the run before
//! any worker starts; database and sink errors are local to the worker that
//! hit them and never cross into a sibling's loop.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for configuration validation failures.
///
/// All of these are fatal: they are raised before any worker starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The worker count is not a positive integer.
    #[error("Worker count must be a positive integer (got {0})")]
    InvalidWorkerCount(usize),

    /// The batch size is not a positive integer.
    #[error("Batch size must be a positive integer (got {0})")]
    InvalidBatchSize(u64),

    /// The target record count (or export cap) is not a positive integer.
    #[error("Target record count must be a positive integer (got {0})")]
    InvalidTarget(u64),
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error opening a worker's dedicated connection.
    #[error("Database connection error: {0}")]
    ConnectError(sqlx::Error),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Error types for the file sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Error creating the output file or writing its header.
    #[error("Failed to create export file: {0}")]
    CreateError(std::io::Error),

    /// I/O error while appending to the output file.
    #[error("Failed to append to export file: {0}")]
    AppendError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::InvalidWorkerCount(0);
        assert_eq!(
            err.to_string(),
            "Worker count must be a positive integer (got 0)"
        );

        let err = ConfigError::InvalidBatchSize(0);
        assert!(err.to_string().contains("Batch size"));

        let err = ConfigError::InvalidTarget(0);
        assert!(err.to_string().contains("Target record count"));
    }

    #[test]
    fn test_sink_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = SinkError::from(io_err);
        assert!(err.to_string().contains("disk full"));
    }
}
