//! Configuration types and CLI option enums.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_BACKOFF, DEFAULT_EXPORT_BATCH_SIZE, DEFAULT_EXPORT_CAP,
    DEFAULT_EXPORT_WORKERS, DEFAULT_LOAD_BATCH_SIZE, DEFAULT_LOAD_WORKERS, DEFAULT_MAX_IDLE_POLLS,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_TOTAL_RECORDS, EXPORT_PATH,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration for a load run (no CLI dependencies).
///
/// This struct can be constructed programmatically without any CLI
/// dependencies.
///
/// # Examples
///
/// ```no_run
/// use datapump::LoadConfig;
/// use std::path::PathBuf;
///
/// let config = LoadConfig {
///     db_path: PathBuf::from("./users.db"),
///     total: 1_000_000,
///     workers: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Total number of records to insert
    pub total: u64,

    /// Number of concurrent insert workers
    pub workers: usize,

    /// Records per transaction
    pub batch_size: u64,

    /// How long to wait for in-flight workers during shutdown before
    /// force-terminating them
    pub shutdown_timeout: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            total: DEFAULT_TOTAL_RECORDS,
            workers: DEFAULT_LOAD_WORKERS,
            batch_size: DEFAULT_LOAD_BATCH_SIZE,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl LoadConfig {
    /// Validates the configuration before any worker starts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the worker count, batch size, or total is
    /// not a positive integer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.total == 0 {
            return Err(ConfigError::InvalidTarget(self.total));
        }
        Ok(())
    }
}

/// Configuration for an export run (no CLI dependencies).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Output file path
    pub output: PathBuf,

    /// Maximum number of rows written to the sink
    pub cap: u64,

    /// Number of concurrent export workers
    pub workers: usize,

    /// Rows per range read
    pub batch_size: u64,

    /// Backoff between polls that found no new rows
    pub backoff: Duration,

    /// Consecutive empty polls before a worker treats the source as exhausted
    pub max_idle_polls: u32,

    /// How long to wait for in-flight workers during shutdown before
    /// force-terminating them
    pub shutdown_timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            output: PathBuf::from(EXPORT_PATH),
            cap: DEFAULT_EXPORT_CAP,
            workers: DEFAULT_EXPORT_WORKERS,
            batch_size: DEFAULT_EXPORT_BATCH_SIZE,
            backoff: DEFAULT_BACKOFF,
            max_idle_polls: DEFAULT_MAX_IDLE_POLLS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ExportConfig {
    /// Validates the configuration before any worker starts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the worker count, batch size, or cap is
    /// not a positive integer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.cap == 0 {
            return Err(ConfigError::InvalidTarget(self.cap));
        }
        Ok(())
    }
}
