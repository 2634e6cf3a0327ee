//! datapump library: concurrent bulk loading and exporting of user records
//!
//! This library fills a SQLite table with synthetic user records, or drains it
//! into a flat delimiter-separated file, using a fixed pool of worker tasks. A
//! lock-free work distributor hands out disjoint index ranges, each worker
//! writes its batches through its own dedicated database connection, and a
//! shared atomic progress counter drives throughput reporting.
//!
//! # Example
//!
//! ```no_run
//! use datapump::{run_load, LoadConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoadConfig {
//!     total: 1_000_000,
//!     workers: 8,
//!     ..Default::default()
//! };
//!
//! let report = run_load(config).await?;
//! println!("Inserted {} records at {:.0} records/sec",
//!          report.inserted, report.records_per_second);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod distributor;
mod error_handling;
mod generator;
pub mod initialization;
mod progress;
mod run;
mod sink;
pub mod storage;
mod worker;

// Re-export public API
pub use config::{ExportConfig, LoadConfig, LogFormat, LogLevel};
pub use distributor::{WorkDistributor, WorkUnit};
pub use error_handling::{ConfigError, DatabaseError, InitializationError, SinkError};
pub use generator::{FakeRecordGenerator, Record, RecordGenerator};
pub use progress::{ProgressTracker, ThroughputReport};
pub use run::{run_export, run_load, ExportReport, LoadReport};
pub use sink::{Appended, CsvSink};
