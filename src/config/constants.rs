//! Configuration constants and defaults.

use std::time::Duration;

/// Default path of the SQLite database file.
pub const DB_PATH: &str = "./datapump.db";

/// Default path of the export file.
pub const EXPORT_PATH: &str = "./users_backup.csv";

/// Header line written to the export file before any worker starts.
pub const EXPORT_HEADER: &str = "id,first_name,last_name,email,address";

/// Field delimiter for the export file.
///
/// Field values are joined with this delimiter without any escaping, so a
/// value that itself contains the delimiter widens the row. This is carried
/// source behavior; see the export integration tests.
pub const EXPORT_DELIMITER: char = ',';

/// Default total number of records to insert.
pub const DEFAULT_TOTAL_RECORDS: u64 = 10_000_000;

/// Default number of insert workers.
pub const DEFAULT_LOAD_WORKERS: usize = 10;

/// Default number of records per insert transaction.
///
/// Each batch is staged and committed as a unit, so this bounds both
/// transaction overhead and the amount of work lost when a batch fails.
pub const DEFAULT_LOAD_BATCH_SIZE: u64 = 10_000;

/// Default number of export workers.
pub const DEFAULT_EXPORT_WORKERS: usize = 5;

/// Default number of rows per export read (`LIMIT` of the range query).
pub const DEFAULT_EXPORT_BATCH_SIZE: u64 = 200_000;

/// Default export cap (maximum rows written to the sink).
pub const DEFAULT_EXPORT_CAP: u64 = 10_000_000;

/// Default backoff between export polls that found no new rows.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Default bound on consecutive empty export polls before a worker treats the
/// source as exhausted.
///
/// The source behavior had no terminal condition distinct from "wait forever";
/// this bound is the escape hatch.
pub const DEFAULT_MAX_IDLE_POLLS: u32 = 20;

/// Default time the run waits for in-flight workers during shutdown before
/// force-terminating them.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1800);

/// Seconds between periodic progress log lines.
pub const LOGGING_INTERVAL_SECS: u64 = 5;

/// How long a worker's connection waits on a locked database before the
/// statement fails with a busy error.
pub const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(30);
