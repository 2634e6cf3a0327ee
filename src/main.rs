//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `datapump` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use datapump::config::{
    DEFAULT_BACKOFF, DEFAULT_EXPORT_BATCH_SIZE, DEFAULT_EXPORT_CAP, DEFAULT_EXPORT_WORKERS,
    DEFAULT_LOAD_BATCH_SIZE, DEFAULT_LOAD_WORKERS, DEFAULT_MAX_IDLE_POLLS,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_TOTAL_RECORDS,
};
use datapump::initialization::init_logger_with;
use datapump::{run_export, run_load, ExportConfig, LoadConfig, LogFormat, LogLevel};

#[derive(Debug, Parser)]
#[command(name = "datapump", version, about)]
enum Cli {
    /// Generate and insert synthetic user records into the database
    #[command(name = "load")]
    Load(LoadArgs),
    /// Export user records from the database to a flat file
    #[command(name = "export")]
    Export(ExportArgs),
}

#[derive(Debug, Parser)]
struct LoadArgs {
    /// Database path (SQLite file)
    #[arg(long, default_value = "./datapump.db")]
    db_path: PathBuf,

    /// Total number of records to insert
    #[arg(long, default_value_t = DEFAULT_TOTAL_RECORDS, value_parser = clap::value_parser!(u64).range(1..))]
    total: u64,

    /// Number of concurrent insert workers (recommended: 10 or more)
    #[arg(long, default_value_t = DEFAULT_LOAD_WORKERS as u64, value_parser = clap::value_parser!(u64).range(1..))]
    workers: u64,

    /// Records per transaction
    #[arg(long, default_value_t = DEFAULT_LOAD_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Seconds to wait for in-flight workers during shutdown
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT.as_secs())]
    shutdown_timeout: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

#[derive(Debug, Parser)]
struct ExportArgs {
    /// Database path (SQLite file)
    #[arg(long, default_value = "./datapump.db")]
    db_path: PathBuf,

    /// Output file path
    #[arg(long, default_value = "./users_backup.csv")]
    output: PathBuf,

    /// Maximum number of rows to export
    #[arg(long, default_value_t = DEFAULT_EXPORT_CAP, value_parser = clap::value_parser!(u64).range(1..))]
    cap: u64,

    /// Number of concurrent export workers
    #[arg(long, default_value_t = DEFAULT_EXPORT_WORKERS as u64, value_parser = clap::value_parser!(u64).range(1..))]
    workers: u64,

    /// Rows per range read
    #[arg(long, default_value_t = DEFAULT_EXPORT_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Milliseconds to back off when a poll finds no new rows
    #[arg(long, default_value_t = DEFAULT_BACKOFF.as_millis() as u64)]
    backoff_ms: u64,

    /// Consecutive empty polls before a worker treats the source as exhausted
    #[arg(long, default_value_t = DEFAULT_MAX_IDLE_POLLS)]
    max_idle_polls: u32,

    /// Seconds to wait for in-flight workers during shutdown
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT.as_secs())]
    shutdown_timeout: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli {
        Cli::Load(args) => {
            init_logger_with(args.log_level.clone().into(), args.log_format.clone())
                .context("Failed to initialize logger")?;

            let config = LoadConfig {
                db_path: args.db_path,
                total: args.total,
                workers: args.workers as usize,
                batch_size: args.batch_size,
                shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            };

            match run_load(config).await {
                Ok(report) => {
                    println!(
                        "Inserted {} of {} records in {:.2} seconds ({:.2} records/sec)",
                        report.inserted,
                        report.requested,
                        report.elapsed_seconds,
                        report.records_per_second
                    );
                    println!("Results saved in {}", report.db_path.display());
                    // Per-worker failures mid-run are logged but do not change
                    // the exit code; the shortfall in the summary is the signal.
                    Ok(())
                }
                Err(e) => {
                    eprintln!("datapump error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        Cli::Export(args) => {
            init_logger_with(args.log_level.clone().into(), args.log_format.clone())
                .context("Failed to initialize logger")?;

            let config = ExportConfig {
                db_path: args.db_path,
                output: args.output,
                cap: args.cap,
                workers: args.workers as usize,
                batch_size: args.batch_size,
                backoff: Duration::from_millis(args.backoff_ms),
                max_idle_polls: args.max_idle_polls,
                shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            };

            match run_export(config).await {
                Ok(report) => {
                    println!(
                        "Exported {} rows (cap {}) in {:.2} seconds ({:.2} records/sec)",
                        report.exported, report.cap, report.elapsed_seconds, report.records_per_second
                    );
                    println!("Results saved in {}", report.output_path.display());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("datapump error: {:#}", e);
                    process::exit(1);
                }
            }
        }
    }
}
