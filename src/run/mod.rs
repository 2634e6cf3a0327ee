//! Run orchestration: worker pool lifecycle for the load and export paths.
//!
//! Both entry points follow the same shape: validate configuration (fatal
//! before any worker starts), set up the shared resources, spawn a fixed pool
//! of worker tasks, log progress periodically, then drain the pool under a
//! shutdown timeout. On timeout the remaining tasks are force-terminated and
//! any in-flight uncommitted batch is abandoned — at-most-once, best-effort
//! completion, never exactly-once.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::{ExportConfig, LoadConfig, LOGGING_INTERVAL_SECS};
use crate::distributor::WorkDistributor;
use crate::progress::ProgressTracker;
use crate::sink::CsvSink;
use crate::storage::{ensure_schema, ConnectionFactory};
use crate::worker::{run_export_worker, run_insert_worker};

/// Results of a completed load run.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Records the run was asked to insert.
    pub requested: u64,
    /// Records actually committed.
    pub inserted: u64,
    /// Workers that stopped because of an error.
    pub failed_workers: usize,
    /// Elapsed wall-clock time in seconds.
    pub elapsed_seconds: f64,
    /// Committed records divided by elapsed seconds.
    pub records_per_second: f64,
    /// Path to the SQLite database that was filled.
    pub db_path: PathBuf,
}

/// Results of a completed export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Rows appended to the sink (excluding the header line).
    pub exported: u64,
    /// The configured export cap.
    pub cap: u64,
    /// Workers that stopped because of an error.
    pub failed_workers: usize,
    /// Elapsed wall-clock time in seconds.
    pub elapsed_seconds: f64,
    /// Exported rows divided by elapsed seconds.
    pub records_per_second: f64,
    /// Path to the export file.
    pub output_path: PathBuf,
}

/// Fills the destination table with synthetic records using a fixed pool of
/// insert workers.
///
/// This is the main entry point for the load path. The destination table is
/// created idempotently before any worker starts; the index space
/// `[0, total)` is then partitioned across the pool by the lock-free
/// distributor.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the destination
/// database cannot be opened. Per-worker batch failures do NOT fail the run:
/// they are logged, the affected worker stops, and the final counts are the
/// only signal of the shortfall (see the warning in the summary).
pub async fn run_load(config: LoadConfig) -> Result<LoadReport> {
    config.validate().context("Invalid load configuration")?;

    let factory = ConnectionFactory::new(&config.db_path);
    {
        let mut conn = factory
            .connect()
            .await
            .context("Failed to open destination database")?;
        ensure_schema(&mut conn)
            .await
            .context("Failed to create destination table")?;
    }

    info!(
        "Starting insertion of {} records: {} workers, batch size {}",
        config.total, config.workers, config.batch_size
    );

    let distributor = Arc::new(WorkDistributor::new(config.total));
    let progress = Arc::new(ProgressTracker::new(config.total));
    let cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(Arc::clone(&progress), cancel.child_token());

    let mut tasks = FuturesUnordered::new();
    let mut abort_handles = Vec::new();
    for worker_id in 0..config.workers {
        let handle = tokio::spawn(run_insert_worker(
            worker_id,
            factory.clone(),
            Arc::clone(&distributor),
            Arc::clone(&progress),
            config.batch_size,
            cancel.child_token(),
        ));
        abort_handles.push(handle.abort_handle());
        tasks.push(handle);
    }

    let mut failed_workers = 0usize;
    let drained = tokio::time::timeout(config.shutdown_timeout, async {
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(outcome) => {
                    debug!(
                        "Insert worker {} finished: {} records committed",
                        outcome.worker_id, outcome.inserted
                    );
                    if outcome.failed {
                        failed_workers += 1;
                    }
                }
                Err(join_error) => {
                    failed_workers += 1;
                    warn!("Insert worker task panicked: {join_error:?}");
                }
            }
        }
    })
    .await;

    if drained.is_err() {
        warn!(
            "Shutdown timeout ({:?}) elapsed; force-terminating in-flight workers",
            config.shutdown_timeout
        );
        cancel.cancel();
        for handle in &abort_handles {
            handle.abort();
        }
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.failed {
                        failed_workers += 1;
                    }
                }
                // Aborted: the in-flight uncommitted batch is abandoned.
                Err(_) => failed_workers += 1,
            }
        }
    }

    cancel.cancel();
    let _ = logging_task.await;

    progress.log_progress();
    let throughput = progress.throughput();
    if throughput.total < config.total {
        warn!(
            "Inserted {} of {} requested records ({} worker(s) stopped early); \
             the shortfall is not retried",
            throughput.total, config.total, failed_workers
        );
    }

    Ok(LoadReport {
        requested: config.total,
        inserted: throughput.total,
        failed_workers,
        elapsed_seconds: throughput.elapsed_seconds,
        records_per_second: throughput.records_per_second,
        db_path: config.db_path,
    })
}

/// Drains the source table into a flat file using a fixed pool of export
/// workers.
///
/// This is the main entry point for the export path. The sink (and its header
/// line) is created before any worker starts; workers then read at their own
/// advancing offsets and append through the shared, mutex-guarded sink.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the sink cannot be
/// created. Per-worker read/append failures do NOT fail the run; they are
/// logged and reflected in `failed_workers`.
pub async fn run_export(config: ExportConfig) -> Result<ExportReport> {
    config.validate().context("Invalid export configuration")?;

    let factory = ConnectionFactory::new(&config.db_path);
    let progress = Arc::new(ProgressTracker::new(config.cap));
    let sink = Arc::new(
        CsvSink::open(&config.output, Arc::clone(&progress))
            .await
            .context("Failed to create export file")?,
    );

    info!(
        "Starting export of up to {} rows to {}: {} workers, batch size {}",
        config.cap,
        config.output.display(),
        config.workers,
        config.batch_size
    );

    let cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(Arc::clone(&progress), cancel.child_token());

    let mut tasks = FuturesUnordered::new();
    let mut abort_handles = Vec::new();
    for worker_id in 0..config.workers {
        let handle = tokio::spawn(run_export_worker(
            worker_id,
            factory.clone(),
            Arc::clone(&sink),
            config.batch_size,
            config.backoff,
            config.max_idle_polls,
            cancel.child_token(),
        ));
        abort_handles.push(handle.abort_handle());
        tasks.push(handle);
    }

    let mut failed_workers = 0usize;
    let drained = tokio::time::timeout(config.shutdown_timeout, async {
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(outcome) => {
                    debug!(
                        "Export worker {} finished: {} rows appended",
                        outcome.worker_id, outcome.exported
                    );
                    if outcome.failed {
                        failed_workers += 1;
                    }
                }
                Err(join_error) => {
                    failed_workers += 1;
                    warn!("Export worker task panicked: {join_error:?}");
                }
            }
        }
    })
    .await;

    if drained.is_err() {
        warn!(
            "Shutdown timeout ({:?}) elapsed; force-terminating in-flight workers",
            config.shutdown_timeout
        );
        cancel.cancel();
        for handle in &abort_handles {
            handle.abort();
        }
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.failed {
                        failed_workers += 1;
                    }
                }
                Err(_) => failed_workers += 1,
            }
        }
    }

    cancel.cancel();
    let _ = logging_task.await;

    progress.log_progress();
    let throughput = progress.throughput();

    Ok(ExportReport {
        exported: throughput.total,
        cap: config.cap,
        failed_workers,
        elapsed_seconds: throughput.elapsed_seconds,
        records_per_second: throughput.records_per_second,
        output_path: config.output,
    })
}

/// Spawns the periodic progress-logging task.
///
/// Advisory only: the task logs the shared counter on an interval and stops
/// when cancelled. It never affects worker control flow.
fn spawn_progress_logger(
    progress: Arc<ProgressTracker>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL_SECS));
        // The first tick completes immediately; skip it so the first line
        // lands a full interval into the run.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    progress.log_progress();
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_load_rejects_invalid_config_before_touching_disk() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let db_path = dir.path().join("never_created.db");
        let config = LoadConfig {
            db_path: db_path.clone(),
            workers: 0,
            ..Default::default()
        };

        assert!(run_load(config).await.is_err());
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_run_export_rejects_invalid_config_before_touching_disk() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let output = dir.path().join("never_created.csv");
        let config = ExportConfig {
            db_path: dir.path().join("db.sqlite"),
            output: output.clone(),
            cap: 0,
            ..Default::default()
        };

        assert!(run_export(config).await.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_progress_logger_stops_on_cancel() {
        let progress = Arc::new(ProgressTracker::new(10));
        let cancel = CancellationToken::new();
        let task = spawn_progress_logger(progress, cancel.child_token());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("logger did not stop after cancellation")
            .expect("logger panicked");
    }
}
