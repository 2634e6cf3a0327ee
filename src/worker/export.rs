//! Export-path batch worker.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::config::EXPORT_DELIMITER;
use crate::sink::CsvSink;
use crate::storage::{fetch_page, ConnectionFactory, StoredRecord};

/// What one export worker accomplished before it stopped.
#[derive(Debug)]
pub(crate) struct ExportWorkerOutcome {
    pub worker_id: usize,
    /// Rows this worker appended to the sink.
    pub exported: u64,
    /// Whether the worker stopped because of an error.
    pub failed: bool,
}

/// Drains rows from the source table into the shared sink until the export cap
/// is reached, the source is exhausted, or cancellation.
///
/// Each worker owns a private, strictly increasing read cursor seeded to a
/// distinct starting point (`worker_id * batch_size`) and advanced by the
/// number of rows requested, not returned, after each successful read. An
/// empty read means "no more data yet": the worker backs off (preemptibly) and
/// retries the same cursor, giving up after `max_idle_polls` consecutive empty
/// polls.
pub(crate) async fn run_export_worker(
    worker_id: usize,
    factory: ConnectionFactory,
    sink: Arc<CsvSink>,
    batch_size: u64,
    backoff: Duration,
    max_idle_polls: u32,
    cancel: CancellationToken,
) -> ExportWorkerOutcome {
    let mut outcome = ExportWorkerOutcome {
        worker_id,
        exported: 0,
        failed: false,
    };

    let mut conn = match factory.connect().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Export worker {worker_id}: failed to obtain a connection: {e}");
            outcome.failed = true;
            return outcome;
        }
    };

    let mut offset = worker_id as u64 * batch_size;
    let mut idle_polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            info!("Export worker {worker_id}: shutdown requested, stopping between batches");
            break;
        }
        if sink.cap_reached() {
            debug!("Export worker {worker_id}: stopping - export cap reached");
            break;
        }

        let rows = match fetch_page(&mut conn, batch_size, offset).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(
                    "Export worker {worker_id}: read at offset {offset} failed, \
                     terminating this worker: {e}"
                );
                outcome.failed = true;
                break;
            }
        };

        if rows.is_empty() {
            idle_polls += 1;
            if idle_polls >= max_idle_polls {
                info!(
                    "Export worker {worker_id}: no new rows after {idle_polls} polls, \
                     treating source as exhausted"
                );
                break;
            }
            // Not an error: the data may simply not exist yet. Wait, but stay
            // preemptible by shutdown, then retry the same cursor.
            debug!(
                "Export worker {worker_id}: no rows at offset {offset}, backing off {:?}",
                backoff
            );
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = cancel.cancelled() => {
                    info!("Export worker {worker_id}: shutdown requested during backoff");
                    break;
                }
            }
            continue;
        }
        idle_polls = 0;

        // Serialize outside the sink's critical section; the lock then covers
        // only append + flush + counter bump.
        let row_count = rows.len() as u64;
        let buf = serialize_rows(&rows);
        match sink.append(&buf, row_count).await {
            Ok(appended) => {
                outcome.exported += appended.written;
                debug!(
                    "Export worker {worker_id}: appended {} rows, {} total from this worker",
                    appended.written, outcome.exported
                );
                if appended.cap_reached {
                    break;
                }
            }
            Err(e) => {
                error!(
                    "Export worker {worker_id}: append failed, terminating this worker: {e}"
                );
                outcome.failed = true;
                break;
            }
        }

        // Advance by the rows requested, not returned; gaps from concurrent
        // deletes are tolerated, not retried.
        offset += batch_size;
    }

    outcome
}

/// Joins each row's field values with the delimiter, one line per record.
///
/// No escaping is applied: a field value that contains the delimiter widens
/// the row. Carried source behavior; flagged in the export integration tests.
fn serialize_rows(rows: &[StoredRecord]) -> String {
    let mut buf = String::new();
    for row in rows {
        buf.push_str(&format!(
            "{id}{d}{first}{d}{last}{d}{email}{d}{addr}\n",
            id = row.id,
            first = row.first_name,
            last = row.last_name,
            email = row.email,
            addr = row.address,
            d = EXPORT_DELIMITER,
        ));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Record;
    use crate::progress::ProgressTracker;
    use crate::storage::{ensure_schema, insert_batch};
    use tempfile::TempDir;

    fn record(i: usize) -> Record {
        Record {
            first_name: format!("First{i}"),
            last_name: format!("Last{i}"),
            email: format!("first{i}@example.com"),
            address: format!("{i} Main Street"),
        }
    }

    async fn seeded_factory(dir: &TempDir, n: usize) -> ConnectionFactory {
        let factory = ConnectionFactory::new(&dir.path().join("test.db"));
        let mut conn = factory.connect().await.expect("connect");
        ensure_schema(&mut conn).await.expect("schema");
        let batch: Vec<Record> = (0..n).map(record).collect();
        insert_batch(&mut conn, &batch).await.expect("seed");
        factory
    }

    async fn open_sink(dir: &TempDir, cap: u64) -> Arc<CsvSink> {
        Arc::new(
            CsvSink::open(
                &dir.path().join("out.csv"),
                Arc::new(ProgressTracker::new(cap)),
            )
            .await
            .expect("open sink"),
        )
    }

    #[test]
    fn test_serialize_rows_joins_fields_without_escaping() {
        let rows = vec![StoredRecord {
            id: 1,
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@example.com".into(),
            address: "1 Oak Avenue, Salem".into(),
        }];
        let buf = serialize_rows(&rows);
        // The comma inside the address is not escaped and widens the row.
        assert_eq!(buf, "1,Ann,Lee,ann@example.com,1 Oak Avenue, Salem\n");
    }

    #[tokio::test]
    async fn test_single_worker_exports_until_exhausted() {
        let dir = TempDir::new().expect("tempdir");
        let factory = seeded_factory(&dir, 10).await;
        let sink = open_sink(&dir, 100).await;

        let outcome = run_export_worker(
            0,
            factory,
            Arc::clone(&sink),
            4,
            Duration::from_millis(1),
            2,
            CancellationToken::new(),
        )
        .await;

        assert!(!outcome.failed);
        assert_eq!(outcome.exported, 10);
        assert_eq!(sink.exported(), 10);
    }

    #[tokio::test]
    async fn test_worker_stops_at_cap() {
        let dir = TempDir::new().expect("tempdir");
        let factory = seeded_factory(&dir, 10).await;
        let sink = open_sink(&dir, 6).await;

        let outcome = run_export_worker(
            0,
            factory,
            Arc::clone(&sink),
            4,
            Duration::from_millis(1),
            2,
            CancellationToken::new(),
        )
        .await;

        assert!(!outcome.failed);
        assert_eq!(outcome.exported, 6);
        assert!(sink.cap_reached());
    }

    #[tokio::test]
    async fn test_cancelled_worker_stops_during_backoff() {
        let dir = TempDir::new().expect("tempdir");
        // Empty table: the worker will be waiting for data.
        let factory = seeded_factory(&dir, 0).await;
        let sink = open_sink(&dir, 100).await;
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(run_export_worker(
            0,
            factory,
            sink,
            4,
            Duration::from_secs(60),
            1_000,
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker did not stop after cancellation")
            .expect("worker panicked");
        assert!(!outcome.failed);
        assert_eq!(outcome.exported, 0);
    }

    #[tokio::test]
    async fn test_idle_poll_bound_terminates_worker() {
        let dir = TempDir::new().expect("tempdir");
        let factory = seeded_factory(&dir, 0).await;
        let sink = open_sink(&dir, 100).await;

        let outcome = run_export_worker(
            0,
            factory,
            sink,
            4,
            Duration::from_millis(1),
            3,
            CancellationToken::new(),
        )
        .await;

        assert!(!outcome.failed);
        assert_eq!(outcome.exported, 0);
    }
}
