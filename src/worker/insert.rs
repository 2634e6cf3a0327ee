//! Insert-path batch worker.

use std::sync::Arc;

use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::distributor::WorkDistributor;
use crate::generator::{FakeRecordGenerator, Record, RecordGenerator};
use crate::progress::ProgressTracker;
use crate::storage::{insert_batch, ConnectionFactory};

/// What one insert worker accomplished before it stopped.
#[derive(Debug)]
pub(crate) struct InsertWorkerOutcome {
    pub worker_id: usize,
    /// Records this worker committed.
    pub inserted: u64,
    /// Whether the worker stopped because of an error (its own batch only;
    /// siblings keep running).
    pub failed: bool,
}

/// Drains work units into the destination table until exhaustion, the global
/// target, cancellation, or a local error.
///
/// The worker opens one dedicated connection and one owned generator up front
/// and keeps both for its lifetime. Each claimed unit becomes one transactional
/// batch; the progress counter is advanced only after the commit, so a failed
/// batch's intended count is simply never added — undercount, never corruption
/// or double count.
pub(crate) async fn run_insert_worker(
    worker_id: usize,
    factory: ConnectionFactory,
    distributor: Arc<WorkDistributor>,
    progress: Arc<ProgressTracker>,
    batch_size: u64,
    cancel: CancellationToken,
) -> InsertWorkerOutcome {
    let mut outcome = InsertWorkerOutcome {
        worker_id,
        inserted: 0,
        failed: false,
    };

    let mut conn = match factory.connect().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Worker {worker_id}: failed to obtain a connection: {e}");
            outcome.failed = true;
            return outcome;
        }
    };
    let mut generator = FakeRecordGenerator::new();

    loop {
        if cancel.is_cancelled() {
            info!("Worker {worker_id}: shutdown requested, stopping between batches");
            break;
        }
        if progress.target_reached() {
            debug!("Worker {worker_id}: stopping - global target reached");
            break;
        }
        let Some(unit) = distributor.next_unit(batch_size) else {
            debug!("Worker {worker_id}: work space exhausted");
            break;
        };
        // Cancellation is re-checked between claiming a unit and starting its
        // batch, so a forced shutdown loses at most one in-flight batch.
        if cancel.is_cancelled() {
            info!(
                "Worker {worker_id}: shutdown requested, abandoning claimed unit [{}, {})",
                unit.start, unit.end
            );
            break;
        }

        let batch: Vec<Record> = (0..unit.len()).map(|_| generator.generate()).collect();
        match insert_batch(&mut conn, &batch).await {
            Ok(()) => {
                progress.add(unit.len());
                outcome.inserted += unit.len();
                debug!(
                    "Worker {worker_id}: committed [{}, {}) ({} records so far)",
                    unit.start, unit.end, outcome.inserted
                );
            }
            Err(e) => {
                error!(
                    "Worker {worker_id}: batch [{}, {}) failed, terminating this worker: {e}",
                    unit.start, unit.end
                );
                outcome.failed = true;
                break;
            }
        }
    }

    outcome
}
