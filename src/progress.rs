//! Shared progress counting and throughput reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::info;

/// Process-wide tally of durably committed records.
///
/// The counter is advanced only after a batch commits (insert path) or is
/// durably appended (export path), never speculatively, so it is always an
/// undercount of in-flight work and never an overcount of durable work.
#[derive(Debug)]
pub struct ProgressTracker {
    committed: AtomicU64,
    target: u64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Creates a tracker for a run targeting `target` records.
    pub fn new(target: u64) -> Self {
        Self {
            committed: AtomicU64::new(0),
            target,
            start_time: Instant::now(),
        }
    }

    /// Adds a committed batch's record count to the tally.
    pub fn add(&self, count: u64) {
        self.committed.fetch_add(count, Ordering::Relaxed);
    }

    /// Current committed record count.
    pub fn count(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    /// The target record count for this run.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Best-effort check used by workers to stop early once the global target
    /// is met. Overshoot by up to one in-flight batch is tolerated.
    pub fn target_reached(&self) -> bool {
        self.count() >= self.target
    }

    /// Logs a progress line: committed records, elapsed time, and rate.
    ///
    /// Advisory only; never affects control flow.
    pub fn log_progress(&self) {
        let committed = self.count();
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed_secs > 0.0 {
            committed as f64 / elapsed_secs
        } else {
            0.0
        };
        info!(
            "Committed {} of {} records in {:.2} seconds (~{:.2} records/sec)",
            committed, self.target, elapsed_secs, rate
        );
    }

    /// Computes the final throughput figure.
    ///
    /// Call after all workers are joined; the counters are final at that point.
    pub fn throughput(&self) -> ThroughputReport {
        let total = self.count();
        let elapsed_seconds = self.start_time.elapsed().as_secs_f64();
        let records_per_second = if elapsed_seconds > 0.0 {
            total as f64 / elapsed_seconds
        } else {
            0.0
        };
        ThroughputReport {
            total,
            elapsed_seconds,
            records_per_second,
        }
    }
}

/// Final throughput figures for a completed run.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputReport {
    /// Total committed records.
    pub total: u64,
    /// Elapsed wall-clock time from start to pool drain.
    pub elapsed_seconds: f64,
    /// Committed records divided by elapsed seconds.
    pub records_per_second: f64,
}
