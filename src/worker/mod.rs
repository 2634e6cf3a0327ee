//! Batch workers for the insert and export paths.
//!
//! Workers are deliberately isolated from each other: each owns its own
//! database connection (and, on the insert path, its own record generator),
//! and a failure inside one worker's batch step terminates only that worker.
//! The shared primitives — the work distributor cursor, the progress counter,
//! the sink lock — are never left inconsistent by a failing worker, because a
//! failure happens strictly after claiming a unit and strictly before
//! advancing the counter.

mod export;
mod insert;

pub(crate) use export::{run_export_worker, ExportWorkerOutcome};
pub(crate) use insert::{run_insert_worker, InsertWorkerOutcome};
