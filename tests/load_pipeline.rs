//! Integration tests for the load path.

use std::time::Duration;

use datapump::storage::{count_rows, ConnectionFactory};
use datapump::{run_load, LoadConfig, ProgressTracker, WorkDistributor};
use tempfile::TempDir;

fn small_config(dir: &TempDir, total: u64, workers: usize, batch_size: u64) -> LoadConfig {
    LoadConfig {
        db_path: dir.path().join("test.db"),
        total,
        workers,
        batch_size,
        shutdown_timeout: Duration::from_secs(60),
    }
}

#[tokio::test]
async fn test_load_exact_division_inserts_exactly_total() {
    let dir = TempDir::new().expect("tempdir");
    // 1000 records in units of 250 across 4 workers: exactly 4 units issued,
    // covering [0, 1000).
    let config = small_config(&dir, 1000, 4, 250);

    let report = run_load(config.clone()).await.expect("run_load");
    assert_eq!(report.requested, 1000);
    assert_eq!(report.inserted, 1000);
    assert_eq!(report.failed_workers, 0);
    assert!(report.elapsed_seconds > 0.0);
    assert!(report.records_per_second > 0.0);

    let factory = ConnectionFactory::new(&config.db_path);
    let mut conn = factory.connect().await.expect("connect");
    assert_eq!(count_rows(&mut conn).await.expect("count"), 1000);
}

#[tokio::test]
async fn test_load_uneven_division_still_covers_the_space() {
    let dir = TempDir::new().expect("tempdir");
    let config = small_config(&dir, 1003, 3, 100);

    let report = run_load(config.clone()).await.expect("run_load");
    assert_eq!(report.inserted, 1003);

    let factory = ConnectionFactory::new(&config.db_path);
    let mut conn = factory.connect().await.expect("connect");
    assert_eq!(count_rows(&mut conn).await.expect("count"), 1003);
}

#[tokio::test]
async fn test_load_with_more_workers_than_units() {
    let dir = TempDir::new().expect("tempdir");
    // 8 workers but only 2 units of work: the surplus workers find the
    // distributor exhausted and stop cleanly.
    let config = small_config(&dir, 20, 8, 10);

    let report = run_load(config).await.expect("run_load");
    assert_eq!(report.inserted, 20);
    assert_eq!(report.failed_workers, 0);
}

#[tokio::test]
async fn test_load_is_not_idempotent_across_runs() {
    let dir = TempDir::new().expect("tempdir");
    let config = small_config(&dir, 100, 2, 25);

    run_load(config.clone()).await.expect("first run");
    run_load(config.clone()).await.expect("second run");

    // Re-running against the same destination doubles the rows. Documented
    // behavior: the loader provides no dedup or resume.
    let factory = ConnectionFactory::new(&config.db_path);
    let mut conn = factory.connect().await.expect("connect");
    assert_eq!(count_rows(&mut conn).await.expect("count"), 200);
}

#[tokio::test]
async fn test_invalid_worker_count_aborts_before_any_work() {
    let dir = TempDir::new().expect("tempdir");
    let config = small_config(&dir, 100, 0, 25);

    assert!(run_load(config.clone()).await.is_err());
    assert!(!config.db_path.exists());
}

#[test]
fn test_failed_batches_undercount_without_corruption() {
    // A worker that claims a unit and then fails never advances the counter:
    // the final tally is TOTAL minus the failed batch sizes, with no double
    // counting and no effect on sibling claims.
    let distributor = WorkDistributor::new(1000);
    let progress = ProgressTracker::new(1000);

    let failed_unit = distributor.next_unit(250).expect("first unit");

    // A surviving sibling drains the rest.
    while let Some(unit) = distributor.next_unit(250) {
        progress.add(unit.len());
    }

    assert_eq!(progress.count(), 1000 - failed_unit.len());
    assert!(!progress.target_reached());
}
