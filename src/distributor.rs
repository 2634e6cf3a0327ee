//! Lock-free distribution of work ranges across insert workers.
//!
//! The distributor owns a single shared cursor over the global index space
//! `[0, total)`. Each call to [`WorkDistributor::next_unit`] claims the next
//! contiguous slice with one atomic increment, so no two workers can ever
//! observe overlapping ranges and contention is limited to a single machine
//! word. There is no coarse lock around generation or insertion.

use std::sync::atomic::{AtomicU64, Ordering};

/// A contiguous, half-open range `[start, end)` of the global index space,
/// claimed by exactly one worker for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// First index covered by this unit (inclusive).
    pub start: u64,
    /// One past the last index covered by this unit (exclusive).
    pub end: u64,
}

impl WorkUnit {
    /// Number of records covered by this unit.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` if the unit covers no records.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Hands out disjoint, contiguous ranges of `[0, total)` to callers.
///
/// Issued units are pairwise disjoint, and once the distributor is exhausted
/// their union covers the full space exactly. No ordering guarantee is made on
/// which worker receives which range.
#[derive(Debug)]
pub struct WorkDistributor {
    cursor: AtomicU64,
    total: u64,
}

impl WorkDistributor {
    /// Creates a distributor over the index space `[0, total)`.
    pub fn new(total: u64) -> Self {
        Self {
            cursor: AtomicU64::new(0),
            total,
        }
    }

    /// Claims the next unit of at most `batch_size` records.
    ///
    /// Returns `None` once the space is exhausted. The claim is a single
    /// `fetch_add`; the cursor may travel past `total` but claimed ranges are
    /// always clamped to it.
    pub fn next_unit(&self, batch_size: u64) -> Option<WorkUnit> {
        let start = self.cursor.fetch_add(batch_size, Ordering::Relaxed);
        if start >= self.total {
            return None;
        }
        let end = std::cmp::min(start.saturating_add(batch_size), self.total);
        Some(WorkUnit { start, end })
    }

    /// Total size of the index space this distributor covers.
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_single_claimant_issues_ordered_units() {
        let distributor = WorkDistributor::new(10);
        assert_eq!(
            distributor.next_unit(4),
            Some(WorkUnit { start: 0, end: 4 })
        );
        assert_eq!(
            distributor.next_unit(4),
            Some(WorkUnit { start: 4, end: 8 })
        );
        assert_eq!(
            distributor.next_unit(4),
            Some(WorkUnit { start: 8, end: 10 })
        );
        assert_eq!(distributor.next_unit(4), None);
    }

    #[test]
    fn test_exact_division_issues_full_units() {
        let distributor = WorkDistributor::new(1000);
        let mut units = Vec::new();
        while let Some(unit) = distributor.next_unit(250) {
            units.push(unit);
        }
        assert_eq!(units.len(), 4);
        assert!(units.iter().all(|u| u.len() == 250));
        assert_eq!(units.first().map(|u| u.start), Some(0));
        assert_eq!(units.last().map(|u| u.end), Some(1000));
    }

    #[test]
    fn test_zero_total_is_immediately_exhausted() {
        let distributor = WorkDistributor::new(0);
        assert_eq!(distributor.next_unit(100), None);
    }

    #[test]
    fn test_batch_larger_than_total_is_clamped() {
        let distributor = WorkDistributor::new(7);
        assert_eq!(
            distributor.next_unit(100),
            Some(WorkUnit { start: 0, end: 7 })
        );
        assert_eq!(distributor.next_unit(100), None);
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let distributor = WorkDistributor::new(5);
        assert!(distributor.next_unit(5).is_some());
        for _ in 0..10 {
            assert_eq!(distributor.next_unit(5), None);
        }
    }

    #[test]
    fn test_concurrent_claims_are_disjoint_and_cover_the_space() {
        let distributor = Arc::new(WorkDistributor::new(100_000));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let distributor = Arc::clone(&distributor);
            handles.push(std::thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Some(unit) = distributor.next_unit(333) {
                    claimed.push(unit);
                }
                claimed
            }));
        }

        let mut units: Vec<WorkUnit> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("claimant thread panicked"))
            .collect();
        units.sort_by_key(|u| u.start);

        // Disjoint and gap-free: each unit starts exactly where the previous
        // one ended, and together they cover [0, 100_000).
        let mut expected_start = 0;
        for unit in &units {
            assert_eq!(unit.start, expected_start);
            assert!(unit.end > unit.start);
            expected_start = unit.end;
        }
        assert_eq!(expected_start, 100_000);
    }
}
