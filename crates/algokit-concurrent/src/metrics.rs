use crossbeam_utils::CachePadded;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters a parallel sorter bumps while it recurses.
///
/// Each counter sits on its own cache line; workers on different cores bump
/// them concurrently.
#[derive(Debug, Default)]
pub struct SortMetrics {
    sorts: CachePadded<AtomicU64>,
    tasks_spawned: CachePadded<AtomicU64>,
    sequential_leaves: CachePadded<AtomicU64>,
    merges: CachePadded<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortMetricsSnapshot {
    pub sorts: u64,
    pub tasks_spawned: u64,
    pub sequential_leaves: u64,
    pub merges: u64,
}

impl SortMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_sort(&self) {
        self.sorts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_tasks(&self, n: u64) {
        self.tasks_spawned.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_leaf(&self) {
        self.sequential_leaves.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_merge(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SortMetricsSnapshot {
        SortMetricsSnapshot {
            sorts: self.sorts.load(Ordering::Relaxed),
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            sequential_leaves: self.sequential_leaves.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.sorts.store(0, Ordering::Relaxed);
        self.tasks_spawned.store(0, Ordering::Relaxed);
        self.sequential_leaves.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
    }
}
