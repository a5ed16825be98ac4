use algokit_core::{MergeSorter, Result, SortConfig, SortError};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::merge_sort::{merge, split_point, try_merge_sort_by};
use crate::metrics::SortMetrics;
use crate::pool::WorkerPool;

/// Parallel merge sort that forks the left half and sorts the right half on
/// the calling worker, then joins.
///
/// A failure in one half does not stop the other; both run to completion and
/// the error surfaces at the join. The right half's error wins when both fail.
#[derive(Debug, Clone)]
pub struct ForkJoinMergeSort {
    threshold: usize,
    pool: WorkerPool,
    metrics: Arc<SortMetrics>,
}

impl ForkJoinMergeSort {
    pub fn new(threshold: usize) -> Self {
        Self::with_pool(threshold, WorkerPool::Global)
    }

    pub fn with_pool(threshold: usize, pool: WorkerPool) -> Self {
        Self {
            threshold,
            pool,
            metrics: Arc::new(SortMetrics::new()),
        }
    }

    pub fn with_threads(threshold: usize, num_threads: usize) -> Result<Self> {
        Ok(Self::with_pool(threshold, WorkerPool::with_threads(num_threads)?))
    }

    pub fn from_config(config: &SortConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::from_threads(config.num_threads)?;
        Ok(Self::with_pool(config.threshold, pool))
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn metrics(&self) -> &SortMetrics {
        &self.metrics
    }

    fn sort_range<T, E, F>(&self, v: &mut [T], lo: usize, compare: &F) -> std::result::Result<(), E>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    {
        let len = v.len();
        if len < 2 {
            return Ok(());
        }
        if len <= self.threshold {
            trace!(lo, hi = lo + len - 1, "sequential leaf");
            self.metrics.record_leaf();
            return try_merge_sort_by(v, compare);
        }

        let mid = split_point(len);
        trace!(lo, mid = lo + mid, hi = lo + len - 1, "fork");
        self.metrics.record_tasks(1);
        let (left, right) = v.split_at_mut(mid);
        let (right_done, left_done) = rayon::join(
            || self.sort_range(right, lo + mid, compare),
            || self.sort_range(left, lo, compare),
        );
        right_done?;
        left_done?;

        trace!(lo, hi = lo + len - 1, "merge");
        self.metrics.record_merge();
        merge(v, mid, compare)
    }
}

impl Default for ForkJoinMergeSort {
    fn default() -> Self {
        Self::new(SortConfig::DEFAULT_THRESHOLD)
    }
}

impl MergeSorter for ForkJoinMergeSort {
    fn try_sort_by<T, E, F>(&self, v: &mut [T], compare: F) -> std::result::Result<(), SortError<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    {
        let start = Instant::now();
        let len = v.len();
        self.metrics.record_sort();
        let outcome = self.pool.install(|| self.sort_range(v, 0, &compare));
        debug!(
            len,
            threshold = self.threshold,
            elapsed_us = start.elapsed().as_micros() as u64,
            ok = outcome.is_ok(),
            "fork/join sort finished"
        );
        outcome.map_err(SortError::Comparator)
    }
}
