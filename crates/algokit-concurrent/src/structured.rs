use algokit_core::{MergeSorter, Result, SortConfig, SortError};
use std::cmp::Ordering;
use std::panic;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::merge_sort::{merge, split_point, try_merge_sort_by};
use crate::metrics::SortMetrics;
use crate::pool::WorkerPool;
use crate::scope::{StructuredScope, TaskFailure};

/// Parallel merge sort where every split opens a nested [`StructuredScope`]
/// and spawns both halves into it.
///
/// The first comparator failure or panic cancels the whole sort: pending
/// halves are skipped, running ones stop at their next range boundary, and no
/// merge runs after cancellation. The slice is always left as a permutation of
/// its input.
#[derive(Debug, Clone)]
pub struct StructuredMergeSort {
    threshold: usize,
    pool: WorkerPool,
    metrics: Arc<SortMetrics>,
}

impl StructuredMergeSort {
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

    /// Like [`MergeSorter::try_sort_by`], but also stops when `token` is
    /// cancelled from outside. Returns [`SortError::Cancelled`] in that case.
    pub fn try_sort_by_cancellable<T, E, F>(
        &self,
        v: &mut [T],
        token: &CancellationToken,
        compare: F,
    ) -> std::result::Result<(), SortError<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    {
        let start = Instant::now();
        let len = v.len();
        self.metrics.record_sort();
        let outcome = self.pool.install(|| self.sort_range(v, 0, token, &compare));
        debug!(
            len,
            threshold = self.threshold,
            elapsed_us = start.elapsed().as_micros() as u64,
            ok = outcome.is_ok(),
            "structured sort finished"
        );
        match outcome {
            Ok(()) => Ok(()),
            Err(TaskFailure::Failed(e)) => Err(SortError::Comparator(e)),
            Err(TaskFailure::Cancelled) => Err(SortError::Cancelled),
            Err(TaskFailure::Panicked(payload)) => panic::resume_unwind(payload),
        }
    }

    fn sort_range<T, E, F>(
        &self,
        v: &mut [T],
        lo: usize,
        token: &CancellationToken,
        compare: &F,
    ) -> std::result::Result<(), TaskFailure<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    {
        if token.is_cancelled() {
            return Err(TaskFailure::Cancelled);
        }
        let len = v.len();
        if len < 2 {
            return Ok(());
        }
        if len <= self.threshold {
            trace!(lo, hi = lo + len - 1, "sequential leaf");
            self.metrics.record_leaf();
            return try_merge_sort_by(v, compare).map_err(TaskFailure::Failed);
        }

        let mid = split_point(len);
        trace!(lo, mid = lo + mid, hi = lo + len - 1, "open scope");
        self.metrics.record_tasks(2);
        {
            let (left, right) = v.split_at_mut(mid);
            let scope = StructuredScope::nested(token);
            scope.run(|s| {
                s.spawn(move |t| self.sort_range(left, lo, t, compare));
                s.spawn(move |t| self.sort_range(right, lo + mid, t, compare));
            })?;
        }

        if token.is_cancelled() {
            return Err(TaskFailure::Cancelled);
        }
        trace!(lo, hi = lo + len - 1, "merge");
        self.metrics.record_merge();
        merge(v, mid, compare).map_err(TaskFailure::Failed)
    }
}

impl Default for StructuredMergeSort {
    fn default() -> Self {
        Self::new(SortConfig::DEFAULT_THRESHOLD)
    }
}

impl MergeSorter for StructuredMergeSort {
    fn try_sort_by<T, E, F>(&self, v: &mut [T], compare: F) -> std::result::Result<(), SortError<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    {
        let root = CancellationToken::new();
        self.try_sort_by_cancellable(v, &root, compare)
    }
}
