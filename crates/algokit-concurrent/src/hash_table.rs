use algokit_collections::{BucketIndexer, List};
use algokit_core::{AlgoError, Result, TableConfig};
use crossbeam_utils::CachePadded;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

/// The operations the table stress drivers and benches exercise, so the
/// fine-grained table can be measured against a single-lock baseline.
pub trait ConcurrentSet<T>: Send + Sync {
    fn insert(&self, value: T);
    fn remove(&self, value: &T) -> bool;
    fn contains(&self, value: &T) -> bool;
    fn size(&self) -> usize;
}

/// Lookup hit/miss counters, one cache line each.
#[derive(Debug, Default)]
pub struct TableStats {
    hits: CachePadded<AtomicU64>,
    misses: CachePadded<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
}

impl TableStats {
    #[inline]
    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> TableStatsSnapshot {
        TableStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Hash table with one reader/writer lock per bucket.
///
/// Every operation takes exactly one bucket lock, releases it, and only then
/// touches the element counter. The counter is a standalone atomic, so it is
/// exact once all in-flight operations have returned and may briefly trail the
/// buckets while they run. Bucket count is fixed at construction.
///
/// Locks are `parking_lot` rwlocks: eventually fair, so a steady stream of
/// readers cannot starve a writer on the same bucket indefinitely.
pub struct FineGrainedHashTable<T, S = FxBuildHasher> {
    buckets: Box<[RwLock<List<T>>]>,
    indexer: BucketIndexer<S>,
    size: CachePadded<AtomicUsize>,
    stats: TableStats,
}

impl<T: Hash + Eq> FineGrainedHashTable<T, FxBuildHasher> {
    /// # Panics
    /// If `bucket_count` is zero.
    pub fn new(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, FxBuildHasher)
    }

    pub fn from_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.bucket_count))
    }
}

impl<T: Hash + Eq, S: BuildHasher> FineGrainedHashTable<T, S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        let indexer = BucketIndexer::with_hasher(bucket_count, hash_builder);
        let buckets = (0..bucket_count)
            .map(|_| RwLock::new(List::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        debug!(bucket_count, "created fine-grained hash table");
        Self {
            buckets,
            indexer,
            size: CachePadded::new(AtomicUsize::new(0)),
            stats: TableStats::default(),
        }
    }

    pub fn try_with_hasher(bucket_count: usize, hash_builder: S) -> Result<Self> {
        if bucket_count == 0 {
            return Err(AlgoError::InvalidConfig(
                "bucket count must be > 0".into(),
            ));
        }
        Ok(Self::with_hasher(bucket_count, hash_builder))
    }

    #[inline]
    pub fn bucket_index(&self, value: &T) -> usize {
        self.indexer.index_of(value)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Append `value` to its bucket. Equal values may be stored more than once.
    pub fn insert(&self, value: T) {
        let idx = self.bucket_index(&value);
        self.buckets[idx].write().insert_next(value);
        self.size.fetch_add(1, Ordering::AcqRel);
    }

    /// Remove the first element equal to `value` in its bucket.
    pub fn remove(&self, value: &T) -> bool {
        let idx = self.bucket_index(value);
        let removed = self.buckets[idx].write().remove(value);
        if removed {
            self.size.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    /// Run `f` on the stored element equal to `value`, under the bucket's read lock.
    pub fn lookup_with<R, F>(&self, value: &T, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let idx = self.bucket_index(value);
        let bucket = self.buckets[idx].read();
        let found = bucket.lookup(value).map(f);
        drop(bucket);
        self.stats.record(found.is_some());
        found
    }

    pub fn lookup(&self, value: &T) -> Option<T>
    where
        T: Clone,
    {
        self.lookup_with(value, T::clone)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.lookup_with(value, |_| ()).is_some()
    }

    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(|bucket| bucket.read().len())
    }

    /// Copy out every element, bucket by bucket.
    ///
    /// Read locks are taken in ascending bucket order and all held until the
    /// copy is done, so the result is a consistent cut across buckets. Any
    /// other operation that needs more than one bucket lock must use the same
    /// order.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        let guards: Vec<_> = self.buckets.iter().map(|bucket| bucket.read()).collect();
        let total = guards.iter().map(|g| g.len()).sum();
        let mut out = Vec::with_capacity(total);
        for guard in &guards {
            out.extend(guard.iter().cloned());
        }
        out
    }

    pub fn stats(&self) -> TableStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T, S> ConcurrentSet<T> for FineGrainedHashTable<T, S>
where
    T: Hash + Eq + Send + Sync,
    S: BuildHasher + Send + Sync,
{
    fn insert(&self, value: T) {
        FineGrainedHashTable::insert(self, value)
    }

    fn remove(&self, value: &T) -> bool {
        FineGrainedHashTable::remove(self, value)
    }

    fn contains(&self, value: &T) -> bool {
        FineGrainedHashTable::contains(self, value)
    }

    fn size(&self) -> usize {
        FineGrainedHashTable::size(self)
    }
}
