use algokit_collections::ChainedHashTable;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use std::hash::{BuildHasher, Hash};

use crate::hash_table::ConcurrentSet;

/// A chained table behind one mutex. Used as the baseline the fine-grained
/// table is measured against.
pub struct GlobalLockHashTable<T, S = FxBuildHasher> {
    inner: Mutex<ChainedHashTable<T, S>>,
}

impl<T: Hash + Eq> GlobalLockHashTable<T, FxBuildHasher> {
    pub fn new(bucket_count: usize) -> Self {
        Self {
            inner: Mutex::new(ChainedHashTable::new(bucket_count)),
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> GlobalLockHashTable<T, S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        Self {
            inner: Mutex::new(ChainedHashTable::with_hasher(bucket_count, hash_builder)),
        }
    }

    pub fn insert(&self, value: T) {
        self.inner.lock().insert(value);
    }

    pub fn remove(&self, value: &T) -> bool {
        self.inner.lock().remove(value)
    }

    pub fn lookup(&self, value: &T) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().lookup(value).cloned()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.lock().contains(value)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }
}

impl<T, S> ConcurrentSet<T> for GlobalLockHashTable<T, S>
where
    T: Hash + Eq + Send,
    S: BuildHasher + Send,
{
    fn insert(&self, value: T) {
        GlobalLockHashTable::insert(self, value)
    }

    fn remove(&self, value: &T) -> bool {
        GlobalLockHashTable::remove(self, value)
    }

    fn contains(&self, value: &T) -> bool {
        GlobalLockHashTable::contains(self, value)
    }

    fn size(&self) -> usize {
        GlobalLockHashTable::size(self)
    }
}
