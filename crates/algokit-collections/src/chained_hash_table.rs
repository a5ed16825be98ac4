use crate::hashing::BucketIndexer;
use crate::list::List;
use algokit_core::BucketStore;
use rustc_hash::FxBuildHasher;
use std::hash::{BuildHasher, Hash};

/// Hash table with separate chaining. Not thread-safe; see the concurrent
/// crate for the per-bucket locked variant.
///
/// Duplicate inserts are kept as separate entries in the same bucket.
#[derive(Debug, Clone)]
pub struct ChainedHashTable<T, S = FxBuildHasher> {
    buckets: Vec<List<T>>,
    indexer: BucketIndexer<S>,
    len: usize,
}

impl<T: Hash + Eq> ChainedHashTable<T, FxBuildHasher> {
    pub fn new(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, FxBuildHasher)
    }
}

impl<T: Hash + Eq, S: BuildHasher> ChainedHashTable<T, S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        let indexer = BucketIndexer::with_hasher(bucket_count, hash_builder);
        let buckets = (0..bucket_count).map(|_| List::new()).collect();
        Self {
            buckets,
            indexer,
            len: 0,
        }
    }

    pub fn insert(&mut self, data: T) {
        let index = self.indexer.index_of(&data);
        BucketStore::insert(&mut self.buckets[index], data);
        self.len += 1;
    }

    pub fn remove(&mut self, data: &T) -> bool {
        let index = self.indexer.index_of(data);
        if BucketStore::remove(&mut self.buckets[index], data) {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    pub fn lookup(&self, data: &T) -> Option<&T> {
        BucketStore::lookup(&self.buckets[self.indexer.index_of(data)], data)
    }

    pub fn contains(&self, data: &T) -> bool {
        self.lookup(data).is_some()
    }

    pub fn bucket_index(&self, data: &T) -> usize {
        self.indexer.index_of(data)
    }

    pub fn bucket_count(&self) -> usize {
        self.indexer.bucket_count()
    }

    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(List::len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.iter().flat_map(List::iter)
    }
}
