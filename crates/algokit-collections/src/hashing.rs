use rustc_hash::FxBuildHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

/// Maps values to a fixed number of buckets: `hash(value) mod bucket_count`.
///
/// The mapping depends only on the value and the hasher state, so equal values
/// always land in the same bucket for the lifetime of the indexer.
#[derive(Debug, Clone)]
pub struct BucketIndexer<S = FxBuildHasher> {
    bucket_count: usize,
    hash_builder: S,
}

impl BucketIndexer<FxBuildHasher> {
    pub fn new(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, FxBuildHasher)
    }
}

impl<S: BuildHasher> BucketIndexer<S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        assert!(bucket_count > 0, "bucket count must be > 0");
        Self {
            bucket_count,
            hash_builder,
        }
    }

    #[inline]
    pub fn index_of<Q: Hash + ?Sized>(&self, value: &Q) -> usize {
        (self.hash_builder.hash_one(value) % self.bucket_count as u64) as usize
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

/// Every write is folded into the state as `state * 31 + value`, where an
/// integer contributes its absolute value and a byte slice contributes each
/// byte in turn.
///
/// A single integer key therefore hashes to `|key|`, and its bucket is
/// `|key| mod bucket_count`, which makes collision layouts predictable.
/// Composite keys (strings, tuples) mix every field.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityHasher(u64);

pub type IdentityBuildHasher = BuildHasherDefault<IdentityHasher>;

impl IdentityHasher {
    #[inline]
    fn fold(&mut self, v: u64) {
        self.0 = self.0.wrapping_mul(31).wrapping_add(v);
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.fold(u64::from(b));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.fold(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.fold(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.fold(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.fold(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.fold(u64::from(i.unsigned_abs()));
    }

    fn write_i16(&mut self, i: i16) {
        self.fold(u64::from(i.unsigned_abs()));
    }

    fn write_i32(&mut self, i: i32) {
        self.fold(u64::from(i.unsigned_abs()));
    }

    fn write_i64(&mut self, i: i64) {
        self.fold(i.unsigned_abs());
    }

    fn write_isize(&mut self, i: isize) {
        self.fold(i.unsigned_abs() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_hasher_maps_integers_modulo() {
        let indexer = BucketIndexer::with_hasher(3, IdentityBuildHasher::default());
        assert_eq!(indexer.index_of(&0), 0);
        assert_eq!(indexer.index_of(&3), 0);
        assert_eq!(indexer.index_of(&6), 0);
        assert_eq!(indexer.index_of(&1), 1);
        assert_eq!(indexer.index_of(&4), 1);
        assert_eq!(indexer.index_of(&-4), 1);
    }

    #[test]
    fn identity_hasher_mixes_composite_keys() {
        let build = IdentityBuildHasher::default();
        assert_ne!(build.hash_one("ab"), build.hash_one("ba"));
        assert_ne!(build.hash_one("alpha"), build.hash_one("omega"));
        assert_ne!(build.hash_one((1u32, 2u32)), build.hash_one((3u32, 2u32)));
        assert_ne!(build.hash_one((1u32, 2u32)), build.hash_one((2u32, 1u32)));

        let indexer = BucketIndexer::with_hasher(64, build);
        let used: std::collections::HashSet<usize> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| indexer.index_of(*s))
            .collect();
        assert!(used.len() > 1);
    }

    #[test]
    fn default_indexer_is_stable_for_equal_values() {
        let indexer = BucketIndexer::new(17);
        let a = String::from("bucket");
        let b = String::from("bucket");
        assert_eq!(indexer.index_of(&a), indexer.index_of(&b));
        assert_eq!(indexer.index_of(&a), indexer.index_of("bucket"));
        assert!(indexer.index_of(&a) < 17);
    }

    #[test]
    #[should_panic(expected = "bucket count must be > 0")]
    fn zero_buckets_rejected() {
        let _ = BucketIndexer::new(0);
    }
}
