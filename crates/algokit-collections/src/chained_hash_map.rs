use crate::hashing::BucketIndexer;
use crate::list::List;
use rustc_hash::FxBuildHasher;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Key/value map with separate chaining. Each key appears at most once.
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V, S = FxBuildHasher> {
    buckets: Vec<List<Entry<K, V>>>,
    indexer: BucketIndexer<S>,
    len: usize,
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V, FxBuildHasher> {
    pub fn new(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, FxBuildHasher)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedHashMap<K, V, S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        let indexer = BucketIndexer::with_hasher(bucket_count, hash_builder);
        let buckets = (0..bucket_count).map(|_| List::new()).collect();
        Self {
            buckets,
            indexer,
            len: 0,
        }
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let bucket = &mut self.buckets[self.indexer.index_of(&key)];
        if let Some(entry) = bucket.find_mut(|e| e.key == key) {
            return Some(mem::replace(&mut entry.value, value));
        }
        bucket.insert_next(Entry { key, value });
        self.len += 1;
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets[self.indexer.index_of(key)]
            .find(|e| Borrow::<Q>::borrow(&e.key) == key)
            .map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.indexer.index_of(key);
        self.buckets[index]
            .find_mut(|e| Borrow::<Q>::borrow(&e.key) == key)
            .map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Remove the mapping for `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.indexer.index_of(key);
        let removed =
            self.buckets[index].remove_first_where(|e| Borrow::<Q>::borrow(&e.key) == key)?;
        self.len -= 1;
        Some(removed.value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.buckets.iter().flat_map(List::iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_existing_value() {
        let mut map = ChainedHashMap::new(8);
        assert_eq!(map.put("one".to_string(), 1), None);
        assert_eq!(map.put("two".to_string(), 2), None);
        assert_eq!(map.put("one".to_string(), 11), Some(1));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("one"), Some(&11));
    }

    #[test]
    fn remove_returns_value() {
        let mut map = ChainedHashMap::new(2);
        for i in 0..10 {
            map.put(i, i * 10);
        }
        assert_eq!(map.remove(&3), Some(30));
        assert_eq!(map.remove(&3), None);
        assert!(!map.contains_key(&3));
        assert_eq!(map.len(), 9);
        assert_eq!(map.iter().count(), 9);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut map = ChainedHashMap::new(4);
        map.put('a', vec![1]);
        if let Some(v) = map.get_mut(&'a') {
            v.push(2);
        }
        assert_eq!(map.get(&'a'), Some(&vec![1, 2]));
        assert!(map.get(&'b').is_none());
    }

    #[test]
    fn replacing_last_entry_then_adding_a_colliding_key() {
        use crate::hashing::IdentityBuildHasher;

        let mut map: ChainedHashMap<u64, &str, IdentityBuildHasher> =
            ChainedHashMap::with_hasher(3, IdentityBuildHasher::default());
        assert_eq!(map.put(0, "a"), None);
        assert_eq!(map.put(0, "b"), Some("a"));
        // 3 lands in the same bucket as 0
        assert_eq!(map.put(3, "c"), None);
        assert_eq!(map.put(6, "d"), None);
        assert_eq!(map.put(3, "e"), Some("c"));

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&0), Some(&"b"));
        assert_eq!(map.get(&3), Some(&"e"));
        assert_eq!(map.get(&6), Some(&"d"));
        assert_eq!(map.remove(&6), Some("d"));
        assert_eq!(map.put(9, "f"), None);
        assert_eq!(map.iter().count(), 3);
    }
}
