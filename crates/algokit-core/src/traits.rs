use std::cmp::Ordering;
use std::convert::Infallible;

use crate::error::SortError;

/// A merge-sort driver. Implementors differ only in how they schedule the
/// recursion; all of them produce identical output for identical input.
pub trait MergeSorter {
    /// Sort `v` with a comparator that may fail. On failure the slice is still
    /// a permutation of its input, but not necessarily ordered.
    fn try_sort_by<T, E, F>(&self, v: &mut [T], compare: F) -> Result<(), SortError<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> Result<Ordering, E> + Sync;

    fn sort_by<T, F>(&self, v: &mut [T], compare: F)
    where
        T: Clone + Send,
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        let outcome: Result<(), SortError<Infallible>> =
            self.try_sort_by(v, |a, b| Ok(compare(a, b)));
        match outcome {
            Ok(()) => {}
            Err(SortError::Comparator(never)) => match never {},
            // Cancellation is only ever triggered by a recorded failure.
            Err(SortError::Cancelled) => unreachable!("infallible sort was cancelled"),
        }
    }

    fn sort<T>(&self, v: &mut [T])
    where
        T: Ord + Clone + Send,
    {
        self.sort_by(v, T::cmp)
    }
}

/// The container contract a hash table bucket has to satisfy: append,
/// remove-by-equality and lookup-by-equality.
pub trait BucketStore<T> {
    fn insert(&mut self, value: T);

    /// Remove one element equal to `value`. Returns whether anything was removed.
    fn remove(&mut self, value: &T) -> bool;

    fn lookup(&self, value: &T) -> Option<&T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
