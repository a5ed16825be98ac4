use algokit_core::{MergeSorter, SortError};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::iter::Peekable;
use std::vec;

/// Length of the left half when splitting a range of `len` elements.
///
/// For an inclusive range `[lo, hi]` the left half is `[lo, floor((lo + hi) / 2)]`,
/// so it holds the extra element when `len` is odd.
#[inline]
pub fn split_point(len: usize) -> usize {
    (len + 1) / 2
}

pub fn merge_sort<T: Ord + Clone>(v: &mut [T]) {
    merge_sort_by(v, T::cmp)
}

pub fn merge_sort_by<T, F>(v: &mut [T], mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let outcome: Result<(), Infallible> = try_merge_sort_by(v, |a, b| Ok(compare(a, b)));
    if let Err(never) = outcome {
        match never {}
    }
}

/// Top-down merge sort with a fallible comparator.
///
/// Stops at the first comparator error. The slice is left as a permutation of
/// its input either way.
pub fn try_merge_sort_by<T, E, F>(v: &mut [T], mut compare: F) -> Result<(), E>
where
    T: Clone,
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    sort_range(v, &mut compare)
}

fn sort_range<T, E, F>(v: &mut [T], compare: &mut F) -> Result<(), E>
where
    T: Clone,
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    if v.len() < 2 {
        return Ok(());
    }
    let mid = split_point(v.len());
    let (left, right) = v.split_at_mut(mid);
    sort_range(left, compare)?;
    sort_range(right, compare)?;
    merge(v, mid, &mut *compare)
}

/// Merge the sorted runs `v[..mid]` and `v[mid..]` in place.
///
/// Both runs are copied out first; on ties the left run wins, which keeps the
/// merge stable. If `compare` fails or panics, the unmerged remainder of both
/// runs is written back so no element is lost or duplicated.
pub fn merge<T, E, F>(v: &mut [T], mid: usize, mut compare: F) -> Result<(), E>
where
    T: Clone,
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    if mid == 0 || mid >= v.len() {
        return Ok(());
    }

    let left = v[..mid].to_vec().into_iter().peekable();
    let right = v[mid..].to_vec().into_iter().peekable();
    let mut runs = PendingRuns {
        dest: v,
        left,
        right,
        written: 0,
    };

    while let (Some(l), Some(r)) = (runs.left.peek(), runs.right.peek()) {
        let take_left = compare(l, r)? != Ordering::Greater;
        let next = if take_left {
            runs.left.next()
        } else {
            runs.right.next()
        };
        if let Some(item) = next {
            runs.push(item);
        }
    }
    Ok(())
}

/// Runs still being merged into `dest[written..]`.
///
/// Dropping it flushes whatever is left of the left run and then the right
/// run, on normal return, early error return and unwinding alike.
struct PendingRuns<'a, T> {
    dest: &'a mut [T],
    left: Peekable<vec::IntoIter<T>>,
    right: Peekable<vec::IntoIter<T>>,
    written: usize,
}

impl<T> PendingRuns<'_, T> {
    #[inline]
    fn push(&mut self, item: T) {
        self.dest[self.written] = item;
        self.written += 1;
    }
}

impl<T> Drop for PendingRuns<'_, T> {
    fn drop(&mut self) {
        while let Some(item) = self.left.next().or_else(|| self.right.next()) {
            self.push(item);
        }
    }
}

/// The single-threaded baseline every parallel sorter is checked against.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialMergeSort;

impl MergeSorter for SequentialMergeSort {
    fn try_sort_by<T, E, F>(&self, v: &mut [T], compare: F) -> Result<(), SortError<E>>
    where
        T: Clone + Send,
        E: Send,
        F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
    {
        try_merge_sort_by(v, &compare).map_err(SortError::Comparator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_small_inputs() {
        let mut empty: Vec<i32> = vec![];
        merge_sort(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![42];
        merge_sort(&mut one);
        assert_eq!(one, vec![42]);

        let mut v = vec![5, 2, 8, 1, 9];
        merge_sort(&mut v);
        assert_eq!(v, vec![1, 2, 5, 8, 9]);
    }

    #[test]
    fn sorts_duplicates_and_reversed() {
        let mut dup = vec![5, 2, 8, 2, 9, 5];
        merge_sort(&mut dup);
        assert_eq!(dup, vec![2, 2, 5, 5, 8, 9]);

        let mut rev: Vec<u32> = (0..1000).rev().collect();
        merge_sort(&mut rev);
        assert_eq!(rev, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn split_point_matches_inclusive_midpoint() {
        // [0, 4] splits after index 2, [0, 3] after index 1
        assert_eq!(split_point(5), 3);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(1), 1);
    }

    #[test]
    fn merge_prefers_left_on_ties() {
        let mut v = vec![(1, 'a'), (3, 'a'), (1, 'b'), (2, 'b')];
        merge(&mut v, 2, |x: &(i32, char), y: &(i32, char)| {
            Ok::<_, Infallible>(x.0.cmp(&y.0))
        })
        .unwrap();
        assert_eq!(v, vec![(1, 'a'), (1, 'b'), (2, 'b'), (3, 'a')]);
    }

    #[test]
    fn stable_for_equal_keys() {
        let mut v: Vec<(u8, usize)> = (0..50).map(|i| ((i % 3) as u8, i)).collect();
        merge_sort_by(&mut v, |a, b| a.0.cmp(&b.0));
        for w in v.windows(2) {
            assert!(w[0].0 < w[1].0 || (w[0].0 == w[1].0 && w[0].1 < w[1].1));
        }
    }

    #[test]
    fn comparator_error_keeps_a_permutation() {
        let mut v: Vec<i32> = (0..64).rev().collect();
        let mut calls = 0;
        let result = try_merge_sort_by(&mut v, |a: &i32, b: &i32| {
            calls += 1;
            if calls == 40 {
                Err("boom")
            } else {
                Ok(a.cmp(b))
            }
        });
        assert_eq!(result, Err("boom"));
        let mut check = v.clone();
        check.sort();
        assert_eq!(check, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn comparator_panic_keeps_a_permutation() {
        use std::panic::{self, AssertUnwindSafe};

        let mut v: Vec<i32> = (0..64).rev().collect();
        let mut calls = 0;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            merge_sort_by(&mut v, |a: &i32, b: &i32| {
                calls += 1;
                if calls == 151 {
                    panic!("comparator gave up");
                }
                a.cmp(b)
            })
        }));
        assert!(outcome.is_err());
        let mut check = v.clone();
        check.sort();
        assert_eq!(check, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn merge_panic_flushes_both_runs() {
        use std::panic::{self, AssertUnwindSafe};

        let mut v = vec![1, 4, 7, 2, 3, 9];
        let mut calls = 0;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            merge(&mut v, 3, |a: &i32, b: &i32| {
                calls += 1;
                if calls == 3 {
                    panic!("comparator gave up");
                }
                Ok::<_, Infallible>(a.cmp(b))
            })
        }));
        assert!(outcome.is_err());
        // 1 and 2 were placed, then the rest of the left run, then the right
        assert_eq!(v, vec![1, 2, 4, 7, 3, 9]);
    }

    #[test]
    fn sequential_sorter_trait() {
        let mut words = vec!["zebra", "apple", "mango", "banana", "cherry"];
        SequentialMergeSort.sort(&mut words);
        assert_eq!(words, vec!["apple", "banana", "cherry", "mango", "zebra"]);
    }
}
