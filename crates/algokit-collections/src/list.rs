use algokit_core::BucketStore;
use std::collections::vec_deque;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FromIterator;

/// Ordered sequence with O(1) append and O(1) removal at the front.
///
/// Used as the bucket type of the chained hash tables, where insertion order
/// within a bucket is the order of `insert_next` calls. Removal by predicate
/// keeps the relative order of the remaining elements.
#[derive(Clone, PartialEq, Eq)]
pub struct List<T> {
    items: VecDeque<T>,
}

impl<T> List<T> {
    pub const fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append at the end of the list.
    pub fn insert_next(&mut self, data: T) {
        self.items.push_back(data);
    }

    pub fn push_front(&mut self, data: T) {
        self.items.push_front(data);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Unlink and return the first element matching `pred`.
    pub fn remove_first_where<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let pos = self.items.iter().position(|item| pred(item))?;
        self.items.remove(pos)
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| pred(*item))
    }

    pub fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter_mut().find(|item| pred(&**item))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter(self.items.iter())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: PartialEq> List<T> {
    /// Remove the first element equal to `data`.
    pub fn remove(&mut self, data: &T) -> bool {
        self.remove_first_where(|item| item == data).is_some()
    }

    pub fn lookup(&self, data: &T) -> Option<&T> {
        self.find(|item| item == data)
    }

    pub fn contains(&self, data: &T) -> bool {
        self.lookup(data).is_some()
    }
}

impl<T: PartialEq> BucketStore<T> for List<T> {
    fn insert(&mut self, value: T) {
        self.insert_next(value);
    }

    fn remove(&mut self, value: &T) -> bool {
        List::remove(self, value)
    }

    fn lookup(&self, value: &T) -> Option<&T> {
        List::lookup(self, value)
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

pub struct Iter<'a, T>(vec_deque::Iter<'a, T>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter<T>(vec_deque::IntoIter<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.items.into_iter())
    }
}
