// OrderedSet: B-tree set of keys.

use std::borrow::Borrow;
use std::fmt;

use crate::cursor;
use crate::tree::{BTree, Keyed};

#[derive(Clone)]
pub(crate) struct SetEntry<K>(K);

impl<K: Ord> Keyed for SetEntry<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.0
    }
}

/// Ordered set backed by a B-tree.
#[derive(Clone)]
pub struct OrderedSet<K> {
    tree: BTree<SetEntry<K>>,
}

impl<K: Ord> OrderedSet<K> {
    pub fn new() -> Self {
        Self { tree: BTree::new() }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            tree: BTree::with_max_size(max_size),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .lower_bound_by(|e| e.0.borrow().cmp(value))
            .current()
            .is_some_and(|e| e.0.borrow() == value)
    }

    /// Add `value`; returns false if it was already present.
    pub fn insert(&mut self, value: K) -> bool {
        self.tree.insert_if_absent(SetEntry(value)).is_ok()
    }

    /// Add or replace `value`, returning the replaced element.
    pub fn replace(&mut self, value: K) -> Option<K> {
        self.tree.insert(SetEntry(value)).map(|e| e.0)
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    pub fn take<Q>(&mut self, value: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.tree.lower_bound_by_mut(|e| e.0.borrow().cmp(value));
        match cursor.current() {
            Some(e) if e.0.borrow() == value => {}
            _ => return None,
        }
        cursor.remove_current().map(|e| e.0)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|e| &e.0)
    }

    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|e| &e.0)
    }

    /// Add values, appending in bulk while they arrive strictly ascending.
    pub fn extend_sorted<I: IntoIterator<Item = K>>(&mut self, values: I) {
        self.tree.extend_sorted(values.into_iter().map(SetEntry));
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Elements not less than `value`, ascending.
    pub fn range_from<Q>(&self, value: &Q) -> impl Iterator<Item = &K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .lower_bound_by(|e| e.0.borrow().cmp(value))
            .into_tail()
            .map(|e| &e.0)
    }

    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        let mut cursor = self.tree.cursor_front_mut();
        while let Some(entry) = cursor.current() {
            if keep(&entry.0) {
                cursor.move_next();
            } else {
                cursor.remove_current();
            }
        }
    }

    pub fn validate(&self) -> Result<(), crate::InvariantError> {
        self.tree.validate()
    }
}

impl<K: Ord> Default for OrderedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for OrderedSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for OrderedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend_sorted(iter);
        set
    }
}

impl<K: Ord> Extend<K> for OrderedSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<K: Ord> PartialEq for OrderedSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Ord> Eq for OrderedSet<K> {}

impl<'a, K: Ord> IntoIterator for &'a OrderedSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// In-order iterator over set elements.
pub struct Iter<'a, K> {
    inner: cursor::Iter<'a, SetEntry<K>>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|e| &e.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| &e.0)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_remove() {
        let mut set = OrderedSet::with_max_size(3);
        for w in ["pear", "apple", "fig", "apple"] {
            set.insert(w.to_string());
        }
        assert_eq!(set.len(), 3);
        assert!(set.contains("fig"));
        assert!(!set.contains("kiwi"));
        assert!(set.remove("fig"));
        assert!(!set.remove("fig"));
        let items: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(items, ["apple", "pear"]);
    }

    #[test]
    fn from_iter_and_range() {
        let set: OrderedSet<u32> = [9, 1, 5, 3, 7].into_iter().collect();
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&9));
        let tail: Vec<u32> = set.range_from(&4).copied().collect();
        assert_eq!(tail, vec![5, 7, 9]);
        let back: Vec<u32> = set.iter().rev().copied().collect();
        assert_eq!(back, vec![9, 7, 5, 3, 1]);
    }

    #[test]
    fn retain_keeps_matching() {
        let mut set: OrderedSet<u32> = (0..200).collect();
        set.retain(|v| v % 7 == 0);
        set.validate().unwrap();
        assert_eq!(set.len(), 29);
        assert!(set.iter().all(|v| v % 7 == 0));
    }
}
