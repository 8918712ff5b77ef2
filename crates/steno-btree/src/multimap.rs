// OrderedMultiMap: B-tree map from a key to a set of values.
//
// Each distinct (key, value) pair is one tree entry ordered by key and then
// value, so all values of a key are adjacent and come out sorted.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::cursor;
use crate::tree::{BTree, Keyed};

#[derive(Clone)]
pub(crate) struct MultiEntry<K, V> {
    pair: (K, V),
}

impl<K: Ord, V: Ord> Keyed for MultiEntry<K, V> {
    type Key = (K, V);

    fn key(&self) -> &(K, V) {
        &self.pair
    }
}

/// Ordered multimap backed by a B-tree.
#[derive(Clone)]
pub struct OrderedMultiMap<K, V> {
    tree: BTree<MultiEntry<K, V>>,
}

fn by_pair<'q, K, V, Q, R>(key: &'q Q, value: &'q R) -> impl FnMut(&MultiEntry<K, V>) -> Ordering + 'q
where
    K: Borrow<Q>,
    V: Borrow<R>,
    Q: Ord + ?Sized,
    R: Ord + ?Sized,
{
    move |e: &MultiEntry<K, V>| {
        e.pair
            .0
            .borrow()
            .cmp(key)
            .then_with(|| e.pair.1.borrow().cmp(value))
    }
}

impl<K: Ord, V: Ord> OrderedMultiMap<K, V> {
    pub fn new() -> Self {
        Self { tree: BTree::new() }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            tree: BTree::with_max_size(max_size),
        }
    }

    /// Number of (key, value) pairs.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Add a pair; returns false if the exact pair was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree
            .insert_if_absent(MultiEntry { pair: (key, value) })
            .is_ok()
    }

    pub fn contains<Q, R>(&self, key: &Q, value: &R) -> bool
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Ord + ?Sized,
        R: Ord + ?Sized,
    {
        let mut target = by_pair(key, value);
        self.tree
            .lower_bound_by(&mut target)
            .current()
            .is_some_and(|e| target(e) == Ordering::Equal)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_all(key).next().is_some()
    }

    /// All values stored under `key`, ascending.
    pub fn get_all<Q>(&self, key: &Q) -> impl Iterator<Item = &V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .lower_bound_by(|e| e.pair.0.borrow().cmp(key))
            .into_tail()
            .take_while(move |e| e.pair.0.borrow() == key)
            .map(|e| &e.pair.1)
    }

    /// Remove one pair; returns whether it was present.
    pub fn remove<Q, R>(&mut self, key: &Q, value: &R) -> bool
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Ord + ?Sized,
        R: Ord + ?Sized,
    {
        let mut target = by_pair(key, value);
        let mut cursor = self.tree.lower_bound_by_mut(&mut target);
        let found = cursor
            .current()
            .is_some_and(|e| target(e) == Ordering::Equal);
        found && cursor.remove_current().is_some()
    }

    /// Remove every value under `key`, returning them in ascending order.
    pub fn remove_all<Q>(&mut self, key: &Q) -> Vec<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut removed = Vec::new();
        let mut cursor = self.tree.lower_bound_by_mut(|e| e.pair.0.borrow().cmp(key));
        while cursor.current().is_some_and(|e| e.pair.0.borrow() == key) {
            if let Some(entry) = cursor.remove_current() {
                removed.push(entry.pair.1);
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Add pairs, appending in bulk while they arrive strictly ascending.
    pub fn extend_sorted<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        self.tree
            .extend_sorted(pairs.into_iter().map(|pair| MultiEntry { pair }));
    }

    /// All pairs, ordered by key then value.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.tree.iter().map(|e| (&e.pair.0, &e.pair.1))
    }

    pub fn validate(&self) -> Result<(), crate::InvariantError> {
        self.tree.validate()
    }
}

impl<K: Ord, V: Ord> Default for OrderedMultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: Ord + fmt::Debug> fmt::Debug for OrderedMultiMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: Ord, V: Ord> FromIterator<(K, V)> for OrderedMultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend_sorted(iter);
        map
    }
}

impl<K: Ord, V: Ord> Extend<(K, V)> for OrderedMultiMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Owning iterator over the pairs of a multimap.
pub struct IntoIter<K, V> {
    inner: cursor::IntoIter<MultiEntry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|e| e.pair)
    }
}

impl<K, V> IntoIterator for OrderedMultiMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.tree.into_iter(),
        }
    }
}
