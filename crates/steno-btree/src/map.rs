// OrderedMap: B-tree map from keys to values.

use std::borrow::Borrow;
use std::fmt;

use crate::cursor;
use crate::tree::{BTree, Keyed};

pub(crate) struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K: Ord, V> Keyed for MapEntry<K, V> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Clone, V: Clone> Clone for MapEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// Ordered map backed by a B-tree.
pub struct OrderedMap<K, V> {
    tree: BTree<MapEntry<K, V>>,
}

impl<K: Ord, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self { tree: BTree::new() }
    }

    /// A map whose nodes split at `max_size` entries.
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

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cursor = self.tree.lower_bound_by_mut(|e| e.key.borrow().cmp(key));
        match cursor.current() {
            Some(e) if e.key.borrow() == key => {}
            _ => return None,
        }
        cursor.into_current_mut().map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> Option<&MapEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entry = self
            .tree
            .lower_bound_by(|e| e.key.borrow().cmp(key))
            .current()?;
        (entry.key.borrow() == key).then_some(entry)
    }

    /// Insert or replace; returns the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert(MapEntry { key, value }).map(|old| old.value)
    }

    /// Insert only if `key` is absent. Returns whether the entry was added.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        self.tree.insert_if_absent(MapEntry { key, value }).is_ok()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.tree.lower_bound_by_mut(|e| e.key.borrow().cmp(key));
        match cursor.current() {
            Some(e) if e.key.borrow() == key => {}
            _ => return None,
        }
        cursor.remove_current().map(|e| (e.key, e.value))
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|e| (&e.key, &e.value))
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|e| (&e.key, &e.value))
    }

    /// Insert pairs, appending in bulk while keys arrive strictly ascending.
    pub fn extend_sorted<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        self.tree
            .extend_sorted(pairs.into_iter().map(|(key, value)| MapEntry { key, value }));
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Entries with keys not less than `key`, ascending.
    pub fn range_from<Q>(&self, key: &Q) -> impl Iterator<Item = (&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .lower_bound_by(|e| e.key.borrow().cmp(key))
            .into_tail()
            .map(|e| (&e.key, &e.value))
    }

    /// Exclusive cursor on the smallest entry.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut {
            inner: self.tree.cursor_front_mut(),
        }
    }

    /// Exclusive cursor on the first entry with key not less than `key`.
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        CursorMut {
            inner: self.tree.lower_bound_by_mut(|e| e.key.borrow().cmp(key)),
        }
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut keep: F) {
        let mut cursor = self.tree.cursor_front_mut();
        while let Some(entry) = cursor.current_mut() {
            if keep(&entry.key, &mut entry.value) {
                cursor.move_next();
            } else {
                cursor.remove_current();
            }
        }
    }

    /// Check the underlying tree's structural invariants.
    pub fn validate(&self) -> Result<(), crate::InvariantError> {
        self.tree.validate()
    }

    /// Height of the underlying tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }
}

impl<K: Ord, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend_sorted(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord + PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.tree.into_iter(),
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// In-order iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    inner: cursor::Iter<'a, MapEntry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| (&e.key, &e.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Owning in-order iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    inner: cursor::IntoIter<MapEntry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back().map(|e| (e.key, e.value))
    }
}

/// Exclusive map cursor supporting value updates and removal.
pub struct CursorMut<'a, K, V> {
    inner: cursor::CursorMut<'a, MapEntry<K, V>>,
}

impl<K: Ord, V> CursorMut<'_, K, V> {
    pub fn key(&self) -> Option<&K> {
        self.inner.current().map(|e| &e.key)
    }

    pub fn value(&self) -> Option<&V> {
        self.inner.current().map(|e| &e.value)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.inner.current_mut().map(|e| &mut e.value)
    }

    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// Remove the current entry and move to its successor.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        self.inner.remove_current().map(|e| (e.key, e.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_replace() {
        let mut map = OrderedMap::with_max_size(3);
        assert_eq!(map.insert("b".to_string(), 2), None);
        assert_eq!(map.insert("a".to_string(), 1), None);
        assert_eq!(map.insert("b".to_string(), 20), Some(2));
        assert_eq!(map.get("b"), Some(&20));
        assert_eq!(map.get("zz"), None);
        assert_eq!(map.len(), 2);
        assert!(!map.insert_if_absent("a".to_string(), 5));
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn remove_and_get_mut() {
        let mut map: OrderedMap<u32, String> = (0..20).map(|i| (i, i.to_string())).collect();
        map.get_mut(&7).unwrap().push('!');
        assert_eq!(map.get(&7).map(String::as_str), Some("7!"));
        assert_eq!(map.remove(&7).as_deref(), Some("7!"));
        assert_eq!(map.remove(&7), None);
        assert!(map.get_mut(&7).is_none());
        map.validate().unwrap();
    }

    #[test]
    fn ordered_iteration_and_range() {
        let map: OrderedMap<u32, u32> = [(5, 50), (1, 10), (3, 30)].into_iter().collect();
        let keys: Vec<u32> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 5]);
        let tail: Vec<(u32, u32)> = map.range_from(&2).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(tail, vec![(3, 30), (5, 50)]);
        assert_eq!(map.first_key_value(), Some((&1, &10)));
        assert_eq!(map.last_key_value(), Some((&5, &50)));
    }

    #[test]
    fn cursor_updates_and_removes() {
        let mut map: OrderedMap<u32, u32> = (0..30).map(|i| (i, i)).collect();
        let mut cursor = map.lower_bound_mut(&10);
        while let Some(&k) = cursor.key() {
            if k >= 20 {
                break;
            }
            if k % 3 == 0 {
                cursor.remove_current();
            } else {
                if let Some(v) = cursor.value_mut() {
                    *v *= 100;
                }
                cursor.move_next();
            }
        }
        map.validate().unwrap();
        assert_eq!(map.get(&12), None);
        assert_eq!(map.get(&13), Some(&1300));
        assert_eq!(map.get(&9), Some(&9));
        assert_eq!(map.get(&21), Some(&21));
    }

    #[test]
    fn retain_filters_in_place() {
        let mut map: OrderedMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
        map.retain(|k, v| {
            *v += 1;
            k % 10 == 0
        });
        map.validate().unwrap();
        let kept: Vec<(u32, u32)> = map.into_iter().collect();
        assert_eq!(kept, (0..10).map(|i| (i * 10, i * 10 + 1)).collect::<Vec<_>>());
    }
}
