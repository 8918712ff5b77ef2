// Cursors and iterators over a B-tree.
//
// A position is a root-to-entry path of `(node, index)` frames. Ancestor
// frames name the child that was descended into; the top frame names the
// current entry. An empty path is the "ghost" position that sits between
// the last and the first entry.
//
// Invalidation rules:
// - `Cursor` and `Iter` borrow the tree shared, so nothing can move under
//   them.
// - `CursorMut` borrows the tree exclusively. Its own `remove_current`
//   rebuilds the path (the old frames go stale once nodes are rotated or
//   merged) by seeking to the lower bound of the removed key, which is the
//   removed entry's successor.

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::tree::{BTree, Frame, Keyed, by_key};

impl<E> BTree<E> {
    /// Extend `path` down to the smallest entry below `node`.
    pub(crate) fn descend_first(&self, mut node: usize, path: &mut Vec<Frame>) {
        loop {
            let n = &self.arena[node];
            match n.children.first() {
                Some(&child) => {
                    path.push((node, 0));
                    node = child;
                }
                None => {
                    if !n.entries.is_empty() {
                        path.push((node, 0));
                    }
                    return;
                }
            }
        }
    }

    /// Extend `path` down to the largest entry below `node`.
    pub(crate) fn descend_last(&self, mut node: usize, path: &mut Vec<Frame>) {
        loop {
            let n = &self.arena[node];
            match n.children.last() {
                Some(&child) => {
                    path.push((node, n.children.len() - 1));
                    node = child;
                }
                None => {
                    if let Some(last) = n.entries.len().checked_sub(1) {
                        path.push((node, last));
                    }
                    return;
                }
            }
        }
    }

    /// Advance `path` to the next entry, or to the ghost after the last.
    pub(crate) fn step_next(&self, path: &mut Vec<Frame>) {
        let Some(&(node, idx)) = path.last() else {
            return;
        };
        let top = path.len() - 1;
        let n = &self.arena[node];
        if !n.is_leaf() {
            // Successor is the leftmost entry of the right child.
            path[top].1 = idx + 1;
            self.descend_first(n.children[idx + 1], path);
            return;
        }
        if idx + 1 < n.len() {
            path[top].1 = idx + 1;
            return;
        }
        path.pop();
        while let Some(&(node, child)) = path.last() {
            if child < self.arena[node].len() {
                return;
            }
            path.pop();
        }
    }

    /// Move `path` to the previous entry, or to the ghost before the first.
    pub(crate) fn step_prev(&self, path: &mut Vec<Frame>) {
        let Some(&(node, idx)) = path.last() else {
            return;
        };
        let top = path.len() - 1;
        let n = &self.arena[node];
        if !n.is_leaf() {
            // Predecessor is the rightmost entry of the left child; the frame
            // index already names that child.
            self.descend_last(n.children[idx], path);
            return;
        }
        if idx > 0 {
            path[top].1 = idx - 1;
            return;
        }
        path.pop();
        while let Some(&(_, child)) = path.last() {
            if child > 0 {
                let top = path.len() - 1;
                path[top].1 = child - 1;
                return;
            }
            path.pop();
        }
    }

    /// Position `path` at the first entry for which `cmp` is not `Less`.
    pub(crate) fn seek<F>(&self, path: &mut Vec<Frame>, mut cmp: F)
    where
        F: FnMut(&E) -> Ordering,
    {
        path.clear();
        let mut node = self.root;
        loop {
            let n = &self.arena[node];
            let idx = n.entries.partition_point(|e| cmp(e) == Ordering::Less);
            path.push((node, idx));
            match n.children.get(idx) {
                Some(&child) => node = child,
                None => break,
            }
        }
        if let Some(&(leaf, idx)) = path.last() {
            if idx < self.arena[leaf].len() {
                return;
            }
        }
        path.pop();
        while let Some(&(node, child)) = path.last() {
            if child < self.arena[node].len() {
                return;
            }
            path.pop();
        }
    }

    pub(crate) fn entry_at(&self, path: &[Frame]) -> Option<&E> {
        let &(node, idx) = path.last()?;
        self.arena[node].entries.get(idx)
    }

    /// Iterate all entries in ascending order.
    pub fn iter(&self) -> Iter<'_, E> {
        let mut front = Vec::new();
        let mut back = Vec::new();
        self.descend_first(self.root, &mut front);
        self.descend_last(self.root, &mut back);
        Iter {
            tree: self,
            front,
            back,
            remaining: self.len(),
        }
    }

    /// A cursor on the smallest entry (the ghost if the tree is empty).
    pub fn cursor_front(&self) -> Cursor<'_, E> {
        let mut path = Vec::new();
        self.descend_first(self.root, &mut path);
        Cursor { tree: self, path }
    }

    /// A cursor on the largest entry (the ghost if the tree is empty).
    pub fn cursor_back(&self) -> Cursor<'_, E> {
        let mut path = Vec::new();
        self.descend_last(self.root, &mut path);
        Cursor { tree: self, path }
    }

    /// An exclusive cursor on the smallest entry.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, E> {
        let mut path = Vec::new();
        self.descend_first(self.root, &mut path);
        CursorMut { tree: self, path }
    }

    /// An exclusive cursor on the largest entry.
    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, E> {
        let mut path = Vec::new();
        self.descend_last(self.root, &mut path);
        CursorMut { tree: self, path }
    }

    /// A cursor on the first entry for which `cmp` is not `Less`.
    pub fn lower_bound_by<F>(&self, cmp: F) -> Cursor<'_, E>
    where
        F: FnMut(&E) -> Ordering,
    {
        let mut path = Vec::new();
        self.seek(&mut path, cmp);
        Cursor { tree: self, path }
    }

    /// An exclusive cursor on the first entry for which `cmp` is not `Less`.
    pub fn lower_bound_by_mut<F>(&mut self, cmp: F) -> CursorMut<'_, E>
    where
        F: FnMut(&E) -> Ordering,
    {
        let mut path = Vec::new();
        self.seek(&mut path, cmp);
        CursorMut { tree: self, path }
    }
}

impl<E: Keyed> BTree<E> {
    /// A cursor on the first entry whose key is not less than `key`.
    pub fn lower_bound(&self, key: &E::Key) -> Cursor<'_, E> {
        self.lower_bound_by(by_key(key))
    }

    /// An exclusive cursor on the first entry whose key is not less than
    /// `key`.
    pub fn lower_bound_mut(&mut self, key: &E::Key) -> CursorMut<'_, E> {
        let mut path = Vec::new();
        self.seek(&mut path, by_key(key));
        CursorMut { tree: self, path }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Shared bidirectional cursor.
pub struct Cursor<'a, E> {
    tree: &'a BTree<E>,
    path: Vec<Frame>,
}

impl<'a, E> Cursor<'a, E> {
    /// The entry under the cursor, `None` at the ghost position.
    pub fn current(&self) -> Option<&'a E> {
        self.tree.entry_at(&self.path)
    }

    /// Step forward. From the ghost this wraps to the first entry.
    pub fn move_next(&mut self) {
        if self.path.is_empty() {
            self.tree.descend_first(self.tree.root, &mut self.path);
        } else {
            self.tree.step_next(&mut self.path);
        }
    }

    /// Step backward. From the ghost this wraps to the last entry.
    pub fn move_prev(&mut self) {
        if self.path.is_empty() {
            self.tree.descend_last(self.tree.root, &mut self.path);
        } else {
            self.tree.step_prev(&mut self.path);
        }
    }

    /// Iterate from the cursor to the end.
    pub fn into_tail(self) -> Tail<'a, E> {
        Tail {
            tree: self.tree,
            path: self.path,
        }
    }
}

// ---------------------------------------------------------------------------
// CursorMut
// ---------------------------------------------------------------------------

/// Exclusive bidirectional cursor that can remove entries.
pub struct CursorMut<'a, E> {
    tree: &'a mut BTree<E>,
    path: Vec<Frame>,
}

impl<E> CursorMut<'_, E> {
    pub fn current(&self) -> Option<&E> {
        self.tree.entry_at(&self.path)
    }

    /// Mutable access to the current entry. Callers must not change its key.
    pub(crate) fn current_mut(&mut self) -> Option<&mut E> {
        let &(node, idx) = self.path.last()?;
        self.tree.arena[node].entries.get_mut(idx)
    }

    pub fn move_next(&mut self) {
        if self.path.is_empty() {
            let root = self.tree.root;
            self.tree.descend_first(root, &mut self.path);
        } else {
            self.tree.step_next(&mut self.path);
        }
    }

    pub fn move_prev(&mut self) {
        if self.path.is_empty() {
            let root = self.tree.root;
            self.tree.descend_last(root, &mut self.path);
        } else {
            self.tree.step_prev(&mut self.path);
        }
    }
}

impl<'a, E> CursorMut<'a, E> {
    /// Consume the cursor, keeping mutable access to the current entry.
    /// Callers must not change its key.
    pub(crate) fn into_current_mut(self) -> Option<&'a mut E> {
        let &(node, idx) = self.path.last()?;
        let tree = self.tree;
        tree.arena[node].entries.get_mut(idx)
    }
}

impl<E: Keyed> CursorMut<'_, E> {
    /// Remove the entry under the cursor and move to its successor (the
    /// ghost if it was the last). Returns `None` at the ghost position.
    pub fn remove_current(&mut self) -> Option<E> {
        let removed = self.tree.remove_at(&self.path)?;
        self.tree.seek(&mut self.path, by_key(removed.key()));
        Some(removed)
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Double-ended in-order iterator.
pub struct Iter<'a, E> {
    tree: &'a BTree<E>,
    front: Vec<Frame>,
    back: Vec<Frame>,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.tree.entry_at(&self.front)?;
        self.tree.step_next(&mut self.front);
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, E> DoubleEndedIterator for Iter<'a, E> {
    fn next_back(&mut self) -> Option<&'a E> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.tree.entry_at(&self.back)?;
        self.tree.step_prev(&mut self.back);
        self.remaining -= 1;
        Some(entry)
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

impl<'a, E> IntoIterator for &'a BTree<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Iter<'a, E> {
        self.iter()
    }
}

/// Forward iterator from a cursor position to the end.
pub struct Tail<'a, E> {
    tree: &'a BTree<E>,
    path: Vec<Frame>,
}

impl<'a, E> Iterator for Tail<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        let entry = self.tree.entry_at(&self.path)?;
        self.tree.step_next(&mut self.path);
        Some(entry)
    }
}

impl<E> FusedIterator for Tail<'_, E> {}

/// Owning in-order iterator.
pub struct IntoIter<E>(std::vec::IntoIter<E>);

impl<E> Iterator for IntoIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<E> DoubleEndedIterator for IntoIter<E> {
    fn next_back(&mut self) -> Option<E> {
        self.0.next_back()
    }
}

impl<E> ExactSizeIterator for IntoIter<E> {}

impl<E> IntoIterator for BTree<E> {
    type Item = E;
    type IntoIter = IntoIter<E>;

    fn into_iter(self) -> IntoIter<E> {
        IntoIter(self.into_sorted_vec().into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(max_size: usize, keys: impl IntoIterator<Item = u32>) -> BTree<u32> {
        let mut tree = BTree::with_max_size(max_size);
        for k in keys {
            tree.insert(k);
        }
        tree
    }

    #[test]
    fn forward_and_backward_iteration() {
        let tree = tree_of(3, (0..100).rev());
        let forward: Vec<u32> = tree.iter().copied().collect();
        assert_eq!(forward, (0..100).collect::<Vec<_>>());
        let backward: Vec<u32> = tree.iter().rev().copied().collect();
        assert_eq!(backward, (0..100).rev().collect::<Vec<_>>());
        assert_eq!(tree.iter().len(), 100);
    }

    #[test]
    fn iteration_meets_in_the_middle() {
        let tree = tree_of(4, 0..10);
        let mut it = tree.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&9));
        let middle: Vec<u32> = it.copied().collect();
        assert_eq!(middle, (1..9).collect::<Vec<_>>());
    }

    #[test]
    fn cursor_wraps_through_ghost() {
        let tree = tree_of(3, [1, 2, 3]);
        let mut cursor = tree.cursor_back();
        assert_eq!(cursor.current(), Some(&3));
        cursor.move_next();
        assert_eq!(cursor.current(), None);
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&1));
        cursor.move_prev();
        assert_eq!(cursor.current(), None);
        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&3));
    }

    #[test]
    fn cursor_walks_every_entry_both_ways() {
        let tree = tree_of(3, 0..64);
        let mut cursor = tree.cursor_front();
        for expected in 0..64 {
            assert_eq!(cursor.current(), Some(&expected));
            cursor.move_next();
        }
        assert_eq!(cursor.current(), None);
        for expected in (0..64).rev() {
            cursor.move_prev();
            assert_eq!(cursor.current(), Some(&expected));
        }
    }

    #[test]
    fn lower_bound_finds_successor() {
        let tree = tree_of(3, (0..50).map(|i| i * 2));
        assert_eq!(tree.lower_bound(&10).current(), Some(&10));
        assert_eq!(tree.lower_bound(&11).current(), Some(&12));
        assert_eq!(tree.lower_bound(&98).current(), Some(&98));
        assert_eq!(tree.lower_bound(&99).current(), None);
        let tail: Vec<u32> = tree.lower_bound(&91).into_tail().copied().collect();
        assert_eq!(tail, vec![92, 94, 96, 98]);
    }

    #[test]
    fn remove_current_lands_on_successor() {
        let mut tree = tree_of(3, 0..40);
        let mut cursor = tree.cursor_front_mut();
        // Remove every even entry while walking forward.
        while let Some(&value) = cursor.current() {
            if value % 2 == 0 {
                assert_eq!(cursor.remove_current(), Some(value));
            } else {
                cursor.move_next();
            }
        }
        assert_eq!(cursor.remove_current(), None);
        tree.validate().unwrap();
        let left: Vec<u32> = tree.iter().copied().collect();
        assert_eq!(left, (0..40).filter(|v| v % 2 == 1).collect::<Vec<_>>());
    }

    #[test]
    fn remove_current_at_last_moves_to_ghost() {
        let mut tree = tree_of(3, 0..10);
        let mut cursor = tree.cursor_back_mut();
        assert_eq!(cursor.remove_current(), Some(9));
        assert_eq!(cursor.current(), None);
        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&8));
    }

    #[test]
    fn remove_everything_through_cursor() {
        let mut tree = tree_of(4, 0..300);
        let mut cursor = tree.lower_bound_mut(&0);
        let mut expected = 0;
        while let Some(v) = cursor.remove_current() {
            assert_eq!(v, expected);
            expected += 1;
        }
        assert_eq!(expected, 300);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn into_iter_owns_entries() {
        let tree = tree_of(3, [4, 2, 6]);
        let owned: Vec<u32> = tree.into_iter().rev().collect();
        assert_eq!(owned, vec![6, 4, 2]);
    }
}
