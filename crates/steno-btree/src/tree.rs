// Generic B-tree over keyed entries.
//
// The tree owns every entry inline in its nodes. Ordering comes from the
// entry's key (`Keyed::key`), so maps, sets and multimaps differ only in
// what they store as an entry and which part of it they expose as the key.
//
// Node bounds: a node never keeps `max_size` entries once an operation
// returns (a full child is split on the way back up), and every node but
// the root keeps at least `min_size = (max_size - 1) / 2` entries.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::InvariantError;
use crate::node::{Arena, Node, NodeId};

/// Default node capacity.
pub const DEFAULT_MAX_SIZE: usize = 32;

/// Smallest node capacity that still allows splitting around a median.
pub const MIN_MAX_SIZE: usize = 3;

/// An entry with an ordering key.
pub trait Keyed {
    type Key: Ord + ?Sized;

    fn key(&self) -> &Self::Key;
}

/// One step of a root-to-entry path. Every frame except the last names the
/// child that was descended into; the last frame names the entry itself.
pub(crate) type Frame = (NodeId, usize);

/// Outcome of a single insertion.
pub(crate) enum Insert<E> {
    Inserted,
    Replaced(E),
    Rejected(E),
}

/// Arena-backed B-tree holding entries ordered by their key.
#[derive(Clone)]
pub struct BTree<E> {
    pub(crate) arena: Arena<E>,
    pub(crate) root: NodeId,
    len: usize,
    max_size: usize,
    min_size: usize,
}

impl<E> BTree<E> {
    /// Create an empty tree with the default node capacity.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    /// Create an empty tree whose nodes split when they reach `max_size`
    /// entries. Values below [`MIN_MAX_SIZE`] are raised to it.
    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(MIN_MAX_SIZE);
        let mut arena = Arena::new();
        let root = arena.alloc(Node::leaf());
        Self {
            arena,
            root,
            len: 0,
            max_size,
            min_size: (max_size - 1) / 2,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Number of node levels (1 for a tree that is a single leaf).
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;
        while let Some(&child) = self.arena[node].children.first() {
            node = child;
            height += 1;
        }
        height
    }

    /// Remove every entry, shrinking back to a single empty leaf.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::leaf());
        self.len = 0;
    }

    /// Smallest entry.
    pub fn first(&self) -> Option<&E> {
        let mut node = &self.arena[self.root];
        while let Some(&child) = node.children.first() {
            node = &self.arena[child];
        }
        node.entries.first()
    }

    /// Largest entry.
    pub fn last(&self) -> Option<&E> {
        let mut node = &self.arena[self.root];
        while let Some(&child) = node.children.last() {
            node = &self.arena[child];
        }
        node.entries.last()
    }

    /// Move every entry out in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<E> {
        let mut out = Vec::with_capacity(self.len);
        let root = self.root;
        self.drain_into(root, &mut out);
        out
    }

    fn drain_into(&mut self, node: NodeId, out: &mut Vec<E>) {
        let Node { entries, children } = self.arena.release(node);
        if children.is_empty() {
            out.extend(entries);
            return;
        }
        let mut children = children.into_iter();
        for entry in entries {
            if let Some(child) = children.next() {
                self.drain_into(child, out);
            }
            out.push(entry);
        }
        for child in children {
            self.drain_into(child, out);
        }
    }
}

impl<E: Keyed> BTree<E> {
    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Find the node and index holding `key`.
    fn locate(&self, key: &E::Key) -> Option<Frame> {
        let mut node = self.root;
        loop {
            let n = &self.arena[node];
            match n.entries.binary_search_by(|e| e.key().cmp(key)) {
                Ok(i) => return Some((node, i)),
                Err(_) if n.is_leaf() => return None,
                Err(i) => node = n.children[i],
            }
        }
    }

    /// Root-to-entry path for `key`.
    pub(crate) fn find_path(&self, key: &E::Key) -> Option<Vec<Frame>> {
        let mut path = Vec::new();
        let mut node = self.root;
        loop {
            let n = &self.arena[node];
            match n.entries.binary_search_by(|e| e.key().cmp(key)) {
                Ok(i) => {
                    path.push((node, i));
                    return Some(path);
                }
                Err(_) if n.is_leaf() => return None,
                Err(i) => {
                    path.push((node, i));
                    node = n.children[i];
                }
            }
        }
    }

    pub fn get(&self, key: &E::Key) -> Option<&E> {
        let (node, i) = self.locate(key)?;
        Some(&self.arena[node].entries[i])
    }

    pub fn contains(&self, key: &E::Key) -> bool {
        self.locate(key).is_some()
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Insert `entry`, replacing and returning an entry with an equal key.
    pub fn insert(&mut self, entry: E) -> Option<E> {
        match self.insert_entry(entry, true) {
            Insert::Replaced(old) => Some(old),
            Insert::Inserted | Insert::Rejected(_) => None,
        }
    }

    /// Insert `entry` unless an equal key is present; the rejected entry is
    /// handed back.
    pub fn insert_if_absent(&mut self, entry: E) -> Result<(), E> {
        match self.insert_entry(entry, false) {
            Insert::Rejected(entry) => Err(entry),
            Insert::Inserted | Insert::Replaced(_) => Ok(()),
        }
    }

    pub(crate) fn insert_entry(&mut self, entry: E, replace: bool) -> Insert<E> {
        let outcome = self.insert_into(self.root, entry, replace);
        if let Insert::Inserted = outcome {
            self.len += 1;
            if self.arena[self.root].len() >= self.max_size {
                self.grow_root(false);
            }
        }
        outcome
    }

    fn insert_into(&mut self, node: NodeId, entry: E, replace: bool) -> Insert<E> {
        let search = self.arena[node]
            .entries
            .binary_search_by(|e| e.key().cmp(entry.key()));
        match search {
            Ok(i) if replace => {
                Insert::Replaced(mem::replace(&mut self.arena[node].entries[i], entry))
            }
            Ok(_) => Insert::Rejected(entry),
            Err(i) if self.arena[node].is_leaf() => {
                self.arena[node].entries.insert(i, entry);
                Insert::Inserted
            }
            Err(i) => {
                let child = self.arena[node].children[i];
                let outcome = self.insert_into(child, entry, replace);
                if matches!(outcome, Insert::Inserted) && self.arena[child].len() >= self.max_size {
                    self.split_child(node, i, false);
                }
                outcome
            }
        }
    }

    /// Insert a run of entries, appending directly along the right spine
    /// while they arrive in strictly ascending order.
    ///
    /// Appended nodes split right-heavy (the new right node keeps only
    /// `min_size` entries) so that further appends fill the left side
    /// densely. The first entry that is not greater than the current
    /// maximum switches the rest of the run to ordinary insertion.
    pub fn extend_sorted<I: IntoIterator<Item = E>>(&mut self, entries: I) {
        let mut iter = entries.into_iter();
        while let Some(entry) = iter.next() {
            let ascending = self.last().is_none_or(|last| last.key() < entry.key());
            if !ascending {
                self.insert(entry);
                for entry in iter {
                    self.insert(entry);
                }
                return;
            }
            self.push_back(entry);
        }
    }

    fn push_back(&mut self, entry: E) {
        let mut spine = vec![self.root];
        let mut node = self.root;
        while let Some(&child) = self.arena[node].children.last() {
            node = child;
            spine.push(child);
        }
        self.arena[node].entries.push(entry);
        self.len += 1;

        for depth in (0..spine.len()).rev() {
            if self.arena[spine[depth]].len() < self.max_size {
                break;
            }
            if depth == 0 {
                self.grow_root(true);
            } else {
                let parent = spine[depth - 1];
                let last = self.arena[parent].children.len() - 1;
                self.split_child(parent, last, true);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove the entry with `key`.
    pub fn remove(&mut self, key: &E::Key) -> Option<E> {
        let path = self.find_path(key)?;
        self.remove_at(&path)
    }

    /// Remove the entry a path points at, rebalancing every node on the
    /// path. The path is stale afterwards.
    pub(crate) fn remove_at(&mut self, path: &[Frame]) -> Option<E> {
        if path.is_empty() {
            return None;
        }
        let removed = self.remove_along(path, 0)?;
        self.len -= 1;
        self.collapse_root();
        Some(removed)
    }

    fn remove_along(&mut self, path: &[Frame], depth: usize) -> Option<E> {
        let (node, i) = path[depth];
        if depth + 1 < path.len() {
            let removed = self.remove_along(path, depth + 1)?;
            self.fix_child(node, i);
            return Some(removed);
        }
        if self.arena[node].is_leaf() {
            if i >= self.arena[node].len() {
                return None;
            }
            return Some(self.arena[node].entries.remove(i));
        }
        // Branch entry: swap in the predecessor from the left child.
        let child = self.arena[node].children[i];
        let predecessor = self.pop_last(child)?;
        let removed = mem::replace(&mut self.arena[node].entries[i], predecessor);
        self.fix_child(node, i);
        Some(removed)
    }

    fn pop_last(&mut self, node: NodeId) -> Option<E> {
        if self.arena[node].is_leaf() {
            return self.arena[node].entries.pop();
        }
        let last = self.arena[node].children.len() - 1;
        let child = self.arena[node].children[last];
        let entry = self.pop_last(child)?;
        self.fix_child(node, last);
        Some(entry)
    }

    fn collapse_root(&mut self) {
        while self.arena[self.root].entries.is_empty() {
            let Some(&child) = self.arena[self.root].children.first() else {
                break;
            };
            self.arena.release(self.root);
            self.root = child;
        }
    }
}

impl<E> BTree<E> {
    // -----------------------------------------------------------------------
    // Structural operations
    // -----------------------------------------------------------------------

    fn grow_root(&mut self, right_heavy: bool) {
        let old_root = self.root;
        self.root = self.arena.alloc(Node {
            entries: Vec::new(),
            children: vec![old_root],
        });
        self.split_child(self.root, 0, right_heavy);
    }

    /// Split the full child `i` of `parent` around a median that moves up
    /// into `parent`.
    fn split_child(&mut self, parent: NodeId, i: usize, right_heavy: bool) {
        let child = self.arena[parent].children[i];
        let len = self.arena[child].len();
        let left_len = if right_heavy {
            len - self.min_size - 1
        } else {
            len / 2
        };

        let node = &mut self.arena[child];
        let mut right_entries = node.entries.split_off(left_len);
        let median = right_entries.remove(0);
        let right_children = if node.is_leaf() {
            Vec::new()
        } else {
            node.children.split_off(left_len + 1)
        };

        let right = self.arena.alloc(Node {
            entries: right_entries,
            children: right_children,
        });
        let parent = &mut self.arena[parent];
        parent.entries.insert(i, median);
        parent.children.insert(i + 1, right);
    }

    /// Restore the minimum size of child `i` after a removal below it.
    fn fix_child(&mut self, parent: NodeId, i: usize) {
        let child = self.arena[parent].children[i];
        if self.arena[child].len() >= self.min_size {
            return;
        }
        let left = i.checked_sub(1).map(|j| self.arena[parent].children[j]);
        let right = self.arena[parent].children.get(i + 1).copied();

        if left.is_some_and(|l| self.arena[l].len() > self.min_size) {
            self.rotate_right(parent, i - 1);
        } else if right.is_some_and(|r| self.arena[r].len() > self.min_size) {
            self.rotate_left(parent, i);
        } else if left.is_some() {
            self.merge(parent, i - 1);
        } else if right.is_some() {
            self.merge(parent, i);
        }
    }

    /// Move the last entry of child `j` up into separator `j`, and the old
    /// separator down to the front of child `j + 1`.
    fn rotate_right(&mut self, parent: NodeId, j: usize) {
        let left = self.arena[parent].children[j];
        let right = self.arena[parent].children[j + 1];
        let Some(entry) = self.arena[left].entries.pop() else {
            return;
        };
        let moved_child = self.arena[left].children.pop();
        let separator = mem::replace(&mut self.arena[parent].entries[j], entry);
        let right = &mut self.arena[right];
        right.entries.insert(0, separator);
        if let Some(child) = moved_child {
            right.children.insert(0, child);
        }
    }

    /// Move the first entry of child `j + 1` up into separator `j`, and the
    /// old separator down to the end of child `j`.
    fn rotate_left(&mut self, parent: NodeId, j: usize) {
        let left = self.arena[parent].children[j];
        let right = self.arena[parent].children[j + 1];
        if self.arena[right].entries.is_empty() {
            return;
        }
        let entry = self.arena[right].entries.remove(0);
        let moved_child = if self.arena[right].is_leaf() {
            None
        } else {
            Some(self.arena[right].children.remove(0))
        };
        let separator = mem::replace(&mut self.arena[parent].entries[j], entry);
        let left = &mut self.arena[left];
        left.entries.push(separator);
        if let Some(child) = moved_child {
            left.children.push(child);
        }
    }

    /// Merge child `j + 1` and separator `j` into child `j`.
    fn merge(&mut self, parent: NodeId, j: usize) {
        let separator = self.arena[parent].entries.remove(j);
        let right = self.arena[parent].children.remove(j + 1);
        let left = self.arena[parent].children[j];
        let right = self.arena.release(right);
        let left = &mut self.arena[left];
        left.entries.push(separator);
        left.entries.extend(right.entries);
        left.children.extend(right.children);
    }
}

impl<E: Keyed> BTree<E> {
    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check every structural invariant: entry order and key ranges, node
    /// size bounds, child counts, uniform leaf depth, recorded length and
    /// arena accounting.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let root = &self.arena[self.root];
        if !root.is_leaf() && root.entries.is_empty() {
            return Err(InvariantError::EmptyBranchRoot);
        }
        let mut leaf_depth = None;
        let (entries, nodes) = self.validate_node(self.root, 0, None, None, &mut leaf_depth)?;
        if entries != self.len {
            return Err(InvariantError::LengthMismatch {
                recorded: self.len,
                counted: entries,
            });
        }
        if nodes != self.arena.live() {
            return Err(InvariantError::LeakedNodes {
                reachable: nodes,
                live: self.arena.live(),
            });
        }
        Ok(())
    }

    fn validate_node<'a>(
        &'a self,
        id: NodeId,
        depth: usize,
        lower: Option<&'a E::Key>,
        upper: Option<&'a E::Key>,
        leaf_depth: &mut Option<usize>,
    ) -> Result<(usize, usize), InvariantError> {
        let node = &self.arena[id];
        let len = node.len();
        if len >= self.max_size {
            return Err(InvariantError::Overfull { node: id, len });
        }
        if id != self.root && len < self.min_size {
            return Err(InvariantError::Underfull { node: id, len });
        }
        if node.entries.windows(2).any(|pair| pair[0].key() >= pair[1].key()) {
            return Err(InvariantError::Unordered { node: id });
        }
        let below = lower.zip(node.entries.first()).is_some_and(|(lo, e)| e.key() <= lo);
        let above = upper.zip(node.entries.last()).is_some_and(|(hi, e)| e.key() >= hi);
        if below || above {
            return Err(InvariantError::OutOfRange { node: id });
        }

        if node.is_leaf() {
            match *leaf_depth {
                Some(d) if d != depth => return Err(InvariantError::UnevenDepth),
                Some(_) => {}
                None => *leaf_depth = Some(depth),
            }
            return Ok((len, 1));
        }

        if node.children.len() != len + 1 {
            return Err(InvariantError::ChildCount {
                node: id,
                entries: len,
                children: node.children.len(),
            });
        }
        let mut totals = (len, 1);
        for (i, &child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { Some(node.entries[i - 1].key()) };
            let hi = if i == len { upper } else { Some(node.entries[i].key()) };
            let (entries, nodes) = self.validate_node(child, depth + 1, lo, hi, leaf_depth)?;
            totals.0 += entries;
            totals.1 += nodes;
        }
        Ok(totals)
    }
}

impl<E> Default for BTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for BTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Compare an entry's key against a search target, for cursor seeks.
pub(crate) fn by_key<'k, E: Keyed>(key: &'k E::Key) -> impl FnMut(&E) -> Ordering + 'k {
    move |e: &E| e.key().cmp(key)
}
