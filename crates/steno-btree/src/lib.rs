//! Arena-backed B-tree collections.
//!
//! Ordered associative containers used for dictionary storage: a map, a
//! set and a multimap over a shared B-tree core. Nodes live in an arena and
//! refer to their children by index, and positions are explicit cursor
//! paths, so iteration with in-place removal never needs parent pointers.
//!
//! # Architecture
//!
//! - [`tree`] -- Generic B-tree: insert with split, delete with rotate/merge,
//!   bulk sorted append, invariant validation
//! - [`cursor`] -- Path-based cursors and iterators, removal through a cursor
//! - [`map`] -- [`OrderedMap`]
//! - [`set`] -- [`OrderedSet`]
//! - [`multimap`] -- [`OrderedMultiMap`]

pub mod cursor;
pub mod map;
pub mod multimap;
mod node;
pub mod set;
pub mod tree;

pub use map::OrderedMap;
pub use multimap::OrderedMultiMap;
pub use set::OrderedSet;
pub use tree::{BTree, Keyed};

/// A broken structural invariant reported by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    #[error("node {node} holds {len} entries, at or above the split threshold")]
    Overfull { node: usize, len: usize },
    #[error("node {node} holds {len} entries, below the minimum")]
    Underfull { node: usize, len: usize },
    #[error("entries of node {node} are not strictly ascending")]
    Unordered { node: usize },
    #[error("entries of node {node} fall outside the range set by its parent")]
    OutOfRange { node: usize },
    #[error("node {node} has {entries} entries but {children} children")]
    ChildCount {
        node: usize,
        entries: usize,
        children: usize,
    },
    #[error("leaves are not all at the same depth")]
    UnevenDepth,
    #[error("root is a branch without entries")]
    EmptyBranchRoot,
    #[error("recorded length {recorded} differs from counted entries {counted}")]
    LengthMismatch { recorded: usize, counted: usize },
    #[error("{reachable} nodes reachable from the root but {live} allocated")]
    LeakedNodes { reachable: usize, live: usize },
}
