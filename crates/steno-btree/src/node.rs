// Node storage: B-tree nodes in an index-addressed arena.
//
// Nodes never hold pointers to each other. A branch lists its children by
// `NodeId`, and parents are recovered from the cursor path instead of back
// references, so rebalancing only ever shuffles indices and entry vectors.

use std::ops::{Index, IndexMut};

/// Index of a node slot in the arena.
pub(crate) type NodeId = usize;

/// A B-tree node. A leaf has no children; a branch has `entries.len() + 1`.
#[derive(Debug, Clone)]
pub(crate) struct Node<E> {
    pub entries: Vec<E>,
    pub children: Vec<NodeId>,
}

impl<E> Node<E> {
    pub fn leaf() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Slot arena with a free list for released nodes.
#[derive(Debug, Clone)]
pub(crate) struct Arena<E> {
    nodes: Vec<Node<E>>,
    free: Vec<NodeId>,
}

impl<E> Arena<E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a node, reusing a released slot when one is available.
    pub fn alloc(&mut self, node: Node<E>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Take a node's contents out and mark its slot free.
    pub fn release(&mut self, id: NodeId) -> Node<E> {
        let node = std::mem::replace(&mut self.nodes[id], Node::leaf());
        self.free.push(id);
        node
    }

    /// Number of live nodes.
    pub fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }
}

impl<E> Index<NodeId> for Arena<E> {
    type Output = Node<E>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<E> {
        &self.nodes[id]
    }
}

impl<E> IndexMut<NodeId> for Arena<E> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<E> {
        &mut self.nodes[id]
    }
}
