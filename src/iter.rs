//! Traversal cursors over a [`Tree`](crate::Tree).
//!
//! Each traversal order is its own iterator holding an explicit stack (the
//! depth-first orders) or queue (level order) of pending [`NodeId`]s. A
//! cursor is finite and one-shot; to restart a traversal, ask the tree for a
//! fresh one. The tree cannot be mutated while a cursor borrows it, so every
//! handle a cursor yields is live.

use std::collections::VecDeque;

use crate::arena::NodeId;
use crate::tree::Tree;

/// In-order traversal: left subtree, node, right subtree.
///
/// Yields nodes in strictly increasing value order (duplicates are collapsed
/// into a single node, so no value repeats).
pub struct InOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> InOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(start);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.node(id).left;
        }
    }
}

impl<T> Iterator for InOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.push_left_spine(self.tree.node(id).right);
        Some(id)
    }
}

/// Pre-order traversal: node, left subtree, right subtree.
pub struct PreOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> PreOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<T> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        // Right first so the left child is popped first.
        if let Some(right) = node.right {
            self.stack.push(right);
        }
        if let Some(left) = node.left {
            self.stack.push(left);
        }
        Some(id)
    }
}

/// Post-order traversal: left subtree, right subtree, node.
pub struct PostOrder<'a, T> {
    tree: &'a Tree<T>,
    /// Pending nodes, flagged once their children have been scheduled.
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<T> Iterator for PostOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            let node = self.tree.node(id);
            self.stack.push((id, true));
            if let Some(right) = node.right {
                self.stack.push((right, false));
            }
            if let Some(left) = node.left {
                self.stack.push((left, false));
            }
        }
    }
}

/// Level-order (breadth-first) traversal: the root, then each depth left to
/// right.
pub struct LevelOrder<'a, T> {
    tree: &'a Tree<T>,
    queue: VecDeque<NodeId>,
}

impl<'a, T> LevelOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            queue: start.into_iter().collect(),
        }
    }
}

impl<T> Iterator for LevelOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        let node = self.tree.node(id);
        if let Some(left) = node.left {
            self.queue.push_back(left);
        }
        if let Some(right) = node.right {
            self.queue.push_back(right);
        }
        Some(id)
    }
}
