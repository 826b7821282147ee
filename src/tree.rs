//! The duplicate-counting binary search tree.

use std::cmp::Ordering;
use std::fmt;

use crate::arena::{Arena, Node, NodeId};
use crate::iter::{InOrder, LevelOrder, PostOrder, PreOrder};

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy)]
enum Branch {
    Left,
    Right,
}

/// An ordered binary search tree with parent links and duplicate counting.
///
/// Repeated insertions of an equal value are collapsed into a single node
/// whose duplicate count tracks the number of logical copies, so the
/// structure never holds two distinct nodes with equal values. [`Tree::len`]
/// counts logical insertions, not nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Mutating operations keep the
/// parent back-references consistent; [`Tree::rebalance`] rebuilds the whole
/// structure at minimum height from the sorted node sequence.
///
/// # Examples
///
/// ```
/// use counting_bst::Tree;
///
/// let mut tree = Tree::new();
///
/// tree.add(8);
/// tree.add(3);
/// tree.add(10);
/// tree.add(3); // collapses into the existing node
///
/// assert_eq!(tree.len(), 4);
///
/// let node = tree.find(&3).unwrap();
/// assert_eq!(tree.duplicate_count(node), Some(2));
///
/// assert!(tree.delete(&3)); // drops one logical copy
/// assert!(tree.delete(&3)); // removes the node itself
/// assert!(tree.find(&3).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct Tree<T> {
    arena: Arena<T>,
    root: Option<NodeId>,
    size: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            size: 0,
        }
    }

    /// Number of logical insertions in the tree: the sum of every node's
    /// duplicate count, not the node count.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True iff the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes in the tree. Smaller than [`Tree::len`] whenever
    /// duplicates have been collapsed.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// The root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Finds the node holding the given value, or `None` if the value is
    /// absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.add(1);
    ///
    /// assert!(tree.find(&1).is_some());
    /// assert!(tree.find(&42).is_none());
    /// ```
    pub fn find(&self, value: &T) -> Option<NodeId>
    where
        T: Ord,
    {
        self.find_node_and_parent(value).0
    }

    /// Adds a value to the tree and returns its node.
    ///
    /// If a node with an equal value already exists, its duplicate count is
    /// incremented and that node is returned; otherwise a new node is
    /// attached at the insertion point found by descent. Always increments
    /// [`Tree::len`].
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let first = tree.add(7);
    /// let again = tree.add(7);
    ///
    /// assert_eq!(first, again);
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.node_count(), 1);
    /// ```
    pub fn add(&mut self, value: T) -> NodeId
    where
        T: Ord,
    {
        let id = match self.root {
            None => {
                let id = self.arena.insert(Node::new(value));
                self.root = Some(id);
                id
            }
            Some(_) => {
                let (found, parent) = self.find_node_and_parent(&value);
                match found {
                    Some(found) => {
                        self.node_mut(found).add_duplicate();
                        found
                    }
                    None => {
                        let parent = parent.expect("descent in a non-empty tree ends at a node");
                        let branch = if value < self.node(parent).value {
                            Branch::Left
                        } else {
                            Branch::Right
                        };
                        let id = self.arena.insert(Node::new(value));
                        self.set_child(parent, branch, Some(id));
                        id
                    }
                }
            }
        };
        self.size += 1;
        id
    }

    /// Deletes one logical copy of the given value. Returns `false` when the
    /// value is absent.
    ///
    /// A node with more than one logical copy only has its duplicate count
    /// decremented. The last copy is removed structurally: a leaf is
    /// detached, a node with one child is replaced by that child, and a node
    /// with two children is replaced by its in-order predecessor (the
    /// maximum of its left subtree). Every successful call decrements
    /// [`Tree::len`] by one.
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.add(5);
    ///
    /// assert!(tree.delete(&5));
    /// assert!(!tree.delete(&5));
    /// ```
    pub fn delete(&mut self, value: &T) -> bool
    where
        T: Ord,
    {
        let Some(id) = self.find(value) else {
            return false;
        };

        // Case 1: more than one logical copy, only the counter moves.
        if self.node_mut(id).remove_duplicate() {
            self.size -= 1;
            return true;
        }

        let (left, right) = {
            let node = self.node(id);
            (node.left, node.right)
        };
        match (left, right) {
            // Case 2: a leaf is detached from its parent (or clears the root).
            (None, None) => {
                self.replace_in_parent(id, None);
            }
            // Case 3: a single child is promoted into the deleted node's slot.
            (Some(child), None) | (None, Some(child)) => {
                self.replace_in_parent(id, Some(child));
            }
            // Case 4: the in-order predecessor is spliced into the deleted
            // node's position.
            (Some(left), Some(_)) => {
                let pred = self.rightmost(left);
                debug_assert!(
                    self.node(pred).right.is_none(),
                    "the rightmost node of the left subtree cannot have a right child"
                );

                // Detach the predecessor, promoting its own left child (the
                // only child it can have) into its slot so no node is lost.
                let pred_left = self.node(pred).left;
                self.replace_in_parent(pred, pred_left);

                // Re-read the heir links: if the predecessor was the deleted
                // node's left child, detaching it just rewrote them.
                let heir_left = self.node(id).left;
                let heir_right = self.node(id).right;
                self.replace_in_parent(id, Some(pred));
                self.set_child(pred, Branch::Left, heir_left);
                self.set_child(pred, Branch::Right, heir_right);
            }
        }
        self.arena
            .remove(id)
            .expect("the node being deleted was found alive");
        self.size -= 1;
        true
    }

    /// The node with the minimum value, or `None` for an empty tree.
    pub fn min_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    /// The node with the maximum value, or `None` for an empty tree.
    pub fn max_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    /// Height of the tree: the number of edges on the longest root-to-leaf
    /// path. `-1` for an empty tree, `0` for a lone root.
    pub fn height(&self) -> isize {
        self.height_below(self.root)
    }

    /// Number of parent hops from the node to the root. `0` for the root
    /// itself and for a stale handle.
    pub fn depth(&self, id: NodeId) -> usize {
        let Some(mut node) = self.arena.get(id) else {
            return 0;
        };
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = self.node(parent);
            depth += 1;
        }
        depth
    }

    /// Rebuilds the tree at minimum height.
    ///
    /// The nodes are collected in sorted order and relinked by a recursive
    /// mid-split: the middle element of each subrange becomes that subtree's
    /// root. Values, duplicate counts, and [`Tree::len`] are preserved; only
    /// the links change. The result has height `O(log n)` for `n` nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for x in 1..=7 {
    ///     tree.add(x); // ascending adds degenerate into a chain
    /// }
    /// assert_eq!(tree.height(), 6);
    ///
    /// tree.rebalance();
    /// assert_eq!(tree.height(), 2);
    /// ```
    pub fn rebalance(&mut self) {
        let ids: Vec<NodeId> = self.in_order().collect();
        self.root = self.relink_balanced(&ids);
        if let Some(root) = self.root {
            self.node_mut(root).parent = None;
        }
    }

    /// Removes every node and resets the tree to empty.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.size = 0;
    }

    /// Removes the whole subtree rooted at the given node and returns the
    /// number of logical entries that were dropped. A stale handle removes
    /// nothing and returns `0`.
    pub fn prune(&mut self, id: NodeId) -> usize {
        if self.arena.get(id).is_none() {
            return 0;
        }
        self.replace_in_parent(id, None);

        let doomed: Vec<NodeId> = PostOrder::new(self, Some(id)).collect();
        let mut removed = 0;
        for id in doomed {
            removed += self
                .arena
                .remove(id)
                .expect("a post-order walk yields live nodes")
                .count;
        }
        self.size -= removed;
        removed
    }

    /// The value stored in the node, or `None` for a stale handle.
    pub fn value(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// The number of logical copies collapsed into the node, or `None` for a
    /// stale handle.
    pub fn duplicate_count(&self, id: NodeId) -> Option<usize> {
        self.arena.get(id).map(|node| node.count)
    }

    /// The node's parent, or `None` for the root or a stale handle.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    /// The node's left child, if any.
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.left)
    }

    /// The node's right child, if any.
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.right)
    }

    /// True iff the node is live and has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(Node::is_leaf)
    }

    /// True iff the node is live and has no parent.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|node| node.parent.is_none())
    }

    /// True iff the node is structurally its parent's left child. `false`
    /// for the root and for a stale handle. Compares node identity, never
    /// values.
    pub fn is_left_child(&self, id: NodeId) -> bool {
        match self.arena.get(id).and_then(|node| node.parent) {
            Some(parent) => self.node(parent).left == Some(id),
            None => false,
        }
    }

    /// In-order traversal of the whole tree: values in increasing order.
    pub fn in_order(&self) -> InOrder<'_, T> {
        InOrder::new(self, self.root)
    }

    /// Pre-order traversal of the whole tree.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder::new(self, self.root)
    }

    /// Post-order traversal of the whole tree.
    pub fn post_order(&self) -> PostOrder<'_, T> {
        PostOrder::new(self, self.root)
    }

    /// Level-order (breadth-first) traversal of the whole tree.
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(self, self.root)
    }

    /// The values of the tree in in-order sequence.
    pub fn in_order_values(&self) -> Vec<&T> {
        self.in_order().map(|id| &self.node(id).value).collect()
    }

    /// The values of the tree in pre-order sequence.
    pub fn pre_order_values(&self) -> Vec<&T> {
        self.pre_order().map(|id| &self.node(id).value).collect()
    }

    /// The values of the tree in post-order sequence.
    pub fn post_order_values(&self) -> Vec<&T> {
        self.post_order().map(|id| &self.node(id).value).collect()
    }

    /// The values of the tree in level-order sequence.
    pub fn level_order_values(&self) -> Vec<&T> {
        self.level_order().map(|id| &self.node(id).value).collect()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        self.arena.get(id).expect("structural links point at live nodes")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.arena
            .get_mut(id)
            .expect("structural links point at live nodes")
    }

    /// Descends from the root comparing values. Returns the matching node
    /// (if any) and the last node visited before it, which is the attachment
    /// point for an insertion.
    fn find_node_and_parent(&self, value: &T) -> (Option<NodeId>, Option<NodeId>)
    where
        T: Ord,
    {
        let mut current = self.root;
        let mut parent = None;
        while let Some(id) = current {
            let node = self.node(id);
            match value.cmp(&node.value) {
                Ordering::Equal => break,
                Ordering::Less => {
                    parent = Some(id);
                    current = node.left;
                }
                Ordering::Greater => {
                    parent = Some(id);
                    current = node.right;
                }
            }
        }
        (current, parent)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    fn height_below(&self, link: Option<NodeId>) -> isize {
        match link {
            None => -1,
            Some(id) => {
                let node = self.node(id);
                1 + self.height_below(node.left).max(self.height_below(node.right))
            }
        }
    }

    /// Reassigns the parent's child slot and, when the child is present, its
    /// parent link. The previous occupant's parent link is left alone:
    /// callers detach it first.
    fn set_child(&mut self, parent: NodeId, branch: Branch, child: Option<NodeId>) {
        match branch {
            Branch::Left => self.node_mut(parent).left = child,
            Branch::Right => self.node_mut(parent).right = child,
        }
        if let Some(child) = child {
            self.node_mut(child).parent = Some(parent);
        }
    }

    /// Which child slot of its parent the node occupies, by identity.
    fn branch_of(&self, id: NodeId) -> Branch {
        let parent = self.node(id).parent.expect("branch_of is never asked about the root");
        if self.node(parent).left == Some(id) {
            Branch::Left
        } else {
            debug_assert_eq!(
                self.node(parent).right,
                Some(id),
                "a non-root node must be one of its parent's children"
            );
            Branch::Right
        }
    }

    /// Puts `new` where `old` currently hangs: in the parent's matching
    /// child slot, or at the root. `old` itself is left dangling for the
    /// caller to splice elsewhere or free.
    fn replace_in_parent(&mut self, old: NodeId, new: Option<NodeId>) {
        match self.node(old).parent {
            None => {
                self.root = new;
                if let Some(new) = new {
                    self.node_mut(new).parent = None;
                }
            }
            Some(parent) => {
                let branch = self.branch_of(old);
                self.set_child(parent, branch, new);
            }
        }
    }

    /// Relinks the sorted ids into a minimum-height subtree: the middle
    /// element becomes the root, the halves recurse into its children.
    fn relink_balanced(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        if ids.is_empty() {
            return None;
        }
        let mid = (ids.len() - 1) / 2;
        let root = ids[mid];
        let left = self.relink_balanced(&ids[..mid]);
        let right = self.relink_balanced(&ids[mid + 1..]);

        let node = self.node_mut(root);
        node.left = left;
        node.right = right;
        if let Some(left) = left {
            self.node_mut(left).parent = Some(root);
        }
        if let Some(right) = right {
            self.node_mut(right).parent = Some(root);
        }
        Some(root)
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        indent: &str,
        last: bool,
    ) -> fmt::Result
    where
        T: fmt::Display,
    {
        let node = self.node(id);
        writeln!(f, "{indent}+- {}", node.value)?;
        let child_indent = format!("{indent}{}", if last { "   " } else { "|  " });
        if let Some(left) = node.left {
            self.fmt_node(f, left, &child_indent, node.right.is_none())?;
        }
        if let Some(right) = node.right {
            self.fmt_node(f, right, &child_indent, true)?;
        }
        Ok(())
    }
}

/// Indent-based rendering, root at top, one `+-` branch marker per node and
/// `|` bars where a sibling follows below. Presentation only; the exact
/// format is not a contract.
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            None => Ok(()),
            Some(root) => self.fmt_node(f, root, "", true),
        }
    }
}

#[cfg(test)]
impl<T: Ord + fmt::Debug> Tree<T> {
    /// Checks the ordering, back-reference, and size-accounting invariants.
    fn assert_valid(&self) {
        if let Some(root) = self.root {
            assert!(self.node(root).parent.is_none(), "the root must have no parent");
        }
        let mut logical = 0;
        let mut nodes = 0;
        for id in self.level_order() {
            let node = self.node(id);
            nodes += 1;
            logical += node.count;
            assert!(node.count >= 1);
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(
                    self.node(child).parent,
                    Some(id),
                    "child {child:?} must point back at {id:?}"
                );
            }
            if let Some(parent) = node.parent {
                let parent_node = self.node(parent);
                let left = parent_node.left == Some(id);
                let right = parent_node.right == Some(id);
                assert!(left ^ right, "{id:?} must be exactly one child of its parent");
            }
        }
        assert_eq!(self.len(), logical, "size must equal the sum of duplicate counts");
        assert_eq!(self.node_count(), nodes);

        let values = self.in_order_values();
        assert_eq!(values.len(), nodes);
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1], "in-order must be strictly increasing: {pair:?}");
        }
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::HashMap;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and to a value -> count map.
    /// This way we can ensure that after a random smattering of adds,
    /// deletes, and rebalances the tree holds the same multiset of values.
    fn do_ops(ops: &[Op<i8>], tree: &mut Tree<i8>, counts: &mut HashMap<i8, usize>) {
        for op in ops {
            match op {
                Op::Add(x) => {
                    tree.add(*x);
                    *counts.entry(*x).or_insert(0) += 1;
                }
                Op::Remove(x) => {
                    assert_eq!(tree.delete(x), counts.contains_key(x));
                    if let Some(n) = counts.get_mut(x) {
                        *n -= 1;
                        if *n == 0 {
                            counts.remove(x);
                        }
                    }
                }
                Op::Rebalance => tree.rebalance(),
            }
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_matches_a_hash_map_model(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut counts = HashMap::new();

            do_ops(&ops, &mut tree, &mut counts);
            tree.assert_valid();

            tree.len() == counts.values().sum::<usize>()
                && counts.iter().all(|(x, n)| {
                    tree.find(x).and_then(|id| tree.duplicate_count(id)) == Some(*n)
                })
        }
    }

    quickcheck::quickcheck! {
        fn in_order_is_sorted_and_len_counts_duplicates(xs: Vec<i8>) -> bool {
            let mut tree = Tree::new();
            for x in &xs {
                tree.add(*x);
            }
            tree.assert_valid();

            let values = tree.in_order_values();
            tree.len() == xs.len() && values.windows(2).all(|pair| pair[0] < pair[1])
        }
    }

    quickcheck::quickcheck! {
        fn rebalance_round_trips_the_multiset(xs: Vec<i8>) -> bool {
            let mut tree = Tree::new();
            for x in &xs {
                tree.add(*x);
            }

            let before: Vec<(i8, usize)> = tree
                .in_order()
                .map(|id| (*tree.value(id).unwrap(), tree.duplicate_count(id).unwrap()))
                .collect();

            tree.rebalance();
            tree.assert_valid();

            let after: Vec<(i8, usize)> = tree
                .in_order()
                .map(|id| (*tree.value(id).unwrap(), tree.duplicate_count(id).unwrap()))
                .collect();

            // A mid-split build cannot be taller than the minimum height
            // for the node count.
            let nodes = tree.node_count();
            let max_height = (usize::BITS - (nodes + 1).leading_zeros()) as isize - 1;
            before == after && tree.height() <= max_height
        }
    }
}
