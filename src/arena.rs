//! The node store backing a [`Tree`](crate::Tree).
//!
//! Nodes live in a slab-style arena and refer to each other by [`NodeId`]
//! rather than by pointer. A node's parent link is a plain index into the
//! same arena, so the parent/child cycle never becomes a reference cycle or
//! an aliasing problem: children are owned by the arena, links are data.

/// A handle to a node in a [`Tree`](crate::Tree).
///
/// Handles are plain indices: cheap to copy and compare. Comparing two
/// `NodeId`s compares node *identity*, never stored values. Identity is the
/// only sound notion of "same node" here because equal values can appear in
/// distinct nodes transiently while the tree restructures itself.
///
/// A `NodeId` is invalidated when its node is structurally deleted, when its
/// subtree is pruned, or when the tree is cleared. `Tree`'s accessors return
/// `None` for a handle whose slot is currently vacant; a slot may however be
/// recycled by a later insertion, so stale handles should simply not be kept
/// around.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) usize);

/// One stored value together with its structural links and duplicate count.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Number of logical insertions collapsed into this node. Always >= 1.
    pub(crate) count: usize,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent: None,
            count: 1,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Records one more logical insertion of this node's value.
    pub(crate) fn add_duplicate(&mut self) {
        self.count += 1;
    }

    /// Drops one logical copy of this node's value. Refuses when only one
    /// copy remains: the last copy must be removed structurally, not by
    /// decrement.
    pub(crate) fn remove_duplicate(&mut self) -> bool {
        if self.count > 1 {
            self.count -= 1;
            true
        } else {
            false
        }
    }
}

/// A slot either holds a live node or points at the next vacant slot.
#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

/// Slab-style node storage with a vacant-slot free list.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes (not logical insertions).
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(index) => {
                self.free_head = match self.slots[index] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.slots[index] = Slot::Occupied(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Frees the slot and returns its node, or `None` for a stale handle.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<T>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(_)) => {}
            _ => return None,
        }
        let slot = std::mem::replace(
            &mut self.slots[id.0],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        self.len -= 1;
        match slot {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => unreachable!("occupancy checked above"),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_recycled() {
        let mut arena = Arena::new();
        let a = arena.insert(Node::new(1));
        let b = arena.insert(Node::new(2));
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.remove(a).map(|n| n.value), Some(1));
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        // The freed slot is reused before the vector grows.
        let c = arena.insert(Node::new(3));
        assert_eq!(c, a);
        assert_eq!(arena.get(b).map(|n| n.value), Some(2));
        assert_eq!(arena.get(c).map(|n| n.value), Some(3));
    }

    #[test]
    fn remove_twice_is_none() {
        let mut arena = Arena::new();
        let a = arena.insert(Node::new(7));
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
    }

    #[test]
    fn duplicate_counter_floors_at_one() {
        let mut node = Node::new(5);
        assert_eq!(node.count, 1);
        assert!(!node.remove_duplicate());

        node.add_duplicate();
        assert_eq!(node.count, 2);
        assert!(node.remove_duplicate());
        assert_eq!(node.count, 1);
        assert!(!node.remove_duplicate());
    }
}
