//! A classic, instructional Binary Search Tree (BST) with parent links,
//! duplicate counting, and structural rebalancing.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored values. BSTs are typically defined
//! recursively using the notion of a node. A node stores a value and
//! sometimes has child nodes. The most important invariants of a BST are:
//!
//! 1. For every node in a BST, all the nodes in its left subtree have a
//!    value less than its own value.
//! 2. For every node in a BST, all the nodes in its right subtree have a
//!    value greater than its own value.
//!
//! This tree adds two classic twists:
//!
//! - **Duplicate counting.** Re-inserting an equal value bumps a counter on
//!   the existing node instead of growing the structure, so no two distinct
//!   nodes ever compare equal. [`Tree::len`] counts logical insertions.
//! - **Parent links.** Every node knows its parent, which makes depth
//!   queries and the four-case deletion algorithm direct instead of
//!   path-tracking. To keep the parent/child cycle out of the ownership
//!   story, nodes live in an arena and link to each other by [`NodeId`]
//!   index.
//!
//! Searching takes `O(height)`, and the height can degenerate to `O(n)`
//! under sorted insertion; [`Tree::rebalance`] rebuilds the tree at minimum
//! height from its own sorted node sequence. The four conventional traversal
//! orders are exposed as explicit cursor iterators in [`iter`].

#![deny(missing_docs)]

mod arena;
pub mod iter;
mod tree;

pub use arena::NodeId;
pub use tree::Tree;
