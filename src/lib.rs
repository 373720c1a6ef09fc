//! This crate exposes three self-balancing Binary Search Trees (BSTs) behind the same
//! insert/find/erase/clear contract, plus a harness timing them against the standard library.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key, the value
//! associated with it and up to two child `Node`s. The most important invariants
//! of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! Searching for a key takes `O(height)` (where `height` is the longest path from
//! the root `Node` to a leaf `Node`). Each tree here keeps that height at `O(lg N)`
//! in a different way:
//!
//! - [`avl`]: a strict height-balance invariant restored by rotations after every change.
//! - [`splay`]: no invariant at all, every access rotates the touched node to the root,
//!   which is `O(lg N)` amortized.
//! - [`treap`]: a min-heap on caller-supplied random priorities, `O(lg N)` expected.
//!
//! Every tree stores at most one node per key. Inserting an existing key overwrites its value.
//! The trees do no synchronization of their own. Sharing one between threads means serializing
//! every call, for example behind a `Mutex`.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod harness;
pub mod splay;
pub mod treap;


pub use avl::Tree as HeightBalancedTree;
pub use splay::Tree as SelfAdjustingTree;
pub use treap::Tree as RandomizedPriorityTree;
