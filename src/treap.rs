//! A randomized BST (a treap). Keys are kept in BST order and caller-supplied priorities in
//! min-heap order, so the shape of the tree is fully determined by the `(key, priority)` pairs.
//!
//! The tree never draws randomness itself. Its expected `O(lg N)` depth holds only when the
//! caller picks every priority independently and uniformly at random, for example with
//! `rand::random::<u32>()`. Skewed or adversarial priorities degrade it to a plain BST with the
//! same key order.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::treap::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(5, 10, "five");
//! tree.insert(3, 1, "three");
//! tree.insert(8, 20, "eight");
//!
//! assert_eq!(tree.find(&3), Some(&"three"));
//! assert_eq!(tree.erase(&3), Some("three"));
//! assert_eq!(tree.find(&3), None);
//! ```

use std::cmp::Ordering;
use std::fmt;

type Link<K, P, V> = Option<Box<Node<K, P, V>>>;

struct Node<K, P, V> {
    key: K,
    priority: P,
    value: V,
    left: Link<K, P, V>,
    right: Link<K, P, V>,
}

impl<K, P, V> Node<K, P, V> {
    fn leaf(key: K, priority: P, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            priority,
            value,
            left: None,
            right: None,
        })
    }
}

/// A treap keyed by `K`, heap-ordered by `P` (smallest priority at the root) and storing `V`.
pub struct Tree<K, P, V> {
    root: Link<K, P, V>,
    len: usize,
}

impl<K, P, V> Default for Tree<K, P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P, V> Drop for Tree<K, P, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Copies node by node with an explicit stack, so skewed trees clone without deep recursion.
impl<K, P, V> Clone for Tree<K, P, V>
where
    K: Clone,
    P: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut root = None;
        {
            let mut stack: Vec<(&Node<K, P, V>, &mut Link<K, P, V>)> = Vec::new();
            if let Some(node) = self.root.as_deref() {
                stack.push((node, &mut root));
            }
            while let Some((source, hole)) = stack.pop() {
                let copy = hole.insert(Node::leaf(
                    source.key.clone(),
                    source.priority.clone(),
                    source.value.clone(),
                ));
                let Node { left, right, .. } = &mut **copy;
                if let Some(child) = source.left.as_deref() {
                    stack.push((child, left));
                }
                if let Some(child) = source.right.as_deref() {
                    stack.push((child, right));
                }
            }
        }
        Self {
            root,
            len: self.len,
        }
    }
}

/// Prints the `(key, priority, value)` triples in pre-order, which pins down the shape.
impl<K, P, V> fmt::Debug for Tree<K, P, V>
where
    K: fmt::Debug,
    P: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut stack: Vec<&Node<K, P, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            list.entry(&(&node.key, &node.priority, &node.value));
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        list.finish()
    }
}

impl<K, P, V> Tree<K, P, V> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of keys stored in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Releases every node with an explicit stack. Safe to call on an empty tree.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<K, P, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }

    /// Potentially finds the value associated with the given key. The tree is not restructured.
    pub fn find(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Equal => return Some(&node.value),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }
        None
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut V>
    where
        K: Ord,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
                Ordering::Greater => current = node.right.as_deref_mut(),
            }
        }
        None
    }

    /// Inserts `value` at `key` with the given heap `priority`.
    ///
    /// The new node goes where the first node with a strictly greater priority sits on the search
    /// path; that node's subtree is split around `key` and hung below the new node. If `key` is
    /// already present its value is overwritten and its original priority is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::treap::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 7u32, 'a');
    /// tree.insert(1, 3u32, 'b');
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.find(&1), Some(&'b'));
    /// ```
    pub fn insert(&mut self, key: K, priority: P, value: V)
    where
        K: Ord,
        P: Ord,
    {
        if let Some(existing) = self.find_mut(&key) {
            *existing = value;
            return;
        }

        let mut link = &mut self.root;
        while link.as_deref().is_some_and(|node| node.priority <= priority) {
            let Some(node) = link else {
                unreachable!("Descending requires a node");
            };
            link = if key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }

        let (left, right) = split(link.take(), &key);
        let node = link.insert(Node::leaf(key, priority, value));
        node.left = left;
        node.right = right;
        self.len += 1;
    }

    /// Erases the node containing the given key and returns its value. The node is replaced by the
    /// merge of its two subtrees.
    pub fn erase(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
        P: Ord,
    {
        let mut link = &mut self.root;
        loop {
            let ordering = key.cmp(&link.as_deref()?.key);
            if ordering == Ordering::Equal {
                break;
            }
            let Some(node) = link else {
                unreachable!("Descending requires a node");
            };
            link = match ordering {
                Ordering::Less => &mut node.left,
                _ => &mut node.right,
            };
        }

        let mut node = link.take().expect("Erasing a found key");
        *link = merge(node.left.take(), node.right.take());
        self.len -= 1;
        Some(node.value)
    }
}

/// Partitions `node` into a treap of keys `< key` and a treap of keys `>= key`, each still in
/// heap order.
///
/// Walks down the search path once. Each visited node is hung into the open hole of the half it
/// belongs to, and that hole moves to the node's inner child, which is where the rest of its half
/// continues.
fn split<K, P, V>(mut node: Link<K, P, V>, key: &K) -> (Link<K, P, V>, Link<K, P, V>)
where
    K: Ord,
{
    let mut less = None;
    let mut greater = None;
    let mut less_hole = &mut less;
    let mut greater_hole = &mut greater;
    while let Some(mut current) = node {
        if current.key < *key {
            node = current.right.take();
            less_hole = &mut less_hole.insert(current).right;
        } else {
            node = current.left.take();
            greater_hole = &mut greater_hole.insert(current).left;
        }
    }
    (less, greater)
}

/// Joins two treaps where every key of `left` is below every key of `right`. Whichever root has
/// the smaller priority stays on top and the other treap is merged into its inner side.
///
/// Walks the right spine of `left` and the left spine of `right` together, filling one hole.
fn merge<K, P, V>(mut left: Link<K, P, V>, mut right: Link<K, P, V>) -> Link<K, P, V>
where
    P: Ord,
{
    let mut merged = None;
    let mut hole = &mut merged;
    loop {
        match (left, right) {
            (None, rest) | (rest, None) => {
                *hole = rest;
                break;
            }
            (Some(mut l), Some(mut r)) => {
                if l.priority < r.priority {
                    left = l.right.take();
                    right = Some(r);
                    hole = &mut hole.insert(l).right;
                } else {
                    right = r.left.take();
                    left = Some(l);
                    hole = &mut hole.insert(r).left;
                }
            }
        }
    }
    merged
}

#[cfg(test)]
impl<K, P, V> Tree<K, P, V> {
    /// Keys in sorted (in-order) order.
    pub(crate) fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = self.root.as_deref();
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                keys.push(&node.key);
                current = node.right.as_deref();
            }
        }
        keys
    }

    pub(crate) fn root_key(&self) -> Option<&K> {
        self.root.as_ref().map(|n| &n.key)
    }

    /// Checks BST order on keys, min-heap order on priorities and the node count.
    pub(crate) fn assert_invariants(&self)
    where
        K: Ord,
        P: Ord,
    {
        let mut count = 0;
        let mut stack: Vec<&Node<K, P, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                assert!(node.priority <= child.priority);
                stack.push(child);
            }
        }
        assert_eq!(count, self.len);
        assert!(self.keys().windows(2).all(|w| w[0] < w[1]));
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::HashMap;

    use super::*;
    use crate::test::quick::Op;

    fn do_ops(ops: &[Op<i8, i8>], bst: &mut Tree<i8, u64, i8>, map: &mut HashMap<i8, i8>) {
        for (i, op) in ops.iter().enumerate() {
            match op {
                Op::Insert(k, v) => {
                    // A cheap hash of the position stands in for a random priority.
                    let priority = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                    bst.insert(*k, priority, *v);
                    map.insert(*k, *v);
                }
                Op::Remove(k) => {
                    assert_eq!(bst.erase(k), map.remove(k));
                }
                Op::Find(k) => {
                    assert_eq!(bst.find(k), map.get(k));
                }
                Op::Clear => {
                    bst.clear();
                    map.clear();
                }
            }
            bst.assert_invariants();
            assert_eq!(bst.len(), map.len());
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
            let mut tree = Tree::new();
            let mut map = HashMap::new();

            do_ops(&ops, &mut tree, &mut map);
            map.keys().all(|key| tree.find(key) == map.get(key))
        }
    }
}
