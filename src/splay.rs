//! A self-adjusting BST (a splay tree). There is no balance bookkeeping at all: every access
//! rotates the accessed node up to the root, which gives `O(lg N)` amortized cost per operation.
//!
//! Nodes live in an arena (a `Vec`) and refer to each other by index. The parent index is only
//! ever used to walk upwards while splaying, the arena is the sole owner of every node.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::splay::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(1, "one");
//! tree.insert(2, "two");
//!
//! // Even a lookup restructures the tree, hence `&mut self`.
//! assert_eq!(tree.find(&1), Some(&"one"));
//! assert_eq!(tree.find(&3), None);
//!
//! assert_eq!(tree.erase(&2), Some("two"));
//! assert_eq!(tree.len(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

type Link = Option<NodeId>;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    /// Non-owning back reference, `None` for the root of a (sub)tree.
    parent: Link,
}

/// A splay tree. This can be used for inserting, finding, and erasing keys and values.
#[derive(Clone)]
pub struct Tree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Link,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Tree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<K, V> Tree<K, V> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// The number of keys stored in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Releases every node. Safe to call on an empty tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Finds the value stored at `key`. The last node visited by the search (the match, or the
    /// node the key would hang from) is splayed to the root either way.
    pub fn find(&mut self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        let last = self.search(key)?;
        self.splay(last);
        self.root = Some(last);

        let node = &self.nodes[last.0];
        (node.key == *key).then_some(&node.value)
    }

    /// Inserts the given value at the given key and splays the new node to the root. Inserting an
    /// existing key replaces its key and value, dropping the old ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::splay::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    /// tree.insert(1, 3);
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.find(&1), Some(&3));
    /// ```
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let (left, right) = match self.search(&key) {
            None => (None, None),
            Some(last) => {
                self.splay(last);
                self.root = Some(last);
                match self.nodes[last.0].key.cmp(&key) {
                    Ordering::Equal => {
                        let node = &mut self.nodes[last.0];
                        node.key = key;
                        node.value = value;
                        return;
                    }
                    Ordering::Less => (Some(last), self.detach_right(last)),
                    Ordering::Greater => (self.detach_left(last), Some(last)),
                }
            }
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            key,
            value,
            left,
            right,
            parent: None,
        });
        self.set_parent(left, Some(id));
        self.set_parent(right, Some(id));
        self.root = Some(id);
    }

    /// Erases the node containing the given key and returns its value. The node is splayed to the
    /// root first, then its two subtrees are joined below the maximum of the left one.
    pub fn erase(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let last = self.search(key)?;
        self.splay(last);
        self.root = Some(last);
        if self.nodes[last.0].key != *key {
            return None;
        }

        let left = self.detach_left(last);
        let right = self.detach_right(last);
        self.root = match (left, right) {
            (None, subtree) | (subtree, None) => subtree,
            (Some(left), Some(right)) => {
                let max = self.max(left);
                self.splay(max);
                // `max` is now the root of the left subtree and has no right child.
                self.nodes[max.0].right = Some(right);
                self.set_parent(Some(right), Some(max));
                Some(max)
            }
        };

        Some(self.release(last).value)
    }

    /// Walks down from the root and returns the node holding `key`, or the last node visited if
    /// no node does. `None` only for an empty tree.
    fn search(&self, key: &K) -> Link
    where
        K: Ord,
    {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current.0];
            let next = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(current),
                Ordering::Greater => node.right,
            };
            match next {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
    }

    /// The rightmost node of the subtree rooted at `id`.
    fn max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id.0].right {
            id = right;
        }
        id
    }

    fn set_parent(&mut self, child: Link, parent: Link) {
        if let Some(child) = child {
            self.nodes[child.0].parent = parent;
        }
    }

    fn detach_left(&mut self, id: NodeId) -> Link {
        let left = self.nodes[id.0].left.take();
        self.set_parent(left, None);
        left
    }

    fn detach_right(&mut self, id: NodeId) -> Link {
        let right = self.nodes[id.0].right.take();
        self.set_parent(right, None);
        right
    }

    /// Rotates `child` above its `parent`, fixing up the back references of the child, the parent,
    /// the grandparent's child link and the subtree that changes hands.
    fn rotate(&mut self, parent: NodeId, child: NodeId) {
        let grandparent = self.nodes[parent.0].parent;
        if let Some(grandparent) = grandparent {
            let g = &mut self.nodes[grandparent.0];
            if g.left == Some(parent) {
                g.left = Some(child);
            } else {
                g.right = Some(child);
            }
        }

        if self.nodes[parent.0].left == Some(child) {
            let moved = self.nodes[child.0].right.replace(parent);
            self.nodes[parent.0].left = moved;
            self.set_parent(moved, Some(parent));
        } else {
            let moved = self.nodes[child.0].left.replace(parent);
            self.nodes[parent.0].right = moved;
            self.set_parent(moved, Some(parent));
        }

        self.nodes[parent.0].parent = Some(child);
        self.nodes[child.0].parent = grandparent;
    }

    /// Rotates `id` up until it has no parent, using zig, zig-zig and zig-zag steps. The caller
    /// decides what `id` becomes the root of.
    fn splay(&mut self, id: NodeId) {
        while let Some(parent) = self.nodes[id.0].parent {
            let Some(grandparent) = self.nodes[parent.0].parent else {
                // zig
                self.rotate(parent, id);
                break;
            };

            let parent_is_left = self.nodes[grandparent.0].left == Some(parent);
            let child_is_left = self.nodes[parent.0].left == Some(id);
            if parent_is_left == child_is_left {
                // zig-zig
                self.rotate(grandparent, parent);
                self.rotate(parent, id);
            } else {
                // zig-zag
                self.rotate(parent, id);
                self.rotate(grandparent, id);
            }
        }
    }

    /// Removes a fully detached node from the arena. The last node in the arena is moved into the
    /// freed slot, so every link to it is redirected.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let last = NodeId(self.nodes.len() - 1);
        let node = self.nodes.swap_remove(id.0);
        if id != last {
            let moved = &self.nodes[id.0];
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            if let Some(parent) = parent {
                let p = &mut self.nodes[parent.0];
                if p.left == Some(last) {
                    p.left = Some(id);
                } else {
                    p.right = Some(id);
                }
            }
            self.set_parent(left, Some(id));
            self.set_parent(right, Some(id));
            if self.root == Some(last) {
                self.root = Some(id);
            }
        }
        node
    }
}

#[cfg(test)]
impl<K, V> Tree<K, V> {
    /// Keys in sorted (in-order) order.
    pub(crate) fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id.0].left;
            }
            if let Some(id) = stack.pop() {
                keys.push(&self.nodes[id.0].key);
                current = self.nodes[id.0].right;
            }
        }
        keys
    }

    pub(crate) fn root_key(&self) -> Option<&K> {
        self.root.map(|id| &self.nodes[id.0].key)
    }

    /// Checks BST order, that every back reference matches the real parent, and that every arena
    /// slot is reachable from the root exactly once.
    pub(crate) fn assert_invariants(&self)
    where
        K: Ord,
    {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            assert_eq!(self.nodes[root.0].parent, None);
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            assert!(!seen[id.0], "node reachable twice");
            seen[id.0] = true;
            let node = &self.nodes[id.0];
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(self.nodes[child.0].parent, Some(id));
                stack.push(child);
            }
            if let Some(left) = node.left {
                assert!(self.nodes[left.0].key < node.key);
            }
            if let Some(right) = node.right {
                assert!(self.nodes[right.0].key > node.key);
            }
        }
        assert!(seen.into_iter().all(|s| s), "unreachable node in arena");
        assert!(self.keys().windows(2).all(|w| w[0] < w[1]));
    }
}
