//! A height-balanced BST (an AVL tree). Every node caches the height of its subtree and every
//! structural change is followed by a rebalance of each ancestor on the way back up, so the
//! height of the tree never exceeds roughly `1.44 * lg N`.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::avl::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//!
//! tree.insert(1, 2);
//! assert_eq!(tree.find(&1), Some(&2));
//!
//! // Inserting a new value for the same key overwrites the value.
//! tree.insert(1, 3);
//! assert_eq!(tree.find(&1), Some(&3));
//! assert_eq!(tree.len(), 1);
//!
//! // Erasing a node returns its value.
//! assert_eq!(tree.erase(&1), Some(3));
//! assert_eq!(tree.find(&1), None);
//! ```

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// Counters describing the work done by the most recent top-level `insert`, `erase` or `find`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpStats {
    /// Single rotations performed while rebalancing. A double rotation counts twice.
    pub rotations: usize,
    /// Key comparisons made while walking the tree.
    pub comparisons: usize,
}

/// A self-balancing Binary Search Tree (specifically, an AVL tree). This can be used for
/// inserting, finding, and erasing keys and values.
#[derive(Clone)]
pub struct Tree<K, V> {
    root: Link<K, V>,
    len: usize,
    // A `Cell` so that `find` can record its comparisons through `&self`.
    last_op: Cell<OpStats>,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for Tree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> fmt::Debug for Tree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

impl<K, V> Tree<K, V> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            last_op: Cell::new(OpStats::default()),
        }
    }

    /// The number of keys stored in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rotation and comparison counts for the most recent `insert`, `erase` or `find`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, ());
    /// tree.insert(2, ());
    ///
    /// // Ascending inserts make the root right-heavy, so the third one rotates.
    /// tree.insert(3, ());
    /// assert_eq!(tree.last_op().rotations, 1);
    ///
    /// tree.find(&3);
    /// assert_eq!(tree.last_op().rotations, 0);
    /// assert_eq!(tree.last_op().comparisons, 2);
    /// ```
    pub fn last_op(&self) -> OpStats {
        self.last_op.get()
    }

    /// Potentially finds the value associated with the given key in this tree. If no node has the
    /// corresponding key, `None` is returned.
    pub fn find(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        let mut stats = OpStats::default();
        let mut current = self.root.as_deref();
        let mut found = None;
        while let Some(node) = current {
            stats.comparisons += 1;
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Equal => {
                    found = Some(&node.value);
                    break;
                }
                Ordering::Greater => current = node.right.as_deref(),
            }
        }
        self.last_op.set(stats);
        found
    }

    /// Inserts the given value into the tree stored at the given key. Inserting a new value for an
    /// existing key overwrites its value and keeps the tree's shape.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let mut stats = OpStats::default();
        if Node::insert(&mut self.root, key, value, &mut stats) {
            self.len += 1;
        }
        self.last_op.set(stats);
    }

    /// Erases the node containing the given key from the tree and returns its value. If the tree
    /// does not contain a node with the key, nothing happens and `None` is returned.
    pub fn erase(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let mut stats = OpStats::default();
        let erased = Node::erase(&mut self.root, key, &mut stats);
        if erased.is_some() {
            self.len -= 1;
        }
        self.last_op.set(stats);
        erased
    }

    /// Releases every node. Safe to call on an empty tree.
    ///
    /// Nodes are torn down with an explicit stack rather than recursion, and every present child
    /// is pushed before its parent is freed.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }
}

// TODO stack based Clone
#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    height: usize,
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("height", &self.height)
            .field("value", &self.value)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

impl<K, V> Node<K, V> {
    fn new_boxed(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    /// Adjusts the height of `self` to be the max of its children's heights + 1.
    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// The difference in height between the right and left subtrees. See [the Wikipedia
    /// page][wiki] for more details.
    ///
    /// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
    fn balance_factor(&self) -> isize {
        height(&self.right) as isize - height(&self.left) as isize
    }

    /// Inserts below `link`, returning whether a new node was allocated. Every ancestor of the
    /// insertion point is rebalanced as the recursion unwinds.
    fn insert(link: &mut Link<K, V>, key: K, value: V, stats: &mut OpStats) -> bool
    where
        K: Ord,
    {
        let Some(node) = link.as_deref_mut() else {
            *link = Some(Self::new_boxed(key, value));
            return true;
        };

        stats.comparisons += 1;
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => Self::insert(&mut node.left, key, value, stats),
            Ordering::Equal => {
                node.value = value;
                return false;
            }
            Ordering::Greater => Self::insert(&mut node.right, key, value, stats),
        };

        if inserted {
            Self::balance(link, stats);
        }
        inserted
    }

    /// Erases `key` from the subtree under `link` and rebalances on the way back up.
    fn erase(link: &mut Link<K, V>, key: &K, stats: &mut OpStats) -> Option<V>
    where
        K: Ord,
    {
        let node = link.as_deref_mut()?;

        stats.comparisons += 1;
        let erased = match key.cmp(&node.key) {
            Ordering::Less => Self::erase(&mut node.left, key, stats),
            Ordering::Equal => return Some(Self::remove(link, stats)),
            Ordering::Greater => Self::erase(&mut node.right, key, stats),
        };

        if erased.is_some() {
            Self::balance(link, stats);
        }
        erased
    }

    /// Unlinks the node at `link` and returns its value.
    ///
    /// With at most one child the node is spliced out. With two children it takes over the key and
    /// value of its in-order successor, which is then removed from the right subtree instead.
    fn remove(link: &mut Link<K, V>, stats: &mut OpStats) -> V {
        let mut node = link.take().expect("Removing a node requires a node");
        match (node.left.take(), node.right.take()) {
            (None, child) | (child, None) => {
                *link = child;
                node.value
            }
            (Some(left), Some(right)) => {
                let mut right = Some(right);
                let mut successor = Self::take_min(&mut right, stats);
                std::mem::swap(&mut node.key, &mut successor.key);
                std::mem::swap(&mut node.value, &mut successor.value);

                node.left = Some(left);
                node.right = right;
                *link = Some(node);
                Self::balance(link, stats);

                // After the swap the detached successor carries the erased key and value.
                successor.value
            }
        }
    }

    /// Detaches the leftmost node under `link`, rebalancing each node on the path to it.
    ///
    /// ## Panics
    ///
    /// When `link` is empty.
    fn take_min(link: &mut Link<K, V>, stats: &mut OpStats) -> Box<Self> {
        let node = link.as_deref_mut().expect("Minimum of an empty subtree");
        if node.left.is_some() {
            let min = Self::take_min(&mut node.left, stats);
            Self::balance(link, stats);
            return min;
        }

        let mut min = link.take().expect("Minimum of an empty subtree");
        *link = min.right.take();
        min
    }

    /// Recomputes the height at `link` and rotates if its balance factor reached 2 or -2.
    ///
    /// See <https://en.wikipedia.org/wiki/AVL_tree#Rebalancing> for terminology.
    fn balance(link: &mut Link<K, V>, stats: &mut OpStats) {
        let Some(node) = link.as_deref_mut() else {
            return;
        };
        node.fix_height();
        match node.balance_factor() {
            2 => {
                if node.right.as_ref().map_or(0, |n| n.balance_factor()) < 0 {
                    Self::rotate_right(&mut node.right, stats);
                }
                Self::rotate_left(link, stats);
            }
            -2 => {
                if node.left.as_ref().map_or(0, |n| n.balance_factor()) > 0 {
                    Self::rotate_left(&mut node.left, stats);
                }
                Self::rotate_right(link, stats);
            }
            _ => {}
        }

        if cfg!(debug_assertions) {
            if let Some(node) = link.as_deref() {
                let (left_height, right_height) = (height(&node.left), height(&node.right));
                assert_eq!(node.height, left_height.max(right_height) + 1);
                assert!(left_height.abs_diff(right_height) <= 1);
            }
        }
    }

    /// Rotate `link` to the right. This moves the left child up vertically and the old root down
    /// vertically. It must only be called when there _is_ a left child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///      old_root                new_root
    ///       /     \                /     \
    ///   new_root   z   rotate ->  x    old_root
    ///    /  \                           /  \
    ///   x    y                         y    z
    /// ```
    fn rotate_right(link: &mut Link<K, V>, stats: &mut OpStats) {
        let mut old_root = link.take().expect("Cannot rotate empty tree/node.");
        let mut new_root = old_root.left.take().expect("Rotate right => left child");

        old_root.left = new_root.right.take();
        old_root.fix_height();

        new_root.right = Some(old_root);
        new_root.fix_height();
        *link = Some(new_root);
        stats.rotations += 1;
    }

    /// The mirror image of [`Node::rotate_right`].
    fn rotate_left(link: &mut Link<K, V>, stats: &mut OpStats) {
        let mut old_root = link.take().expect("Cannot rotate empty tree/node.");
        let mut new_root = old_root.right.take().expect("Rotate left => right child");

        old_root.right = new_root.left.take();
        old_root.fix_height();

        new_root.left = Some(old_root);
        new_root.fix_height();
        *link = Some(new_root);
        stats.rotations += 1;
    }
}

#[cfg(test)]
impl<K, V> Tree<K, V> {
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

    /// Checks BST order, cached heights, the AVL balance condition and the node count.
    pub(crate) fn assert_invariants(&self)
    where
        K: Ord,
    {
        fn check<K: Ord, V>(link: &Link<K, V>) -> (usize, usize) {
            let Some(node) = link.as_deref() else {
                return (0, 0);
            };
            if let Some(left) = &node.left {
                assert!(left.key < node.key);
            }
            if let Some(right) = &node.right {
                assert!(right.key > node.key);
            }
            let (left_height, left_count) = check(&node.left);
            let (right_height, right_count) = check(&node.right);
            assert!(left_height.abs_diff(right_height) <= 1);
            assert_eq!(node.height, left_height.max(right_height) + 1);
            (node.height, left_count + right_count + 1)
        }

        let (_, count) = check(&self.root);
        assert_eq!(count, self.len);
        assert!(self.keys().windows(2).all(|w| w[0] < w[1]));
    }
}
