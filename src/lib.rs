//! An arena-backed AVL tree map.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Conventions used in comments:
// - The balance of a node `x` is `b(x) = h(right(x)) - h(left(x))`, where a missing subtree has
//   height 0.
// - A node "leans" toward the side of its taller subtree.
// - `dir` always names a side; `!dir` is the other side.
//
// The fundamental invariants of an AVL tree are:
// 1. Keys are ordered: left subtree < node < right subtree.
// 2. Every node has `b(x) ∈ {-1, 0, 1}` once an operation has returned.
// 3. The stored balance of every node matches the heights of its subtrees.
//
// Nodes live in an arena and refer to each other by `NodeId`. A `NodeId` is bound to one key-value
// pair until it is removed: rotations and swaps move links, never payloads.

extern crate alloc;

use core::{borrow::Borrow, cmp::Ordering, ops::Not};

use log::trace;

mod balance;
mod cursor;
mod debug;
mod entry;
mod iter;
mod map;
mod node;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use cursor::{Cursor, CursorMut};
pub use entry::{Entry, OccupiedEntry, OccupiedError, VacantEntry};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};

use balance::Balance;
use entry::InsertAs;
use node::{Link, Links, NodeId, Nodes};

/// An ordered map based on an [AVL tree].
///
/// Each key appears at most once. The tree keeps the heights of the two subtrees of every node
/// within one of each other, so lookups, insertions and removals all complete in _O(log(n))_ time.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct AvlTree<K, V> {
    nodes: Nodes<K, V>,
    root: Link,
    len: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

impl<K, V> AvlTree<K, V> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K, V> {
        AvlTree {
            nodes: Nodes::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns a new empty tree with room for `capacity` elements before reallocating.
    pub fn with_capacity(capacity: usize) -> AvlTree<K, V> {
        AvlTree {
            nodes: Nodes::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reserves room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    #[inline]
    fn links(&self, node: NodeId) -> &Links {
        self.nodes.links(node)
    }

    #[inline]
    fn links_mut(&mut self, node: NodeId) -> &mut Links {
        self.nodes.links_mut(node)
    }

    #[inline]
    fn balance(&self, node: NodeId) -> Balance {
        self.links(node).balance()
    }

    #[inline]
    fn set_balance(&mut self, node: NodeId, balance: Balance) {
        self.links_mut(node).set_balance(balance);
    }

    #[inline]
    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        if let Some(node) = opt_node {
            self.links_mut(node).set_parent(parent);
        }
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.links(parent).left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.links(parent).right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: Link) {
        let dir = self.which_child(parent, old_child);

        if cfg!(debug_assertions) {
            if let Some(new_child) = new_child {
                assert_ne!(
                    self.links(parent).child(!dir),
                    Some(new_child),
                    "`new_child` must not be a child of `parent`"
                );
            }
        }

        self.links_mut(parent).set_child(dir, new_child);
    }

    // Returns the last node reached by following `dir` links from `node`: the minimum of the
    // subtree for `Dir::Left`, the maximum for `Dir::Right`.
    fn extreme(&self, mut node: NodeId, dir: Dir) -> NodeId {
        while let Some(child) = self.links(node).child(dir) {
            node = child;
        }

        node
    }

    fn extreme_in_tree(&self, dir: Dir) -> Link {
        self.root.map(|root| self.extreme(root, dir))
    }

    // Returns the in-order neighbor of `node` in direction `dir`: the successor for `Dir::Right`,
    // the predecessor for `Dir::Left`.
    fn neighbor(&self, node: NodeId, dir: Dir) -> Link {
        if let Some(child) = self.links(node).child(dir) {
            return Some(self.extreme(child, !dir));
        }

        // Climb while `cur` is a `dir` child; the first ancestor reached from its `!dir` side is
        // the neighbor.
        let mut cur = node;
        loop {
            let parent = self.links(cur).parent()?;

            if self.which_child(parent, cur) == !dir {
                return Some(parent);
            }

            cur = parent;
        }
    }

    #[inline]
    fn successor(&self, node: NodeId) -> Link {
        self.neighbor(node, Dir::Right)
    }

    #[inline]
    fn predecessor(&self, node: NodeId) -> Link {
        self.neighbor(node, Dir::Left)
    }

    // Performs a single rotation at `pivot`, moving it down to the `dir` side of its `!dir` child.
    // `Dir::Left` is a left rotation (the right child comes up), `Dir::Right` a right rotation.
    //
    // Balances of affected nodes are not updated.
    fn rotate(&mut self, pivot: NodeId, dir: Dir) {
        trace!("rotate {dir:?} at {pivot:?}");

        // - `up` goes from the `!dir` child of `pivot` to the subtree root.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `pivot`.
        let up = self
            .links(pivot)
            .child(!dir)
            .expect("rotation requires a child on the far side of the pivot");

        let across = self.links(up).child(dir);
        self.links_mut(pivot).set_child(!dir, across);
        self.maybe_set_parent(across, Some(pivot));

        self.links_mut(up).set_child(dir, Some(pivot));
        let parent = self.links_mut(pivot).set_parent(Some(up));
        self.links_mut(up).set_parent(parent);

        self.replace_child_or_set_root(parent, pivot, Some(up));

        debug_assert_eq!(self.links(pivot).parent(), Some(up));
        debug_assert_eq!(self.links(up).child(dir), Some(pivot));
    }

    // Attaches a new node at a vacant position found by `search` and restores the AVL invariant.
    fn insert_at(&mut self, insert_as: InsertAs, key: K, value: V) -> NodeId {
        let node = self.nodes.alloc(key, value);
        self.len += 1;

        let (parent, dir) = match insert_as {
            InsertAs::Root => {
                debug_assert!(self.root.is_none());
                self.root = Some(node);
                return node;
            }

            InsertAs::Child { parent, dir } => (parent, dir),
        };

        let old = self.links_mut(parent).set_child(dir, Some(node));
        debug_assert!(old.is_none(), "attachment point is occupied");
        self.links_mut(node).set_parent(Some(parent));

        let balance = self.balance(parent).tilted(dir);
        self.set_balance(parent, balance);

        // If the parent was leaning, the new leaf filled its short side and the height of its
        // subtree is unchanged.
        if balance != Balance::LEVEL {
            self.rebalance_inserted(node, parent);
        }

        node
    }

    // Performs a bottom-up rebalance of the tree after an insertion below `parent`.
    //
    // Invariants:
    // - `node` is a child of `parent`.
    // - The subtree rooted at `parent` grew one level taller, through `node`.
    // - `parent` leans toward `node`.
    fn rebalance_inserted(&mut self, mut node: NodeId, mut parent: NodeId) {
        loop {
            let Some(grandparent) = self.links(parent).parent() else {
                trace!("insert fix-up reached the root");
                return;
            };

            let dir = self.which_child(grandparent, parent);
            let balance = self.balance(grandparent).tilted(dir);

            if balance == Balance::LEVEL {
                // The short side caught up; the grandparent's height is unchanged.
                self.set_balance(grandparent, balance);
                trace!("insert fix-up absorbed at {grandparent:?}");
                return;
            }

            if balance.is_valid() {
                // The grandparent was level and now leans; its subtree grew too.
                self.set_balance(grandparent, balance);
                (node, parent) = (parent, grandparent);
                continue;
            }

            // The grandparent is two levels heavier on the `dir` side.
            let leaning = Balance::leaning(dir);

            if self.balance(parent) == leaning {
                trace!("insert fix-up: single rotation at {grandparent:?}");
                self.rotate(grandparent, !dir);
                self.set_balance(parent, Balance::LEVEL);
                self.set_balance(grandparent, Balance::LEVEL);
            } else {
                trace!("insert fix-up: double rotation at {grandparent:?} through {node:?}");
                debug_assert_eq!(self.links(parent).child(!dir), Some(node));

                self.rotate(parent, dir);
                self.rotate(grandparent, !dir);

                let node_balance = self.balance(node);
                let (parent_balance, grandparent_balance) = if node_balance == leaning {
                    (Balance::LEVEL, Balance::leaning(!dir))
                } else if node_balance == Balance::LEVEL {
                    (Balance::LEVEL, Balance::LEVEL)
                } else {
                    (leaning, Balance::LEVEL)
                };

                self.set_balance(parent, parent_balance);
                self.set_balance(grandparent, grandparent_balance);
                self.set_balance(node, Balance::LEVEL);
            }

            // A rotation restores the pre-insertion height of the subtree.
            return;
        }
    }

    // Exchanges the positions of `a` and `b` in the tree, balances included.
    //
    // Keys and values stay with their handles. Works whether or not the two nodes are adjacent.
    fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }

        let swap = |link: Link| match link {
            Some(n) if n == a => Some(b),
            Some(n) if n == b => Some(a),
            other => other,
        };

        let links_a = *self.links(a);
        let links_b = *self.links(b);

        *self.links_mut(a) = links_b.remapped(swap);
        *self.links_mut(b) = links_a.remapped(swap);

        // Every other node adjacent to either position still names the old occupant.
        let neighbors = [
            links_a.parent(),
            links_a.left(),
            links_a.right(),
            links_b.parent(),
            links_b.left(),
            links_b.right(),
        ];

        for (i, &neighbor) in neighbors.iter().enumerate() {
            let Some(n) = neighbor else {
                continue;
            };

            if n == a || n == b || neighbors[..i].contains(&neighbor) {
                continue;
            }

            let links = self.links_mut(n);
            *links = links.remapped(swap);
        }

        self.root = swap(self.root);
    }

    // Unlinks `node`, rebalances, and returns its payload.
    fn remove_at(&mut self, node: NodeId) -> (K, V) {
        let links = *self.links(node);

        // A node with two children trades places with its in-order predecessor, which has no
        // right child.
        if let (Some(left), Some(_)) = (links.left(), links.right()) {
            let predecessor = self.extreme(left, Dir::Right);
            self.swap_nodes(node, predecessor);
        }

        let links = *self.links(node);
        debug_assert!(links.left().is_none() || links.right().is_none());

        let parent = links.parent();
        let child = links.left().or(links.right());
        let shrunk = parent.map(|p| self.which_child(p, node));

        self.replace_child_or_set_root(parent, node, child);
        self.maybe_set_parent(child, parent);

        let payload = self.nodes.release(node);
        self.len -= 1;

        if let (Some(parent), Some(shrunk)) = (parent, shrunk) {
            self.rebalance_removed(parent, shrunk);
        }

        payload
    }

    // Performs a bottom-up rebalance of the tree after the `shrunk` subtree of `node` lost one
    // level of height.
    fn rebalance_removed(&mut self, mut node: NodeId, mut shrunk: Dir) {
        loop {
            let parent = self.links(node).parent();
            let next_shrunk = parent.map(|p| self.which_child(p, node));

            let heavy = !shrunk;
            let balance = self.balance(node).tilted(heavy);

            if balance == Balance::LEVEL {
                // `node` was leaning toward the shrunk side; its own height dropped.
                self.set_balance(node, balance);
            } else if balance.is_valid() {
                // `node` was level; its taller side still sets its height.
                self.set_balance(node, balance);
                trace!("remove fix-up absorbed at {node:?}");
                return;
            } else {
                let child = self
                    .links(node)
                    .child(heavy)
                    .expect("heavy side of an unbalanced node must be present");
                let child_balance = self.balance(child);

                if child_balance == Balance::LEVEL {
                    trace!("remove fix-up: single rotation at {node:?}, height kept");
                    self.rotate(node, shrunk);
                    self.set_balance(node, Balance::leaning(heavy));
                    self.set_balance(child, Balance::leaning(shrunk));
                    return;
                }

                if child_balance == Balance::leaning(heavy) {
                    trace!("remove fix-up: single rotation at {node:?}");
                    self.rotate(node, shrunk);
                    self.set_balance(node, Balance::LEVEL);
                    self.set_balance(child, Balance::LEVEL);
                } else {
                    let grandchild = self
                        .links(child)
                        .child(shrunk)
                        .expect("inner child of a leaning node must be present");
                    trace!("remove fix-up: double rotation at {node:?} through {grandchild:?}");

                    self.rotate(child, heavy);
                    self.rotate(node, shrunk);

                    let grandchild_balance = self.balance(grandchild);
                    let (node_balance, child_balance) =
                        if grandchild_balance == Balance::leaning(heavy) {
                            (Balance::leaning(shrunk), Balance::LEVEL)
                        } else if grandchild_balance == Balance::LEVEL {
                            (Balance::LEVEL, Balance::LEVEL)
                        } else {
                            (Balance::LEVEL, Balance::leaning(heavy))
                        };

                    self.set_balance(node, node_balance);
                    self.set_balance(child, child_balance);
                    self.set_balance(grandchild, Balance::LEVEL);
                }
            }

            // The subtree formerly rooted at `node` is one level shorter; carry on upward.
            match (parent, next_shrunk) {
                (Some(parent), Some(dir)) => (node, shrunk) = (parent, dir),
                _ => return,
            }
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    // Descends from the root looking for `key`.
    //
    // Returns the matching node, or the position a node with that key would be attached at.
    fn search<Q>(&self, key: &Q) -> Result<NodeId, InsertAs>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Err(InsertAs::Root);
        };

        loop {
            let dir = match key.cmp(self.nodes[cur].key.borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Ok(cur),
                Ordering::Greater => Dir::Right,
            };

            match self.links(cur).child(dir) {
                // Descend.
                Some(child) => cur = child,

                None => return Err(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    #[inline]
    fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).ok()
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        match self.root {
            Some(root) => {
                assert_eq!(self.links(root).parent(), None, "root has a parent link");

                let (_, count) = self.assert_invariants_at(root, None, None);
                assert_eq!(count, self.len, "len disagrees with the number of linked nodes");
            }

            None => assert_eq!(self.len, 0, "empty tree has a nonzero len"),
        }
    }

    // Checks the subtree rooted at `node`, whose keys must lie strictly between `lower` and
    // `upper`. Returns the height of the subtree and the number of nodes in it.
    fn assert_invariants_at(
        &self,
        node: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> (usize, usize) {
        let key = &self.nodes[node].key;

        if let Some(lower) = lower {
            assert!(lower < key, "key order violated on the left of {node:?}");
        }

        if let Some(upper) = upper {
            assert!(key < upper, "key order violated on the right of {node:?}");
        }

        let mut heights = [0usize; 2];
        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.links(node).child(dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(
                    self.links(child).parent(),
                    Some(node),
                    "{dir:?} child parent link not set"
                );

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(key)),
                    Dir::Right => (Some(key), upper),
                };

                let (height, sub_count) = self.assert_invariants_at(child, lower, upper);
                heights[dir as usize] = height;
                count += sub_count;
            }
        }

        let actual = heights[Dir::Right as usize] as isize - heights[Dir::Left as usize] as isize;
        let stored = self.balance(node);

        assert!(stored.is_valid(), "{node:?} is out of balance: {stored:?}");
        assert_eq!(
            stored.get() as isize,
            actual,
            "stored balance of {node:?} disagrees with its subtree heights"
        );

        (1 + heights[0].max(heights[1]), count)
    }
}
