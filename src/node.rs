use alloc::vec::Vec;
use core::{
    mem,
    ops::{Index, IndexMut},
};

use crate::{balance::Balance, Dir};

/// A handle to a slot in a [`Nodes`] arena.
///
/// A handle stays attached to the same key-value pair from insertion until removal; rotations and
/// swaps only rewrite [`Links`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

/// The structural part of a node: its position in the tree and its balance factor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    parent: Link,
    children: [Link; 2],
    balance: Balance,
}

impl Links {
    #[inline]
    pub(crate) fn balance(&self) -> Balance {
        self.balance
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
    }

    /// Returns a copy of these links with every handle passed through `f`.
    #[inline]
    pub(crate) fn remapped(self, f: impl Fn(Link) -> Link) -> Links {
        Links {
            parent: f(self.parent),
            children: [f(self.children[0]), f(self.children[1])],
            balance: self.balance,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) links: Links,
}

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Link },
}

/// Storage for the nodes of a tree.
///
/// Released slots form a singly linked free list threaded through the vacant slots, and are reused
/// before the backing vector grows.
#[derive(Clone, Debug)]
pub(crate) struct Nodes<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Link,
}

impl<K, V> Nodes<K, V> {
    pub(crate) const fn new() -> Self {
        Nodes {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Nodes {
            slots: Vec::with_capacity(capacity),
            free_head: None,
        }
    }

    /// Stores a new isolated node with balance 0 and returns its handle.
    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Node {
            key,
            value,
            links: Links::default(),
        };

        match self.free_head {
            Some(id) => {
                let slot = mem::replace(&mut self.slots[id.0], Slot::Occupied(node));
                let Slot::Vacant { next_free } = slot else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free_head = next_free;
                id
            }

            None => {
                let id = NodeId(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Releases the slot behind `id`, returning its payload.
    ///
    /// The caller must already have unlinked the node from every surviving node.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        match mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(id);
                (node.key, node.value)
            }

            Slot::Vacant { .. } => panic!("released a vacant slot {id:?}"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Returns the number of slots, occupied or not.
    #[cfg(test)]
    pub(crate) fn capacity_used(&self) -> usize {
        self.slots.len()
    }

    /// Borrows every occupied node mutably at once, indexed by handle.
    ///
    /// Vacant slots map to `None`.
    pub(crate) fn each_mut(&mut self) -> Vec<Option<&mut Node<K, V>>> {
        self.slots
            .iter_mut()
            .map(|slot| match slot {
                Slot::Occupied(node) => Some(node),
                Slot::Vacant { .. } => None,
            })
            .collect()
    }

    #[inline]
    pub(crate) fn links(&self, id: NodeId) -> &Links {
        &self[id].links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, id: NodeId) -> &mut Links {
        &mut self[id].links
    }
}

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl<K, V> Index<NodeId> for Nodes<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node handle {id:?}"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Nodes<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node handle {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_reused() {
        let mut nodes: Nodes<u32, &str> = Nodes::new();

        let a = nodes.alloc(1, "a");
        let b = nodes.alloc(2, "b");
        let c = nodes.alloc(3, "c");
        assert_eq!(nodes.capacity_used(), 3);

        assert_eq!(nodes.release(b), (2, "b"));
        assert_eq!(nodes.release(a), (1, "a"));

        // Last released, first reused.
        assert_eq!(nodes.alloc(4, "d"), a);
        assert_eq!(nodes.alloc(5, "e"), b);
        assert_eq!(nodes.capacity_used(), 3);

        assert_eq!(nodes[c].key, 3);
        assert_eq!(nodes[a].key, 4);
        assert_eq!(nodes[b].value, "e");
    }

    #[test]
    fn fresh_nodes_are_isolated() {
        let mut nodes: Nodes<u32, ()> = Nodes::with_capacity(4);
        let a = nodes.alloc(7, ());

        let links = nodes.links(a);
        assert_eq!(links.left(), None);
        assert_eq!(links.right(), None);
        assert_eq!(links.parent(), None);
        assert_eq!(links.balance(), Balance::LEVEL);
    }

    #[test]
    #[should_panic(expected = "dangling node handle")]
    fn released_handle_dangles() {
        let mut nodes: Nodes<u32, ()> = Nodes::new();
        let a = nodes.alloc(1, ());
        nodes.release(a);
        let _ = nodes.links(a);
    }

    #[test]
    fn remap_swaps_handles() {
        let mut nodes: Nodes<u32, ()> = Nodes::new();
        let a = nodes.alloc(1, ());
        let b = nodes.alloc(2, ());
        let c = nodes.alloc(3, ());

        let mut links = Links::default();
        links.set_parent(Some(a));
        links.set_child(Dir::Left, Some(b));
        links.set_child(Dir::Right, Some(c));

        let swapped = links.remapped(|l| match l {
            Some(n) if n == a => Some(b),
            Some(n) if n == b => Some(a),
            other => other,
        });

        assert_eq!(swapped.parent(), Some(b));
        assert_eq!(swapped.left(), Some(a));
        assert_eq!(swapped.right(), Some(c));
    }
}
