use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::{
    node::{Link, Node, NodeId},
    AvlTree, Dir,
};

/// An iterator over the entries of an [`AvlTree`], sorted by key.
///
/// Walks the tree through parent links, so it needs no stack and can be cloned to restart from
/// its current position.
pub struct Iter<'tree, K, V> {
    tree: &'tree AvlTree<K, V>,

    front: Link,
    back: Link,

    len: usize,
}

impl<'tree, K, V> Iter<'tree, K, V> {
    pub(crate) fn new(tree: &'tree AvlTree<K, V>) -> Self {
        Iter {
            tree,

            front: tree.extreme_in_tree(Dir::Left),
            back: tree.extreme_in_tree(Dir::Right),
            len: tree.len(),
        }
    }

    fn entry(&self, node: NodeId) -> (&'tree K, &'tree V) {
        let node = &self.tree.nodes[node];
        (&node.key, &node.value)
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'tree, K, V> Iterator for Iter<'tree, K, V> {
    type Item = (&'tree K, &'tree V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.len -= 1;
        self.front = self.tree.successor(cur);

        Some(self.entry(cur))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.len -= 1;
        self.back = self.tree.predecessor(cur);

        Some(self.entry(cur))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the entries of an [`AvlTree`], sorted by key, with mutable references to the
/// values.
pub struct IterMut<'tree, K, V> {
    // Nodes in key order. Each `&mut` is taken out exactly once.
    nodes: Vec<Option<&'tree mut Node<K, V>>>,
    order: alloc::vec::IntoIter<usize>,
}

impl<'tree, K, V> IterMut<'tree, K, V> {
    pub(crate) fn new(tree: &'tree mut AvlTree<K, V>) -> Self {
        let mut order = Vec::with_capacity(tree.len());
        let mut opt_cur = tree.extreme_in_tree(Dir::Left);

        while let Some(cur) = opt_cur {
            order.push(cur.index());
            opt_cur = tree.successor(cur);
        }

        IterMut {
            nodes: tree.nodes.each_mut(),
            order: order.into_iter(),
        }
    }

    fn take(&mut self, index: usize) -> (&'tree K, &'tree mut V) {
        let node = self.nodes[index]
            .take()
            .expect("in-order walk visited a node twice");

        (&node.key, &mut node.value)
    }
}

impl<'tree, K, V> Iterator for IterMut<'tree, K, V> {
    type Item = (&'tree K, &'tree mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.order.next()?;
        Some(self.take(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.order.next_back()?;
        Some(self.take(index))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an [`AvlTree`], sorted by key.
pub struct IntoIter<K, V> {
    pub(crate) tree: AvlTree<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree.pop_last()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// An iterator over the keys of an [`AvlTree`], in sorted order.
pub struct Keys<'tree, K, V> {
    pub(crate) inner: Iter<'tree, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'tree, K, V> Iterator for Keys<'tree, K, V> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of an [`AvlTree`], in order by key.
pub struct Values<'tree, K, V> {
    pub(crate) inner: Iter<'tree, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<'tree, K, V> Iterator for Values<'tree, K, V> {
    type Item = &'tree V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An iterator over mutable references to the values of an [`AvlTree`], in order by key.
pub struct ValuesMut<'tree, K, V> {
    pub(crate) inner: IterMut<'tree, K, V>,
}

impl<'tree, K, V> Iterator for ValuesMut<'tree, K, V> {
    type Item = &'tree mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
