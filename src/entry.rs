use core::fmt;

use crate::{node::NodeId, AvlTree, Dir};

/// A view into a single entry in an [`AvlTree`], which may be either vacant or occupied.
///
/// Returned by [`AvlTree::entry`].
pub enum Entry<'tree, K, V> {
    Vacant(VacantEntry<'tree, K, V>),
    Occupied(OccupiedEntry<'tree, K, V>),
}

/// Where a vacant key would be attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InsertAs {
    Root,
    Child { parent: NodeId, dir: Dir },
}

impl<'tree, K: Ord, V> Entry<'tree, K, V> {
    pub(crate) fn new(tree: &'tree mut AvlTree<K, V>, key: K) -> Self {
        match tree.search(&key) {
            Ok(node) => Entry::Occupied(OccupiedEntry { tree, node }),
            Err(insert_as) => Entry::Vacant(VacantEntry {
                tree,
                key,
                insert_as,
            }),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Vacant(entry) => entry.key(),
            Entry::Occupied(entry) => entry.key(),
        }
    }

    /// Inserts `default` if the entry is vacant, and returns a mutable reference to the value.
    pub fn or_insert(self, default: V) -> &'tree mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Inserts the result of `default` if the entry is vacant, and returns a mutable reference to
    /// the value.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'tree mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify<F: FnOnce(&mut V)>(mut self, f: F) -> Self {
        if let Entry::Occupied(entry) = &mut self {
            f(entry.get_mut());
        }

        self
    }
}

impl<'tree, K: Ord, V: Default> Entry<'tree, K, V> {
    /// Inserts `V::default()` if the entry is vacant, and returns a mutable reference to the value.
    pub fn or_default(self) -> &'tree mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in an [`AvlTree`].
pub struct VacantEntry<'tree, K, V> {
    pub(crate) tree: &'tree mut AvlTree<K, V>,
    pub(crate) key: K,
    pub(crate) insert_as: InsertAs,
}

impl<'tree, K, V> VacantEntry<'tree, K, V> {
    /// Returns a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` at the key associated with this entry, rebalancing the tree.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(self, value: V) -> &'tree mut V {
        let VacantEntry {
            tree,
            key,
            insert_as,
        } = self;
        let node = tree.insert_at(insert_as, key, value);

        &mut tree.nodes[node].value
    }
}

/// A view into an occupied entry in an [`AvlTree`].
pub struct OccupiedEntry<'tree, K, V> {
    pub(crate) tree: &'tree mut AvlTree<K, V>,
    pub(crate) node: NodeId,
}

impl<'tree, K, V> OccupiedEntry<'tree, K, V> {
    /// Returns a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.tree.nodes[self.node].key
    }

    /// Returns a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.tree.nodes[self.node].value
    }

    /// Returns a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.tree.nodes[self.node].value
    }

    /// Converts the entry into a mutable reference to its value, bound to the tree's borrow.
    pub fn into_mut(self) -> &'tree mut V {
        let OccupiedEntry { tree, node } = self;
        &mut tree.nodes[node].value
    }

    /// Replaces the value in the entry, returning the old value.
    ///
    /// The tree's shape is untouched.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the tree, returning its key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.tree.remove_at(self.node)
    }

    /// Removes the entry from the tree, returning its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }
}

/// The error returned by [`AvlTree::try_insert`] when the key is already present.
///
/// Holds the occupied entry and the value that was not inserted.
pub struct OccupiedError<'tree, K, V> {
    pub entry: OccupiedEntry<'tree, K, V>,
    pub value: V,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OccupiedEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry")
            .field("key", self.key())
            .field("value", self.get())
            .finish()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for VacantEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VacantEntry").field(self.key()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(entry) => f.debug_tuple("Entry").field(entry).finish(),
            Entry::Occupied(entry) => f.debug_tuple("Entry").field(entry).finish(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OccupiedError<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedError")
            .field("key", self.entry.key())
            .field("old_value", self.entry.get())
            .field("new_value", &self.value)
            .finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for OccupiedError<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to insert {:?}, key {:?} already exists with value {:?}",
            self.value,
            self.entry.key(),
            self.entry.get(),
        )
    }
}

#[cfg(feature = "std")]
impl<K: fmt::Debug, V: fmt::Debug> std::error::Error for OccupiedError<'_, K, V> {}
