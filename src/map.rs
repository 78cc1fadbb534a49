use core::{
    borrow::Borrow,
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
};

use arbitrary::{Arbitrary, Unstructured};

use crate::{
    cursor::{Cursor, CursorMut},
    entry::{Entry, OccupiedEntry, OccupiedError},
    iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut},
    AvlTree, Dir,
};

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns `true` if the tree contains a value associated with `key`.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the value associated with `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &self.nodes[node].value)
    }

    /// Returns the stored key and the value associated with `key`.
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| {
            let node = &self.nodes[node];
            (&node.key, &node.value)
        })
    }

    /// Returns a mutable reference to the value associated with `key`.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key)?;
        Some(&mut self.nodes[node].value)
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the key is already present, its value is overwritten in place and the old value is
    /// returned; the shape of the tree does not change. Otherwise the pair is attached as a new
    /// leaf and the tree is rebalanced.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Inserts a key-value pair into the tree unless the key is already present.
    ///
    /// On success, returns a mutable reference to the inserted value. If the key is present, the
    /// tree is left unchanged and the error carries the occupied entry and `value`.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V, OccupiedError<'_, K, V>> {
        match self.entry(key) {
            Entry::Occupied(entry) => Err(OccupiedError { entry, value }),
            Entry::Vacant(entry) => Ok(entry.insert(value)),
        }
    }

    /// Returns the entry for `key`, for in-place manipulation.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        Entry::new(self, key)
    }

    /// Removes the value associated with `key` from the tree.
    ///
    /// Removing a key that is not present is a no-op returning `None`.
    ///
    /// This operation completes in _O(log(n))_ time.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key` from the tree, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key)?;
        Some(self.remove_at(node))
    }

    /// Returns a cursor pointing at the element with key `key`.
    ///
    /// If there is no such element, the cursor points at the "ghost" non-element.
    pub fn cursor_at<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::at(self, self.find(key))
    }

    /// Returns a mutable cursor pointing at the element with key `key`.
    ///
    /// If there is no such element, the cursor points at the "ghost" non-element.
    pub fn cursor_at_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key);
        CursorMut::at(self, node)
    }
}

impl<K, V> AvlTree<K, V> {
    /// Returns the first key-value pair in the tree.
    ///
    /// The returned key is the minimum key in the tree.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.extreme_in_tree(Dir::Left).map(|node| {
            let node = &self.nodes[node];
            (&node.key, &node.value)
        })
    }

    /// Returns the first entry in the tree, for in-place manipulation.
    pub fn first_entry(&mut self) -> Option<OccupiedEntry<'_, K, V>> {
        let node = self.extreme_in_tree(Dir::Left)?;
        Some(OccupiedEntry { tree: self, node })
    }

    /// Removes and returns the first key-value pair in the tree.
    ///
    /// The returned key is the minimum key in the tree.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = self.extreme_in_tree(Dir::Left)?;
        Some(self.remove_at(node))
    }

    /// Returns the last key-value pair in the tree.
    ///
    /// The returned key is the maximum key in the tree.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.extreme_in_tree(Dir::Right).map(|node| {
            let node = &self.nodes[node];
            (&node.key, &node.value)
        })
    }

    /// Returns the last entry in the tree, for in-place manipulation.
    pub fn last_entry(&mut self) -> Option<OccupiedEntry<'_, K, V>> {
        let node = self.extreme_in_tree(Dir::Right)?;
        Some(OccupiedEntry { tree: self, node })
    }

    /// Removes and returns the last key-value pair in the tree.
    ///
    /// The returned key is the maximum key in the tree.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = self.extreme_in_tree(Dir::Right)?;
        Some(self.remove_at(node))
    }

    /// Clears the tree, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the height of the tree: the number of nodes on its longest root-to-leaf path.
    ///
    /// An empty tree has height 0. This follows the taller child at each level, so it completes in
    /// _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            height += 1;

            let links = self.links(cur);
            opt_cur = match links.balance().heavy_side() {
                Some(dir) => links.child(dir),
                None => links.left(),
            };
        }

        height
    }

    /// Returns an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns an iterator over the entries of the tree, sorted by key, with mutable references
    /// to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self)
    }

    /// Returns an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the tree, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns a cursor pointing at the first element of the tree.
    ///
    /// If the tree is empty, the cursor points at the "ghost" non-element.
    pub fn cursor_first(&self) -> Cursor<'_, K, V> {
        Cursor::at(self, self.extreme_in_tree(Dir::Left))
    }

    /// Returns a cursor pointing at the last element of the tree.
    ///
    /// If the tree is empty, the cursor points at the "ghost" non-element.
    pub fn cursor_last(&self) -> Cursor<'_, K, V> {
        Cursor::at(self, self.extreme_in_tree(Dir::Right))
    }

    /// Returns a mutable cursor pointing at the first element of the tree.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K, V> {
        let node = self.extreme_in_tree(Dir::Left);
        CursorMut::at(self, node)
    }

    /// Returns a mutable cursor pointing at the last element of the tree.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, K, V> {
        let node = self.extreme_in_tree(Dir::Right);
        CursorMut::at(self, node)
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: Hash, V: Hash> Hash for AvlTree<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K, Q, V> Index<&Q> for AvlTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Returns a reference to the value associated with `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTree<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter { tree: self }
    }
}

impl<'tree, K, V> IntoIterator for &'tree AvlTree<K, V> {
    type Item = (&'tree K, &'tree V);
    type IntoIter = Iter<'tree, K, V>;

    fn into_iter(self) -> Iter<'tree, K, V> {
        self.iter()
    }
}

impl<'tree, K, V> IntoIterator for &'tree mut AvlTree<K, V> {
    type Item = (&'tree K, &'tree mut V);
    type IntoIter = IterMut<'tree, K, V>;

    fn into_iter(self) -> IterMut<'tree, K, V> {
        self.iter_mut()
    }
}

impl<'a, K, V> Arbitrary<'a> for AvlTree<K, V>
where
    K: Arbitrary<'a> + Ord,
    V: Arbitrary<'a>,
{
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        u.arbitrary_iter::<(K, V)>()?.collect()
    }

    fn arbitrary_take_rest(u: Unstructured<'a>) -> arbitrary::Result<Self> {
        u.arbitrary_take_rest_iter::<(K, V)>()?.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_entry_multi_insertion() {
        let mut tree = AvlTree::new();

        assert_eq!(tree.insert(3, 17), None);
        assert_eq!(tree.insert(2, 12), None);
        assert_eq!(tree.insert(1, 7), None);

        assert!(tree.contains_key(&2));
        assert!(tree.contains_key(&1));
        assert!(tree.contains_key(&3));

        assert_eq!(tree.insert(3, 19), Some(17));
        assert_eq!(tree[&3], 19);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn map_update_entry() {
        let mut tree = AvlTree::new();

        tree.insert(3, 17);
        *tree.get_mut(&3).unwrap() = 5;

        assert_eq!(tree.get(&3), Some(&5));
        assert_eq!(tree.get_key_value(&3), Some((&3, &5)));
        assert_eq!(tree.get(&4), None);
    }

    #[test]
    fn try_insert_keeps_existing_value() {
        let mut tree = AvlTree::new();
        *tree.try_insert("a", 1).unwrap() += 1;

        let err = tree.try_insert("a", 10).unwrap_err();
        assert_eq!(err.value, 10);
        assert_eq!(*err.entry.get(), 2);
        assert_eq!(
            alloc::format!("{err}"),
            "failed to insert 10, key \"a\" already exists with value 2"
        );

        assert_eq!(tree.get("a"), Some(&2));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut tree: AvlTree<u32, ()> = AvlTree::new();
        assert_eq!(tree.remove(&1), None);

        tree.insert(1, ());
        assert_eq!(tree.remove(&2), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.remove_entry(&1), Some((1, ())));
        assert!(tree.is_empty());
    }

    #[test]
    fn first_and_last() {
        let mut tree: AvlTree<u32, char> = [(5, 'e'), (1, 'a'), (3, 'c')].into();

        assert_eq!(tree.first_key_value(), Some((&1, &'a')));
        assert_eq!(tree.last_key_value(), Some((&5, &'e')));

        if let Some(mut entry) = tree.last_entry() {
            entry.insert('E');
        }

        assert_eq!(tree.pop_last(), Some((5, 'E')));
        assert_eq!(tree.pop_first(), Some((1, 'a')));
        assert_eq!(tree.pop_first(), Some((3, 'c')));
        assert_eq!(tree.pop_first(), None);
        assert_eq!(tree.first_entry().map(|e| *e.key()), None);
    }

    #[test]
    fn entry_api() {
        let mut tree: AvlTree<&str, u32> = AvlTree::new();

        for word in ["b", "a", "b", "c", "b"] {
            *tree.entry(word).or_default() += 1;
        }

        assert_eq!(tree[&"b"], 3);
        assert_eq!(tree.entry("a").key(), &"a");

        tree.entry("a").and_modify(|n| *n *= 10).or_insert(0);
        tree.entry("z").and_modify(|n| *n *= 10).or_insert(7);
        assert_eq!(tree.get(&"a"), Some(&10));
        assert_eq!(tree.get(&"z"), Some(&7));

        match tree.entry("c") {
            Entry::Occupied(entry) => assert_eq!(entry.remove_entry(), ("c", 1)),
            Entry::Vacant(_) => panic!("\"c\" should be occupied"),
        }

        match tree.entry("c") {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), "c"),
            Entry::Occupied(_) => panic!("\"c\" should be vacant"),
        }

        tree.assert_invariants();
    }

    #[test]
    fn equality_ignores_shape() {
        let ascending: AvlTree<u32, u32> = (0..20).map(|k| (k, k * 2)).collect();
        let descending: AvlTree<u32, u32> = (0..20).rev().map(|k| (k, k * 2)).collect();

        assert_eq!(ascending, descending);

        let mut other = descending.clone();
        other.insert(3, 0);
        assert_ne!(ascending, other);
    }

    #[test]
    fn debug_formats_as_map() {
        let tree: AvlTree<u32, &str> = [(2, "two"), (1, "one")].into();
        assert_eq!(alloc::format!("{tree:?}"), "{1: \"one\", 2: \"two\"}");
    }

    #[test]
    fn height_follows_taller_side() {
        let mut tree = AvlTree::new();
        assert_eq!(tree.height(), 0);

        for k in 0..7u32 {
            tree.insert(k, ());
        }
        assert_eq!(tree.height(), 3);

        tree.insert(7, ());
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn arbitrary_tree_is_valid() {
        let bytes: alloc::vec::Vec<u8> = (0..=255).collect();
        let mut u = Unstructured::new(&bytes);

        let tree = AvlTree::<u8, u16>::arbitrary(&mut u).unwrap();
        tree.assert_invariants();
    }
}
