use crate::{node::Link, AvlTree, Dir};

/// A cursor over an [`AvlTree`].
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that connects the
/// last element to the first.
pub struct Cursor<'tree, K, V> {
    tree: &'tree AvlTree<K, V>,
    current: Link,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Cursor { ..*self }
    }
}

impl<'tree, K, V> Cursor<'tree, K, V> {
    pub(crate) fn at(tree: &'tree AvlTree<K, V>, current: Link) -> Cursor<'tree, K, V> {
        Cursor { tree, current }
    }

    /// Moves the cursor to the next element of the `AvlTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the first
    /// element. If it is pointing to the last element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_next(&mut self) {
        self.current = step(self.tree, self.current, Dir::Right);
    }

    /// Moves the cursor to the previous element of the `AvlTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the last
    /// element. If it is pointing to the first element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_prev(&mut self) {
        self.current = step(self.tree, self.current, Dir::Left);
    }

    /// Returns the entry pointed to by the cursor.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element.
    pub fn get(&self) -> Option<(&'tree K, &'tree V)> {
        entry(self.tree, self.current)
    }

    /// Returns the key pointed to by the cursor.
    pub fn key(&self) -> Option<&'tree K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the next entry.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the first element.
    /// If it is pointing to the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<(&'tree K, &'tree V)> {
        entry(self.tree, step(self.tree, self.current, Dir::Right))
    }

    /// Returns the previous entry.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the last element.
    /// If it is pointing to the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<(&'tree K, &'tree V)> {
        entry(self.tree, step(self.tree, self.current, Dir::Left))
    }
}

/// A cursor over an [`AvlTree`] which supports editing operations.
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that connects the
/// last element to the first.
pub struct CursorMut<'tree, K, V> {
    tree: &'tree mut AvlTree<K, V>,
    current: Link,
}

impl<'tree, K, V> CursorMut<'tree, K, V> {
    pub(crate) fn at(tree: &'tree mut AvlTree<K, V>, current: Link) -> CursorMut<'tree, K, V> {
        CursorMut { tree, current }
    }

    /// Returns a read-only cursor pointing to the current element.
    ///
    /// The `CursorMut` remains immutably borrowed for the lifetime of the returned `Cursor`.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::at(self.tree, self.current)
    }

    /// Moves the cursor to the next element of the `AvlTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method will move it to the first
    /// element. If it is pointing to the last element, this method will move it to the "ghost"
    /// non-element.
    pub fn move_next(&mut self) {
        self.current = step(self.tree, self.current, Dir::Right);
    }

    /// Moves the cursor to the previous element of the `AvlTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method will move it to the last
    /// element. If it is pointing to the first element, this method will move it to the "ghost"
    /// non-element.
    pub fn move_prev(&mut self) {
        self.current = step(self.tree, self.current, Dir::Left);
    }

    /// Returns the entry pointed to by the cursor.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element.
    pub fn get(&self) -> Option<(&K, &V)> {
        entry(self.tree, self.current)
    }

    /// Returns the key pointed to by the cursor.
    pub fn key(&self) -> Option<&K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the entry pointed to by the cursor, with a mutable reference to its value.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element. The key
    /// cannot be modified, as that could break the ordering of the tree.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        let node = &mut self.tree.nodes[self.current?];
        Some((&node.key, &mut node.value))
    }

    /// Returns the next entry.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the first element.
    /// If it is pointing to the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<(&K, &V)> {
        entry(self.tree, step(self.tree, self.current, Dir::Right))
    }

    /// Returns the previous entry.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the last element.
    /// If it is pointing to the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<(&K, &V)> {
        entry(self.tree, step(self.tree, self.current, Dir::Left))
    }

    /// Removes the current element from the tree.
    ///
    /// This returns the removed entry and moves the cursor to the next element. If the cursor is
    /// pointing to the "ghost" non-element, this method returns `None`, and neither the tree nor
    /// the cursor is modified.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        self.remove_current_and_move(Dir::Right)
    }

    /// Removes the current element from the tree.
    ///
    /// This returns the removed entry and moves the cursor to the previous element. If the cursor
    /// is pointing to the "ghost" non-element, this method returns `None`, and neither the tree nor
    /// the cursor is modified.
    pub fn remove_current_and_move_prev(&mut self) -> Option<(K, V)> {
        self.remove_current_and_move(Dir::Left)
    }

    fn remove_current_and_move(&mut self, dir: Dir) -> Option<(K, V)> {
        let remove = self.current?;

        // Removal may swap `remove` with a neighbor and rotate, but the neighbor's handle keeps
        // naming the same entry.
        self.current = self.tree.neighbor(remove, dir);

        Some(self.tree.remove_at(remove))
    }
}

// Returns the element after `current` in direction `dir`, wrapping through the ghost.
fn step<K, V>(tree: &AvlTree<K, V>, current: Link, dir: Dir) -> Link {
    match current {
        Some(node) => tree.neighbor(node, dir),
        None => tree.extreme_in_tree(!dir),
    }
}

fn entry<K, V>(tree: &AvlTree<K, V>, node: Link) -> Option<(&K, &V)> {
    let node = &tree.nodes[node?];
    Some((&node.key, &node.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[u32]) -> AvlTree<u32, u32> {
        keys.iter().map(|&k| (k, k)).collect()
    }

    #[test]
    fn cursor_wraps_through_ghost() {
        let tree = tree_of(&[1, 2, 3]);
        let mut curs = tree.cursor_first();

        assert_eq!(curs.key(), Some(&1));
        assert_eq!(curs.peek_prev(), None);

        curs.move_next();
        curs.move_next();
        assert_eq!(curs.key(), Some(&3));
        assert_eq!(curs.peek_next(), None);

        curs.move_next();
        assert_eq!(curs.get(), None);
        assert_eq!(curs.peek_next(), Some((&1, &1)));
        assert_eq!(curs.peek_prev(), Some((&3, &3)));

        curs.move_prev();
        assert_eq!(curs.key(), Some(&3));
    }

    #[test]
    fn cursor_on_empty_tree() {
        let mut tree: AvlTree<u32, u32> = AvlTree::new();

        let mut curs = tree.cursor_last();
        curs.move_next();
        assert_eq!(curs.get(), None);

        let mut curs = tree.cursor_first_mut();
        assert_eq!(curs.remove_current(), None);
        assert_eq!(curs.peek_next(), None);
    }

    #[test]
    fn cursor_at_missing_key_is_ghost() {
        let tree = tree_of(&[10, 20]);

        assert_eq!(tree.cursor_at(&20).key(), Some(&20));
        assert_eq!(tree.cursor_at(&15).get(), None);
    }

    #[test]
    fn remove_two_child_node_keeps_cursor_valid() {
        // 4 has two children, so removing it swaps it with 3.
        let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let mut curs = tree.cursor_at_mut(&4);

        assert_eq!(curs.remove_current(), Some((4, 4)));
        assert_eq!(curs.key(), Some(&5));

        assert_eq!(curs.remove_current_and_move_prev(), Some((5, 5)));
        assert_eq!(curs.key(), Some(&3));

        if let Some((_, value)) = curs.get_mut() {
            *value = 30;
        }

        assert_eq!(curs.as_cursor().peek_next(), Some((&6, &6)));

        tree.assert_invariants();
        assert_eq!(tree.get(&3), Some(&30));
        assert_eq!(tree.keys().copied().collect::<alloc::vec::Vec<_>>(), [1, 2, 3, 6, 7]);
    }

    #[test]
    fn drain_with_cursor() {
        let mut tree = tree_of(&[8, 3, 10, 1, 6, 14, 4, 7, 13]);
        let mut curs = tree.cursor_last_mut();
        let mut removed = alloc::vec::Vec::new();

        while let Some((key, _)) = curs.remove_current_and_move_prev() {
            removed.push(key);
        }

        assert_eq!(removed, [14, 13, 10, 8, 7, 6, 4, 3, 1]);
        assert!(tree.is_empty());
    }
}
