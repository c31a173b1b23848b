extern crate alloc;

use alloc::boxed::Box;
use core::{borrow::Borrow, fmt, iter, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;

use crate::{AvlTree, Links, NodeRef, TreeNode};

/// An ordered map based on an [AVL tree].
///
/// Unlike [`BTreeMap`](std::collections::BTreeMap), keys need not be unique: inserting an
/// existing key adds another entry after the ones already present.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<K: Ord + fmt::Debug, V> {
    tree: AvlTree<MapNode<K, V>>,
}

struct MapNode<K, V> {
    links: Links<MapNode<K, V>>,
    key: K,
    value: V,
    _unpin: PhantomPinned,
}

unsafe impl<K, V> Linked<Links<MapNode<K, V>>> for MapNode<K, V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<MapNode<K, V>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<K: Ord + fmt::Debug, V> TreeNode<Links<MapNode<K, V>>> for MapNode<K, V> {
    type Key = K;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

impl<K: Ord + fmt::Debug, V> AvlMap<K, V> {
    /// Creates a new, empty `AvlMap`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries in the map, counting duplicate keys separately.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Inserts a key-value pair.
    ///
    /// Entries with equal keys are kept in insertion order.
    pub fn insert(&mut self, key: K, value: V) {
        self.tree.insert(Box::new(MapNode {
            links: Links::new(),
            key,
            value,
            _unpin: PhantomPinned,
        }));
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Returns a reference to a value associated with `key`.
    ///
    /// If the key was inserted more than once, any one of its values may be returned; use
    /// [`get_all`](Self::get_all) to see all of them.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key).map(|node| &node.get_ref().value)
    }

    /// Returns a mutable reference to a value associated with `key`.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .get_mut(key)
            // SAFETY: Pinning is not structural for `node.value`.
            .map(|node| unsafe { &mut node.get_unchecked_mut().value })
    }

    /// Returns every value associated with `key`, in insertion order.
    pub fn get_all<'a, Q>(&'a self, key: &'a Q) -> impl Iterator<Item = &'a V> + 'a
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let matches =
            move |node: &NodeRef<'a, MapNode<K, V>>| <K as Borrow<Q>>::borrow(node.key()) == key;

        // Any match may be found first; rewind to the earliest one.
        let mut first = self.tree.search(key);
        while let Some(prev) = first.and_then(|node| node.prev()).filter(matches) {
            first = Some(prev);
        }

        iter::successors(first, move |node| node.next().filter(matches))
            .map(|node| &node.get().get_ref().value)
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.min().map(|node| {
            let node = node.get().get_ref();
            (&node.key, &node.value)
        })
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.max().map(|node| {
            let node = node.get().get_ref();
            (&node.key, &node.value)
        })
    }

    /// Returns an iterator over the entries of the map, in key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.tree.iter().map(|node| (&node.key, &node.value))
    }

    /// Clears the map, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K: Ord + fmt::Debug, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord + fmt::Debug, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + fmt::Debug, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::prelude::v1::*;

    use super::*;

    #[test]
    fn empty_map() {
        let map: AvlMap<u32, &str> = AvlMap::new();

        assert!(map.is_empty());
        assert_eq!(map.get(&1), None);
        assert_eq!(map.first_key_value(), None);
        assert_eq!(map.last_key_value(), None);
        assert_eq!(map.height(), 0);
    }

    #[test]
    fn insert_get() {
        let mut map = AvlMap::new();
        for key in [5, 3, 8, 1, 4] {
            map.insert(key, key * 10);
        }

        assert_eq!(map.len(), 5);
        assert_eq!(map.get(&4), Some(&40));
        assert_eq!(map.get(&6), None);
        assert!(map.contains_key(&8));
        assert_eq!(map.first_key_value(), Some((&1, &10)));
        assert_eq!(map.last_key_value(), Some((&8, &80)));
        map.tree.assert_invariants();
    }

    #[test]
    fn get_mut_updates_value() {
        let mut map: AvlMap<String, u32> = AvlMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);

        *map.get_mut("b").unwrap() += 40;

        assert_eq!(map.get("b"), Some(&42));
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let mut map = AvlMap::new();
        for (i, key) in [2, 1, 2, 3, 2, 2, 0, 2].into_iter().enumerate() {
            map.insert(key, i);
            map.tree.assert_invariants();
        }

        assert_eq!(map.len(), 8);
        assert_eq!(map.get_all(&2).copied().collect::<Vec<_>>(), vec![0, 2, 4, 5, 7]);
        assert_eq!(map.get_all(&4).count(), 0);

        let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![0, 1, 2, 2, 2, 2, 2, 3]);
    }

    #[test]
    fn iter_both_ends() {
        let map: AvlMap<_, _> = (0..10).map(|k| (k, ())).collect();

        let forward: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        let backward: Vec<_> = map.iter().rev().map(|(k, _)| *k).collect();

        assert_eq!(forward, (0..10).collect::<Vec<_>>());
        assert_eq!(backward, (0..10).rev().collect::<Vec<_>>());
        assert_eq!(map.iter().len(), 10);
    }

    #[test]
    fn clear_then_reuse() {
        let mut map: AvlMap<_, _> = (0..100).map(|k| (k, k)).collect();
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);

        map.insert(7, 7);
        assert_eq!(map.get(&7), Some(&7));
    }
}
