//! Map - an ordered map with unique keys.

use crate::tree::Iter;
use crate::{ByFirst, Error, OwnedTree, Result, SlabTreeStorage};

/// An ordered map with unique keys, stored as `(K, V)` pairs in a
/// red-black tree ordered by the key alone.
///
/// # Example
///
/// ```
/// use arbor_collections::{ErrorKind, Map};
///
/// let mut map = Map::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
///
/// assert_eq!(map.at(&1), Ok(&"one"));
/// assert_eq!(map.at(&3).unwrap_err().kind(), ErrorKind::OutOfBounds);
/// assert_eq!(map.iter().map(|(k, _)| *k).collect::<Vec<_>>(), [1, 2]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Map<K: PartialOrd, V> {
    tree: OwnedTree<(K, V), ByFirst>,
}

impl<K: PartialOrd, V> Map<K, V> {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        Self {
            tree: OwnedTree::new(),
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: OwnedTree::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of entries the map can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Returns the position of the smallest key.
    #[inline]
    pub fn begin(&self) -> usize {
        self.tree.begin()
    }

    /// Returns the end position.
    #[inline]
    pub fn end(&self) -> usize {
        self.tree.end()
    }

    /// Returns the position after `pos`, wrapping through the end.
    #[inline]
    pub fn next(&self, pos: usize) -> usize {
        self.tree.successor(pos)
    }

    /// Returns the entry at `pos`.
    #[inline]
    pub fn entry_at(&self, pos: usize) -> Option<(&K, &V)> {
        self.tree.get(pos).map(|(k, v)| (k, v))
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let pos = self.tree.find(key);
        self.tree.get(pos).map(|(_, v)| v)
    }

    /// Returns the value for `key` mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.tree.find(key);
        self.tree.get_mut(pos).map(|(_, v)| v)
    }

    /// Returns the value for `key`, or [`Error::KeyNotFound`].
    #[inline]
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key` mutably, or [`Error::KeyNotFound`].
    #[inline]
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let mut pos = self.tree.find(&key);
        if pos == self.tree.end() {
            pos = self.tree.insert((key, V::default())).0;
        }
        &mut self
            .tree
            .get_mut(pos)
            .expect("map position was just located")
            .1
    }

    /// Inserts `value` under `key` unless the key is present.
    ///
    /// Returns the entry's position and whether it was inserted. An existing
    /// value is left untouched.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> (usize, bool) {
        self.tree.insert((key, value))
    }

    /// Inserts `value` under `key`, overwriting an existing value.
    ///
    /// Returns the entry's position and whether the key was new.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (usize, bool) {
        let pos = self.tree.find(&key);
        match self.tree.get_mut(pos) {
            Some(entry) => {
                entry.1 = value;
                (pos, false)
            }
            None => self.tree.insert((key, value)),
        }
    }

    /// Inserts every pair; pairs whose key is present are dropped.
    #[inline]
    pub fn insert_many<I>(&mut self, pairs: I) -> Vec<(usize, bool)>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.tree.insert_many(pairs)
    }

    /// Removes the entry at `pos`.
    #[inline]
    pub fn erase(&mut self, pos: usize) -> Option<(K, V)> {
        self.tree.erase(pos)
    }

    /// Removes the entry for `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.tree.find(key);
        self.tree.erase(pos).map(|(_, v)| v)
    }

    /// Returns the position of `key`, or the end position.
    #[inline]
    pub fn find(&self, key: &K) -> usize {
        self.tree.find(key)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Returns the first entry whose key is not less than `key`.
    #[inline]
    pub fn lower_bound(&self, key: &K) -> usize {
        self.tree.lower_bound(key)
    }

    /// Returns the first entry whose key is greater than `key`.
    #[inline]
    pub fn upper_bound(&self, key: &K) -> usize {
        self.tree.upper_bound(key)
    }

    /// Moves the entries of `other` whose key is absent here. Entries with a
    /// present key stay in `other`.
    ///
    /// Moved entries get new positions. O(m log n) for `m` entries of `other`.
    #[inline]
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree);
    }

    /// Removes all entries.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Swaps contents with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns an iterator over entries in key order.
    #[inline]
    pub fn iter(&self) -> MapIter<'_, K, V> {
        MapIter {
            inner: self.tree.iter(),
        }
    }

    /// Returns an iterator over keys in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: PartialOrd, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialOrd + core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialOrd, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tree: iter.into_iter().collect(),
        }
    }
}

impl<K: PartialOrd, V> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.tree.extend(iter);
    }
}

impl<'a, K: PartialOrd, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = MapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`Map`] in key order.
pub struct MapIter<'a, K, V> {
    inner: Iter<'a, (K, V), SlabTreeStorage<(K, V)>, usize>,
}

impl<'a, K, V> Iterator for MapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

impl<K, V> DoubleEndedIterator for MapIter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}
