//! Set - an ordered set of unique elements.

use crate::tree::Iter;
use crate::{Natural, OwnedTree, SlabTreeStorage};

/// An ordered set of unique elements.
///
/// Positions are `usize` node keys; [`end`](Self::end) is the past-the-end
/// position returned by failed lookups.
#[derive(Clone, PartialEq, Eq)]
pub struct Set<T: PartialOrd> {
    tree: OwnedTree<T, Natural>,
}

impl<T: PartialOrd> Set<T> {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self {
            tree: OwnedTree::new(),
        }
    }

    /// Creates an empty set with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: OwnedTree::with_capacity(capacity),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of elements the set can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Returns the smallest element's position.
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

    /// Returns the position before `pos`, wrapping through the end.
    #[inline]
    pub fn prev(&self, pos: usize) -> usize {
        self.tree.predecessor(pos)
    }

    /// Returns the element at `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&T> {
        self.tree.get(pos)
    }

    /// Inserts `value`. Returns its position and whether it was new.
    #[inline]
    pub fn insert(&mut self, value: T) -> (usize, bool) {
        self.tree.insert(value)
    }

    /// Inserts every value; duplicates are dropped.
    #[inline]
    pub fn insert_many<I>(&mut self, values: I) -> Vec<(usize, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.insert_many(values)
    }

    /// Removes the element at `pos`.
    #[inline]
    pub fn erase(&mut self, pos: usize) -> Option<T> {
        self.tree.erase(pos)
    }

    /// Removes the element equal to `value`.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let pos = self.tree.find(value);
        self.tree.erase(pos)
    }

    /// Returns the position of `value`, or the end position.
    #[inline]
    pub fn find(&self, value: &T) -> usize {
        self.tree.find(value)
    }

    /// Returns `true` if `value` is in the set.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Returns the first element not less than `value`.
    #[inline]
    pub fn lower_bound(&self, value: &T) -> usize {
        self.tree.lower_bound(value)
    }

    /// Returns the first element greater than `value`.
    #[inline]
    pub fn upper_bound(&self, value: &T) -> usize {
        self.tree.upper_bound(value)
    }

    /// Moves the elements of `other` missing here; the rest stay in `other`.
    ///
    /// Moved elements get new positions. O(m log n) for `m` elements of
    /// `other`.
    #[inline]
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree);
    }

    /// Removes all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Swaps contents with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns an iterator over elements in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, SlabTreeStorage<T>, usize> {
        self.tree.iter()
    }
}

impl<T: PartialOrd> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrd + core::fmt::Debug> core::fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.tree, f)
    }
}

impl<T: PartialOrd> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tree: iter.into_iter().collect(),
        }
    }
}

impl<T: PartialOrd> Extend<T> for Set<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend(iter);
    }
}

impl<'a, T: PartialOrd> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, SlabTreeStorage<T>, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
