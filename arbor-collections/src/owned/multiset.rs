//! Multiset - an ordered collection that keeps equivalent elements.

use crate::tree::Iter;
use crate::{Natural, OwnedTree, SlabTreeStorage};

/// An ordered collection that keeps equivalent elements.
///
/// Equivalent elements are kept in insertion order.
#[derive(Clone, PartialEq, Eq)]
pub struct Multiset<T: PartialOrd> {
    tree: OwnedTree<T, Natural>,
}

impl<T: PartialOrd> Multiset<T> {
    /// Creates an empty multiset.
    #[inline]
    pub fn new() -> Self {
        Self {
            tree: OwnedTree::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multiset is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of elements the multiset can hold.
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

    /// Returns the element at `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&T> {
        self.tree.get(pos)
    }

    /// Inserts `value` after every equal element.
    #[inline]
    pub fn insert(&mut self, value: T) -> usize {
        self.tree.insert_duplicate(value)
    }

    /// Inserts every value.
    #[inline]
    pub fn insert_many<I>(&mut self, values: I) -> Vec<(usize, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.insert_many_duplicate(values)
    }

    /// Removes the element at `pos`.
    #[inline]
    pub fn erase(&mut self, pos: usize) -> Option<T> {
        self.tree.erase(pos)
    }

    /// Returns the first element equal to `value`, or the end position.
    #[inline]
    pub fn find(&self, value: &T) -> usize {
        self.tree.find(value)
    }

    /// Returns `true` if `value` occurs at least once.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Counts the occurrences of `value`. O(n).
    #[inline]
    pub fn count(&self, value: &T) -> usize {
        self.tree.count(value)
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

    /// Returns the `[first, last)` positions of elements equal to `value`.
    #[inline]
    pub fn equal_range(&self, value: &T) -> (usize, usize) {
        self.tree.equal_range(value)
    }

    /// Returns an iterator over the elements equal to `value`.
    pub fn occurrences(&self, value: &T) -> Iter<'_, T, SlabTreeStorage<T>, usize> {
        let (from, to) = self.tree.equal_range(value);
        self.tree.range(from, to)
    }

    /// Moves every element of `other` here, leaving it empty.
    ///
    /// O(1) into an empty multiset; otherwise each element is moved under a
    /// new position.
    #[inline]
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge_duplicates(&mut other.tree);
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

impl<T: PartialOrd> Default for Multiset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrd + core::fmt::Debug> core::fmt::Debug for Multiset<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialOrd> FromIterator<T> for Multiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.insert_many(iter);
        out
    }
}

impl<T: PartialOrd> Extend<T> for Multiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_many(iter);
    }
}

impl<'a, T: PartialOrd> IntoIterator for &'a Multiset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, SlabTreeStorage<T>, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
