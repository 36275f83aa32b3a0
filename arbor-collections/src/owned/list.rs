//! OwnedList - a doubly-linked list that owns its storage.

use crate::list::{Iter, IterMut, Keys};
use crate::{List, Result, SlabListStorage};

/// A doubly-linked list that owns its storage.
///
/// A convenience wrapper around [`List`] + [`SlabListStorage`] for cases
/// where you don't need to share storage across several lists.
///
/// # Example
///
/// ```
/// use arbor_collections::OwnedList;
///
/// let mut list: OwnedList<f64> = OwnedList::new();
/// list.insert_many_back([1.78, 0.99, -1.53, -1.53, 4.88, 4.88]);
/// list.unique();
///
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1.78, 0.99, -1.53, 4.88]);
///
/// let copy = list.clone();
/// list.clear();
/// assert_eq!(copy.len(), 4);
/// ```
pub struct OwnedList<T> {
    storage: SlabListStorage<T>,
    list: List<T, SlabListStorage<T>>,
}

impl<T> OwnedList<T> {
    /// Creates an empty list.
    #[inline]
    pub fn new() -> Self {
        Self {
            storage: slab::Slab::new(),
            list: List::new(),
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: slab::Slab::with_capacity(capacity),
            list: List::new(),
        }
    }

    /// Creates a list of `len` default values.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut out = Self::with_capacity(len);
        out.insert_many_back((0..len).map(|_| T::default()));
        out
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the largest number of elements the list can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.list.max_size()
    }

    /// Returns the first position, or the end position if empty.
    #[inline]
    pub fn begin(&self) -> usize {
        self.list.begin()
    }

    /// Returns the end position.
    #[inline]
    pub fn end(&self) -> usize {
        self.list.end()
    }

    /// Returns the position after `key`, wrapping through the end position.
    #[inline]
    pub fn next_key(&self, key: usize) -> usize {
        self.list.next_key(&self.storage, key)
    }

    /// Returns the position before `key`, wrapping through the end position.
    #[inline]
    pub fn prev_key(&self, key: usize) -> usize {
        self.list.prev_key(&self.storage, key)
    }

    /// Returns the element at `key`.
    #[inline]
    pub fn get(&self, key: usize) -> Option<&T> {
        self.list.get(&self.storage, key)
    }

    /// Returns the element at `key` mutably.
    #[inline]
    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.list.get_mut(&mut self.storage, key)
    }

    /// Returns the first element, or a logic error if empty.
    #[inline]
    pub fn front(&self) -> Result<&T> {
        self.list.front(&self.storage)
    }

    /// Returns the last element, or a logic error if empty.
    #[inline]
    pub fn back(&self) -> Result<&T> {
        self.list.back(&self.storage)
    }

    /// Returns the first element mutably, or a logic error if empty.
    #[inline]
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.list.front_mut(&mut self.storage)
    }

    /// Returns the last element mutably, or a logic error if empty.
    #[inline]
    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.list.back_mut(&mut self.storage)
    }

    /// Inserts `value` before `pos` and returns its key.
    #[inline]
    pub fn insert(&mut self, pos: usize, value: T) -> usize {
        self.list.insert(&mut self.storage, pos, value)
    }

    /// Removes the element at `pos`; the end position is a no-op.
    #[inline]
    pub fn erase(&mut self, pos: usize) -> Option<T> {
        self.list.erase(&mut self.storage, pos)
    }

    /// Pushes a value to the back.
    #[inline]
    pub fn push_back(&mut self, value: T) -> usize {
        self.list.push_back(&mut self.storage, value)
    }

    /// Pushes a value to the front.
    #[inline]
    pub fn push_front(&mut self, value: T) -> usize {
        self.list.push_front(&mut self.storage, value)
    }

    /// Removes the back element, or returns a logic error if empty.
    #[inline]
    pub fn pop_back(&mut self) -> Result<T> {
        self.list.pop_back(&mut self.storage)
    }

    /// Removes the front element, or returns a logic error if empty.
    #[inline]
    pub fn pop_front(&mut self) -> Result<T> {
        self.list.pop_front(&mut self.storage)
    }

    /// Inserts every value before `pos`, preserving order. Returns `pos`.
    #[inline]
    pub fn insert_many<I>(&mut self, pos: usize, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.list.insert_many(&mut self.storage, pos, values)
    }

    /// Appends every value, preserving order.
    #[inline]
    pub fn insert_many_back<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.list.insert_many_back(&mut self.storage, values);
    }

    /// Prepends every value, preserving order.
    #[inline]
    pub fn insert_many_front<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.list.insert_many_front(&mut self.storage, values);
    }

    /// Removes all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.list.clear(&mut self.storage);
    }

    /// Swaps contents with `other` in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Moves every element of `other` before `pos`, leaving `other` empty.
    ///
    /// O(1) when this list is empty (the storages are swapped), otherwise
    /// O(len of `other`) and the moved elements get new keys.
    pub fn splice(&mut self, pos: usize, other: &mut Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.swap(other);
            return;
        }
        log::trace!("splice moving {} values between storages", other.len());
        self.storage.reserve(other.len());
        for value in other.list.drain(&mut other.storage) {
            self.list.insert(&mut self.storage, pos, value);
        }
    }

    /// Merges sorted `other` into this sorted list, leaving `other` empty.
    #[inline]
    pub fn merge(&mut self, other: &mut Self)
    where
        T: PartialOrd,
    {
        self.merge_by(other, |a, b| a < b);
    }

    /// Merges sorted `other` into this list using `less` as the ordering.
    ///
    /// An element of `other` goes before the first element of this list it
    /// is less than, so equal elements of this list stay first.
    ///
    /// O(1) when this list is empty (the storages are swapped), otherwise
    /// O(len of both) and the moved elements get new keys.
    pub fn merge_by<F>(&mut self, other: &mut Self, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.swap(other);
            return;
        }
        log::trace!("merge moving {} values between storages", other.len());
        self.storage.reserve(other.len());
        let mut cur = self.list.begin();
        for value in other.list.drain(&mut other.storage) {
            while self
                .list
                .get(&self.storage, cur)
                .is_some_and(|here| !less(&value, here))
            {
                cur = self.list.next_key(&self.storage, cur);
            }
            self.list.insert(&mut self.storage, cur, value);
        }
    }

    /// Sorts ascending (quicksort, not stable).
    #[inline]
    pub fn sort(&mut self)
    where
        T: PartialOrd,
    {
        self.list.sort(&mut self.storage);
    }

    /// Sorts with `less` as the ordering.
    #[inline]
    pub fn sort_by<F>(&mut self, less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.list.sort_by(&mut self.storage, less);
    }

    /// Removes consecutive duplicates.
    #[inline]
    pub fn unique(&mut self)
    where
        T: PartialEq,
    {
        self.list.unique(&mut self.storage);
    }

    /// Removes elements `same(kept, element)` flags as duplicates.
    #[inline]
    pub fn unique_by<F>(&mut self, same: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.list.unique_by(&mut self.storage, same);
    }

    /// Reverses the list in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.list.reverse(&mut self.storage);
    }

    /// Returns an iterator over element references.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, SlabListStorage<T>, usize> {
        self.list.iter(&self.storage)
    }

    /// Returns an iterator over mutable element references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, SlabListStorage<T>, usize> {
        self.list.iter_mut(&mut self.storage)
    }

    /// Returns an iterator over node keys.
    #[inline]
    pub fn keys(&self) -> Keys<'_, T, SlabListStorage<T>, usize> {
        self.list.keys(&self.storage)
    }

    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        self.list.validate_invariants(&self.storage);
        assert_eq!(self.storage.len(), self.list.len(), "leaked nodes");
    }
}

impl<T> Default for OwnedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for OwnedList<T> {
    /// Copies the storage slot for slot: the copy has the same keys.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            list: self.list.clone_header(),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for OwnedList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for OwnedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for OwnedList<T> {}

impl<T> FromIterator<T> for OwnedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.insert_many_back(iter);
        list
    }
}

impl<T> Extend<T> for OwnedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_many_back(iter);
    }
}

impl<'a, T> IntoIterator for &'a OwnedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, SlabListStorage<T>, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Index};

    fn values<T: Clone + 'static>(list: &OwnedList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn with_len_fills_defaults() {
        let list: OwnedList<i32> = OwnedList::with_len(3);
        assert_eq!(values(&list), [0, 0, 0]);
        list.validate_invariants();
    }

    #[test]
    fn clone_is_deep() {
        let mut list: OwnedList<f64> = [1.78, 0.99, -1.53].into_iter().collect();
        let copy = list.clone();

        *list.front_mut().unwrap() = 0.0;
        list.push_back(9.0);

        assert_eq!(values(&copy), [1.78, 0.99, -1.53]);
        assert_eq!(copy.keys().collect::<Vec<_>>().len(), 3);
        copy.validate_invariants();
    }

    #[test]
    fn clone_keeps_keys() {
        let mut list = OwnedList::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        list.erase(a);
        let copy = list.clone();

        assert_eq!(copy.get(b), Some(&2));
        assert_eq!(copy.get(a), None);
    }

    #[test]
    fn splice_moves_values_into_middle() {
        let mut a: OwnedList<i32> = [1, 2, 3].into_iter().collect();
        let mut b: OwnedList<i32> = [4, 5].into_iter().collect();

        let pos = a.next_key(a.begin());
        a.splice(pos, &mut b);

        assert_eq!(values(&a), [1, 4, 5, 2, 3]);
        assert!(b.is_empty());
        a.validate_invariants();
        b.validate_invariants();
    }

    #[test]
    fn splice_rekeys_moved_values_only() {
        let mut a: OwnedList<i32> = OwnedList::new();
        let one = a.push_back(1);
        let two = a.push_back(2);
        let mut b: OwnedList<i32> = OwnedList::new();
        let four = b.push_back(4);
        b.push_back(5);

        a.splice(two, &mut b);

        assert_eq!(values(&a), [1, 4, 5, 2]);
        assert_eq!(a.get(one), Some(&1));
        assert_eq!(a.get(two), Some(&2));
        assert_eq!(b.get(four), None);
        let moved = a.next_key(one);
        assert_eq!(a.get(moved), Some(&4));
        a.validate_invariants();
    }

    #[test]
    fn splice_into_empty_keeps_keys() {
        let mut a: OwnedList<i32> = OwnedList::new();
        let mut b: OwnedList<i32> = OwnedList::new();
        let four = b.push_back(4);
        b.push_back(5);

        a.splice(a.end(), &mut b);

        assert_eq!(a.get(four), Some(&4));
        assert_eq!(values(&a), [4, 5]);
        assert!(b.is_empty());
    }

    #[test]
    fn merge_interleaves() {
        let mut a: OwnedList<i32> = [1, 4, 6].into_iter().collect();
        let mut b: OwnedList<i32> = [0, 4, 5, 9].into_iter().collect();

        a.merge(&mut b);

        assert_eq!(values(&a), [0, 1, 4, 4, 5, 6, 9]);
        assert!(b.is_empty());
        a.validate_invariants();
    }

    #[test]
    fn merge_keeps_own_equal_elements_first() {
        let mut a: OwnedList<(i32, char)> = [(1, 'a'), (2, 'a')].into_iter().collect();
        let mut b: OwnedList<(i32, char)> = [(1, 'b'), (2, 'b')].into_iter().collect();

        a.merge_by(&mut b, |x, y| x.0 < y.0);

        assert_eq!(values(&a), [(1, 'a'), (1, 'b'), (2, 'a'), (2, 'b')]);
    }

    #[test]
    fn sort_unique_reverse() {
        let mut list: OwnedList<i32> = [3, 1, 2, 3, 1].into_iter().collect();

        list.sort();
        assert_eq!(values(&list), [1, 1, 2, 3, 3]);
        list.unique();
        assert_eq!(values(&list), [1, 2, 3]);
        list.reverse();
        assert_eq!(values(&list), [3, 2, 1]);
        list.validate_invariants();
    }

    #[test]
    fn empty_errors() {
        let mut list: OwnedList<i32> = OwnedList::new();
        assert_eq!(list.front(), Err(Error::Empty { op: "front" }));
        assert_eq!(list.back(), Err(Error::Empty { op: "back" }));
        assert_eq!(list.pop_back(), Err(Error::Empty { op: "pop_back" }));
        assert_eq!(list.pop_front(), Err(Error::Empty { op: "pop_front" }));
        assert_eq!(list.erase(list.end()), None);
    }

    #[test]
    fn equality_and_debug() {
        let a: OwnedList<i32> = [1, 2].into_iter().collect();
        let mut b: OwnedList<i32> = OwnedList::new();
        b.push_front(2);
        b.push_front(1);

        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "[1, 2]");
    }

    #[test]
    fn iter_mut_and_extend() {
        let mut list: OwnedList<i32> = OwnedList::with_capacity(8);
        list.extend([1, 2, 3]);
        for v in list.iter_mut() {
            *v += 1;
        }
        let total: i32 = (&list).into_iter().sum();
        assert_eq!(total, 9);
        assert!(list.max_size() > 0);
    }

    #[test]
    fn swap_contents() {
        let mut a: OwnedList<i32> = [1].into_iter().collect();
        let mut b: OwnedList<i32> = [2, 3].into_iter().collect();
        a.swap(&mut b);
        assert_eq!(values(&a), [2, 3]);
        assert_eq!(values(&b), [1]);
        assert_eq!(a.prev_key(a.end()), a.keys().next_back().unwrap());
        assert!(a.end().is_none());
    }
}
