//! Doubly-linked list over external node storage.
//!
//! The list header plays the role of a sentinel node: `head` is the
//! sentinel's `next`, `tail` its `prev`, and a link equal to `K::NONE` points
//! back at the sentinel. `NONE` is therefore also the end position: inserting
//! before it appends, and stepping past either end lands on it.
//!
//! # Storage Invariant
//!
//! A list instance must always be used with the same storage instance.
//! Passing a different storage is a logic error that panics or corrupts the
//! list. This is the caller's responsibility (same discipline as the `slab`
//! crate).
//!
//! # Example
//!
//! ```
//! use arbor_collections::{List, SlabListStorage};
//!
//! let mut storage: SlabListStorage<i32> = slab::Slab::with_capacity(16);
//! let mut list: List<i32, SlabListStorage<i32>> = List::new();
//!
//! list.push_back(&mut storage, 1);
//! let three = list.push_back(&mut storage, 3);
//! list.insert(&mut storage, three, 2);
//!
//! assert_eq!(list.iter(&storage).copied().collect::<Vec<_>>(), [1, 2, 3]);
//! assert_eq!(list.pop_front(&mut storage), Ok(1));
//! ```
//!
//! # Moving Between Lists
//!
//! Lists sharing one storage exchange nodes by relinking; keys stay valid.
//!
//! ```
//! use arbor_collections::{List, SlabListStorage};
//!
//! let mut storage: SlabListStorage<i32> = slab::Slab::new();
//! let mut a: List<i32, SlabListStorage<i32>> = List::new();
//! let mut b: List<i32, SlabListStorage<i32>> = List::new();
//!
//! a.insert_many_back(&mut storage, [1, 2, 3]);
//! let four = b.push_back(&mut storage, 4);
//! b.push_back(&mut storage, 5);
//!
//! let pos = a.next_key(&storage, a.begin());
//! a.splice(&mut storage, pos, &mut b);
//!
//! assert!(b.is_empty());
//! assert_eq!(a.iter(&storage).copied().collect::<Vec<_>>(), [1, 4, 5, 2, 3]);
//! assert_eq!(a.get(&storage, four), Some(&4));
//! ```

use core::marker::PhantomData;

use crate::{Error, Index, Result, Storage};

/// List storage backed by `slab::Slab`.
pub type SlabListStorage<T> = slab::Slab<ListNode<T, usize>>;

/// A node in the linked list.
///
/// Wraps user data with prev/next links. Users interact with `&T` and
/// `&mut T` through the list's accessors.
#[derive(Debug, Clone)]
pub struct ListNode<T, K: Index = usize> {
    pub(crate) value: T,
    pub(crate) prev: K,
    pub(crate) next: K,
}

impl<T, K: Index> ListNode<T, K> {
    /// Creates a new unlinked node.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value,
            prev: K::NONE,
            next: K::NONE,
        }
    }

    /// Returns the stored value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A doubly-linked list over external storage.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Storage type (e.g. [`SlabListStorage<T>`])
/// - `K`: Link type (default `usize`)
#[derive(Debug)]
pub struct List<T, S, K: Index = usize>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    head: K,
    tail: K,
    len: usize,
    _marker: PhantomData<fn() -> (T, S)>,
}

impl<T, S, K: Index> Default for List<T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Positions and element access
// =============================================================================

impl<T, S, K: Index> List<T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Creates a list of `len` default values.
    pub fn with_len(storage: &mut S, len: usize) -> Self
    where
        T: Default,
    {
        let mut list = Self::new();
        list.insert_many_back(storage, (0..len).map(|_| T::default()));
        list
    }

    #[inline]
    fn node(storage: &S, key: K) -> &ListNode<T, K> {
        storage.get(key).expect("list link points at a vacant slot")
    }

    #[inline]
    fn node_mut(storage: &mut S, key: K) -> &mut ListNode<T, K> {
        storage
            .get_mut(key)
            .expect("list link points at a vacant slot")
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the largest number of elements a list with this link type
    /// can address.
    #[inline]
    pub fn max_size(&self) -> usize {
        let per_node = core::mem::size_of::<ListNode<T, K>>().max(1);
        K::NONE.as_usize().min(isize::MAX as usize / per_node)
    }

    /// Returns the first position, or the end position if empty.
    #[inline]
    pub fn begin(&self) -> K {
        self.head
    }

    /// Returns the end position (`K::NONE`).
    #[inline]
    pub fn end(&self) -> K {
        K::NONE
    }

    /// Returns the head node's key, or `None` if empty.
    #[inline]
    pub fn front_key(&self) -> Option<K> {
        if self.head.is_none() {
            None
        } else {
            Some(self.head)
        }
    }

    /// Returns the tail node's key, or `None` if empty.
    #[inline]
    pub fn back_key(&self) -> Option<K> {
        if self.tail.is_none() {
            None
        } else {
            Some(self.tail)
        }
    }

    /// Returns the position after `key`.
    ///
    /// The last element steps to the end position, and the end position
    /// wraps to the first element.
    #[inline]
    pub fn next_key(&self, storage: &S, key: K) -> K {
        if key.is_none() {
            self.head
        } else {
            Self::node(storage, key).next
        }
    }

    /// Returns the position before `key`.
    ///
    /// The first element steps to the end position, and the end position
    /// wraps to the last element.
    #[inline]
    pub fn prev_key(&self, storage: &S, key: K) -> K {
        if key.is_none() {
            self.tail
        } else {
            Self::node(storage, key).prev
        }
    }

    /// Returns a reference to the element at `key`.
    #[inline]
    pub fn get<'a>(&self, storage: &'a S, key: K) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
    {
        storage.get(key).map(|node| &node.value)
    }

    /// Returns a mutable reference to the element at `key`.
    #[inline]
    pub fn get_mut<'a>(&mut self, storage: &'a mut S, key: K) -> Option<&'a mut T>
    where
        T: 'a,
        K: 'a,
    {
        storage.get_mut(key).map(|node| &mut node.value)
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn front<'a>(&self, storage: &'a S) -> Result<&'a T>
    where
        T: 'a,
        K: 'a,
    {
        self.get(storage, self.head)
            .ok_or(Error::Empty { op: "front" })
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn back<'a>(&self, storage: &'a S) -> Result<&'a T>
    where
        T: 'a,
        K: 'a,
    {
        self.get(storage, self.tail).ok_or(Error::Empty { op: "back" })
    }

    /// Returns the first element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn front_mut<'a>(&mut self, storage: &'a mut S) -> Result<&'a mut T>
    where
        T: 'a,
        K: 'a,
    {
        let head = self.head;
        self.get_mut(storage, head)
            .ok_or(Error::Empty { op: "front_mut" })
    }

    /// Returns the last element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn back_mut<'a>(&mut self, storage: &'a mut S) -> Result<&'a mut T>
    where
        T: 'a,
        K: 'a,
    {
        let tail = self.tail;
        self.get_mut(storage, tail)
            .ok_or(Error::Empty { op: "back_mut" })
    }

    // ========================================================================
    // Link operations (just relink, no alloc/dealloc)
    // ========================================================================

    /// Links an existing node before `pos` (`K::NONE` links at the back).
    ///
    /// The node must already exist in storage but not be in any list.
    /// Use this with [`unlink`](Self::unlink) to move nodes between lists.
    ///
    /// # Panics
    ///
    /// Panics if `key` or `pos` is not valid in storage.
    pub fn link_before(&mut self, storage: &mut S, pos: K, key: K) {
        let prev = if pos.is_none() {
            self.tail
        } else {
            Self::node(storage, pos).prev
        };

        let node = storage.get_mut(key).expect("invalid key");
        node.prev = prev;
        node.next = pos;

        if prev.is_some() {
            Self::node_mut(storage, prev).next = key;
        } else {
            self.head = key;
        }
        if pos.is_some() {
            Self::node_mut(storage, pos).prev = key;
        } else {
            self.tail = key;
        }

        self.len += 1;
    }

    /// Unlinks a node from the list without removing it from storage.
    ///
    /// Returns `false` if `key` is vacant. The node must belong to this list.
    pub fn unlink(&mut self, storage: &mut S, key: K) -> bool {
        let Some(node) = storage.get_mut(key) else {
            return false;
        };
        let prev = node.prev;
        let next = node.next;
        node.prev = K::NONE;
        node.next = K::NONE;

        if prev.is_some() {
            Self::node_mut(storage, prev).next = next;
        } else {
            self.head = next;
        }
        if next.is_some() {
            Self::node_mut(storage, next).prev = prev;
        } else {
            self.tail = prev;
        }

        self.len -= 1;
        true
    }

    // ========================================================================
    // Insert / erase
    // ========================================================================

    /// Inserts `value` before `pos` and returns its key.
    ///
    /// `pos == end()` appends.
    #[inline]
    pub fn insert(&mut self, storage: &mut S, pos: K, value: T) -> K {
        let key = storage.insert(ListNode::new(value));
        self.link_before(storage, pos, key);
        key
    }

    /// Pushes a value to the back of the list.
    #[inline]
    pub fn push_back(&mut self, storage: &mut S, value: T) -> K {
        self.insert(storage, K::NONE, value)
    }

    /// Pushes a value to the front of the list.
    #[inline]
    pub fn push_front(&mut self, storage: &mut S, value: T) -> K {
        let head = self.head;
        self.insert(storage, head, value)
    }

    /// Removes the element at `pos`.
    ///
    /// Erasing the end position (or a vacant key) does nothing and returns
    /// `None`.
    pub fn erase(&mut self, storage: &mut S, pos: K) -> Option<T> {
        if pos.is_none() || !self.unlink(storage, pos) {
            return None;
        }
        storage.remove(pos).map(|node| node.value)
    }

    /// Removes and returns the front element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn pop_front(&mut self, storage: &mut S) -> Result<T> {
        let head = self.head;
        self.erase(storage, head)
            .ok_or(Error::Empty { op: "pop_front" })
    }

    /// Removes and returns the back element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the list is empty.
    #[inline]
    pub fn pop_back(&mut self, storage: &mut S) -> Result<T> {
        let tail = self.tail;
        self.erase(storage, tail)
            .ok_or(Error::Empty { op: "pop_back" })
    }

    /// Inserts every value before `pos`, preserving their order.
    ///
    /// Returns `pos`.
    pub fn insert_many<I>(&mut self, storage: &mut S, pos: K, values: I) -> K
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.insert(storage, pos, value);
        }
        pos
    }

    /// Appends every value, preserving their order.
    #[inline]
    pub fn insert_many_back<I>(&mut self, storage: &mut S, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_many(storage, K::NONE, values);
    }

    /// Prepends every value, preserving their order.
    ///
    /// `[1, 2, 3]` inserted at the front of `[6, 7]` gives
    /// `[1, 2, 3, 6, 7]`.
    #[inline]
    pub fn insert_many_front<I>(&mut self, storage: &mut S, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let head = self.head;
        self.insert_many(storage, head, values);
    }

    /// Removes all elements from the list and storage.
    pub fn clear(&mut self, storage: &mut S) {
        let mut key = self.head;
        while key.is_some() {
            let next = Self::node(storage, key).next;
            storage.remove(key);
            key = next;
        }
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }

    /// Swaps contents with `other` in O(1).
    ///
    /// Both lists must live in the same storage.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Copies the header only. The copy aliases this list's nodes, so it is
    /// only valid against a clone of the storage.
    pub(crate) fn clone_header(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Copies every element into new nodes of `storage`.
    pub fn clone_in(&self, storage: &mut S) -> Self
    where
        T: Clone,
    {
        let mut out = Self::new();
        let mut key = self.head;
        while key.is_some() {
            let node = Self::node(storage, key);
            let (value, next) = (node.value.clone(), node.next);
            out.push_back(storage, value);
            key = next;
        }
        out
    }

    // ========================================================================
    // Algorithms
    // ========================================================================

    /// Moves every node of `other` before `pos` in O(1).
    ///
    /// `other` is left empty. Keys of moved nodes stay valid.
    pub fn splice(&mut self, storage: &mut S, pos: K, other: &mut Self) {
        if other.is_empty() {
            return;
        }
        let first = other.head;
        let last = other.tail;
        let before = if pos.is_none() {
            self.tail
        } else {
            Self::node(storage, pos).prev
        };

        Self::node_mut(storage, first).prev = before;
        Self::node_mut(storage, last).next = pos;
        if before.is_some() {
            Self::node_mut(storage, before).next = first;
        } else {
            self.head = first;
        }
        if pos.is_some() {
            Self::node_mut(storage, pos).prev = last;
        } else {
            self.tail = last;
        }

        self.len += other.len;
        other.head = K::NONE;
        other.tail = K::NONE;
        other.len = 0;
    }

    /// Merges sorted `other` into this sorted list.
    ///
    /// Equal elements keep the ones already in `self` first. `other` is left
    /// empty.
    #[inline]
    pub fn merge(&mut self, storage: &mut S, other: &mut Self)
    where
        T: PartialOrd,
    {
        self.merge_by(storage, other, |a, b| a < b);
    }

    /// Merges sorted `other` into this list using `less` as the ordering.
    pub fn merge_by<F>(&mut self, storage: &mut S, other: &mut Self, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut cur = self.head;
        while cur.is_some() && other.head.is_some() {
            let taken = other.head;
            if less(
                &Self::node(storage, taken).value,
                &Self::node(storage, cur).value,
            ) {
                other.unlink(storage, taken);
                self.link_before(storage, cur, taken);
            } else {
                cur = Self::node(storage, cur).next;
            }
        }
        self.splice(storage, K::NONE, other);
    }

    /// Sorts the list in ascending order.
    ///
    /// Quicksort over positions: values move, nodes stay put. Average
    /// O(n log n), worst case O(n²). Not stable.
    #[inline]
    pub fn sort(&mut self, storage: &mut S)
    where
        T: PartialOrd,
    {
        self.sort_by(storage, |a, b| a < b);
    }

    /// Sorts the list with `less` as the ordering.
    pub fn sort_by<F>(&mut self, storage: &mut S, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.len > 1 {
            Self::quicksort(storage, self.head, self.len, &mut less);
        }
    }

    fn advance(storage: &S, mut key: K, steps: usize) -> K {
        for _ in 0..steps {
            key = Self::node(storage, key).next;
        }
        key
    }

    /// Sorts the `size` positions starting at `first`.
    fn quicksort<F>(storage: &mut S, first: K, size: usize, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if size < 2 {
            return;
        }

        // pivot tracks where the pivot value currently lives
        let mut pivot = Self::advance(storage, first, size / 2);
        let mut lo = first;
        let mut hi = Self::advance(storage, first, size - 1);
        let mut i = 0isize;
        let mut j = size as isize - 1;

        while i <= j {
            while less(
                &Self::node(storage, lo).value,
                &Self::node(storage, pivot).value,
            ) {
                i += 1;
                lo = Self::node(storage, lo).next;
            }
            while less(
                &Self::node(storage, pivot).value,
                &Self::node(storage, hi).value,
            ) {
                j -= 1;
                hi = Self::node(storage, hi).prev;
            }
            if i <= j {
                if lo != hi {
                    let (a, b) = storage
                        .get2_mut(lo, hi)
                        .expect("list link points at a vacant slot");
                    core::mem::swap(&mut a.value, &mut b.value);
                    if pivot == lo {
                        pivot = hi;
                    } else if pivot == hi {
                        pivot = lo;
                    }
                }
                i += 1;
                lo = Self::node(storage, lo).next;
                j -= 1;
                hi = Self::node(storage, hi).prev;
            }
        }

        if j > 0 {
            Self::quicksort(storage, first, j as usize + 1, less);
        }
        if (i as usize) < size {
            Self::quicksort(storage, lo, size - i as usize, less);
        }
    }

    /// Removes consecutive duplicates.
    ///
    /// Each element is compared with the last element kept, so `[1, 1, 1]`
    /// collapses to `[1]`.
    #[inline]
    pub fn unique(&mut self, storage: &mut S)
    where
        T: PartialEq,
    {
        self.unique_by(storage, |kept, cur| kept == cur);
    }

    /// Removes every element `same(kept, element)` reports as a duplicate of
    /// the last element kept.
    pub fn unique_by<F>(&mut self, storage: &mut S, mut same: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.len < 2 {
            return;
        }
        let mut kept = self.head;
        let mut cur = Self::node(storage, kept).next;
        while cur.is_some() {
            let next = Self::node(storage, cur).next;
            if same(
                &Self::node(storage, kept).value,
                &Self::node(storage, cur).value,
            ) {
                drop(self.erase(storage, cur));
            } else {
                kept = cur;
            }
            cur = next;
        }
    }

    /// Reverses the list in place by swapping every node's links.
    pub fn reverse(&mut self, storage: &mut S) {
        let mut key = self.head;
        while key.is_some() {
            let node = Self::node_mut(storage, key);
            core::mem::swap(&mut node.prev, &mut node.next);
            key = node.prev;
        }
        core::mem::swap(&mut self.head, &mut self.tail);
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over element references, front to back.
    #[inline]
    pub fn iter<'a>(&self, storage: &'a S) -> Iter<'a, T, S, K> {
        Iter {
            storage,
            front: self.head,
            back: self.tail,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over mutable element references, front to back.
    #[inline]
    pub fn iter_mut<'a>(&self, storage: &'a mut S) -> IterMut<'a, T, S, K> {
        IterMut {
            storage,
            front: self.head,
            back: self.tail,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over node keys, front to back.
    #[inline]
    pub fn keys<'a>(&self, storage: &'a S) -> Keys<'a, T, S, K> {
        Keys {
            storage,
            front: self.head,
            back: self.tail,
            _marker: PhantomData,
        }
    }

    /// Removes every element, yielding values front to back.
    ///
    /// The list is empty as soon as this returns. Elements not consumed are
    /// dropped with the iterator.
    pub fn drain<'a>(&mut self, storage: &'a mut S) -> Drain<'a, T, S, K> {
        let current = self.head;
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
        Drain {
            storage,
            current,
            _marker: PhantomData,
        }
    }

    /// Checks link symmetry and the length against a full walk.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self, storage: &S) {
        let mut count = 0;
        let mut prev = K::NONE;
        let mut key = self.head;
        while key.is_some() {
            let node = Self::node(storage, key);
            assert_eq!(node.prev, prev, "broken prev link");
            prev = key;
            key = node.next;
            count += 1;
            assert!(count <= self.len, "cycle or stale length");
        }
        assert_eq!(prev, self.tail, "tail does not match last node");
        assert_eq!(count, self.len, "length does not match walk");
        if self.len == 0 {
            assert!(self.head.is_none() && self.tail.is_none());
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to list elements.
pub struct Iter<'a, T, S, K: Index> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Index + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let node = self.storage.get(self.front)?;

        // Check if we've met in the middle
        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }

        Some(&node.value)
    }
}

impl<'a, T: 'a, S, K: Index + 'a> DoubleEndedIterator for Iter<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let node = self.storage.get(self.back)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.prev;
        }

        Some(&node.value)
    }
}

/// Iterator over mutable references to list elements.
pub struct IterMut<'a, T, S, K: Index> {
    storage: &'a mut S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Index + 'a> Iterator for IterMut<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let node = self.storage.get_mut(self.front)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }

        // Extend lifetime - safe because we visit each node exactly once
        Some(unsafe { &mut *((&mut node.value) as *mut T) })
    }
}

impl<'a, T: 'a, S, K: Index + 'a> DoubleEndedIterator for IterMut<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let node = self.storage.get_mut(self.back)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.prev;
        }

        // Extend lifetime - safe because we visit each node exactly once
        Some(unsafe { &mut *((&mut node.value) as *mut T) })
    }
}

/// Iterator over keys in the list.
pub struct Keys<'a, T, S, K: Index> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T, S, K: Index> Iterator for Keys<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let key = self.front;
        let node = self.storage.get(key)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }

        Some(key)
    }
}

impl<'a, T, S, K: Index> DoubleEndedIterator for Keys<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let key = self.back;
        let node = self.storage.get(key)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.prev;
        }

        Some(key)
    }
}

/// Iterator that removes and returns elements from a list.
pub struct Drain<'a, T, S, K: Index>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    storage: &'a mut S,
    current: K,
    _marker: PhantomData<T>,
}

impl<'a, T, S, K: Index> Iterator for Drain<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let key = self.current;
        let node = self.storage.remove(key)?;
        self.current = node.next;
        Some(node.value)
    }
}

impl<T, S, K: Index> Drop for Drain<'_, T, S, K>
where
    S: Storage<ListNode<T, K>, Index = K>,
{
    fn drop(&mut self) {
        // Exhaust remaining elements to ensure cleanup
        for _ in self.by_ref() {}
    }
}
