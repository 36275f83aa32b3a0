//! OwnedTree - a red-black tree that owns its storage.

use crate::tree::{Iter, Keys};
use crate::{Color, Compare, Natural, RbTree, SlabTreeStorage};

/// A red-black tree that owns its storage.
///
/// Wraps [`RbTree`] + [`SlabTreeStorage`]. Elements are ordered by `C`
/// (default [`Natural`]); [`insert`](Self::insert) rejects equivalent
/// elements while [`insert_duplicate`](Self::insert_duplicate) keeps them.
///
/// # Example
///
/// ```
/// use arbor_collections::{Color, OwnedTree};
///
/// let mut tree: OwnedTree<i32> = OwnedTree::new();
/// tree.insert_many([5, 3, 8, 1, 4, 7, 9]);
///
/// let root = tree.root().unwrap();
/// assert_eq!(tree.get(root), Some(&5));
/// assert_eq!(tree.color(root), Some(Color::Black));
///
/// while !tree.is_empty() {
///     tree.erase(tree.begin());
/// }
/// ```
pub struct OwnedTree<T, C = Natural>
where
    C: Compare<T>,
{
    storage: SlabTreeStorage<T>,
    tree: RbTree<T, SlabTreeStorage<T>, usize, C>,
}

impl<T, C> OwnedTree<T, C>
where
    C: Compare<T>,
{
    /// Creates an empty tree with the default ordering.
    #[inline]
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::with_comparator(C::default())
    }

    /// Creates an empty tree ordered by `cmp`.
    #[inline]
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            storage: slab::Slab::new(),
            tree: RbTree::with_comparator(cmp),
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self
    where
        C: Default,
    {
        Self {
            storage: slab::Slab::with_capacity(capacity),
            tree: RbTree::new(),
        }
    }

    /// Returns the ordering.
    #[inline]
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of elements the tree can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Returns the smallest element's key, or the end position.
    #[inline]
    pub fn begin(&self) -> usize {
        self.tree.begin()
    }

    /// Returns the end position.
    #[inline]
    pub fn end(&self) -> usize {
        self.tree.end()
    }

    /// Returns the in-order successor of `key`, wrapping through the end.
    #[inline]
    pub fn successor(&self, key: usize) -> usize {
        self.tree.successor(&self.storage, key)
    }

    /// Returns the in-order predecessor of `key`, wrapping through the end.
    #[inline]
    pub fn predecessor(&self, key: usize) -> usize {
        self.tree.predecessor(&self.storage, key)
    }

    /// Returns the element at `key`.
    #[inline]
    pub fn get(&self, key: usize) -> Option<&T> {
        self.tree.get(&self.storage, key)
    }

    /// Returns the element at `key` mutably.
    ///
    /// Changing the element's ordering key breaks the tree.
    #[inline]
    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.tree.get_mut(&mut self.storage, key)
    }

    /// Returns the root's key.
    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.tree.root()
    }

    /// Returns the color of the node at `key`.
    #[inline]
    pub fn color(&self, key: usize) -> Option<Color> {
        self.tree.color(&self.storage, key)
    }

    /// Returns the parent of the node at `key`.
    #[inline]
    pub fn parent(&self, key: usize) -> Option<usize> {
        self.tree.parent(&self.storage, key)
    }

    /// Returns the left child of the node at `key`.
    #[inline]
    pub fn left(&self, key: usize) -> Option<usize> {
        self.tree.left(&self.storage, key)
    }

    /// Returns the right child of the node at `key`.
    #[inline]
    pub fn right(&self, key: usize) -> Option<usize> {
        self.tree.right(&self.storage, key)
    }

    /// Returns the first element equivalent to `key`, or the end position.
    #[inline]
    pub fn find(&self, key: &C::Key) -> usize {
        self.tree.find(&self.storage, key)
    }

    /// Returns `true` if an element equivalent to `key` is stored.
    #[inline]
    pub fn contains(&self, key: &C::Key) -> bool {
        self.tree.contains(&self.storage, key)
    }

    /// Returns the first element not less than `key`, or the end position.
    #[inline]
    pub fn lower_bound(&self, key: &C::Key) -> usize {
        self.tree.lower_bound(&self.storage, key)
    }

    /// Returns the first element greater than `key`, or the end position.
    #[inline]
    pub fn upper_bound(&self, key: &C::Key) -> usize {
        self.tree.upper_bound(&self.storage, key)
    }

    /// Returns `(lower_bound(key), upper_bound(key))`.
    #[inline]
    pub fn equal_range(&self, key: &C::Key) -> (usize, usize) {
        self.tree.equal_range(&self.storage, key)
    }

    /// Counts elements equivalent to `key`. O(n).
    #[inline]
    pub fn count(&self, key: &C::Key) -> usize {
        self.tree.count(&self.storage, key)
    }

    /// Inserts `value` unless an equivalent element is stored.
    #[inline]
    pub fn insert(&mut self, value: T) -> (usize, bool) {
        self.tree.insert(&mut self.storage, value)
    }

    /// Inserts `value` after every equivalent element.
    #[inline]
    pub fn insert_duplicate(&mut self, value: T) -> usize {
        self.tree.insert_duplicate(&mut self.storage, value)
    }

    /// Inserts every value, rejecting duplicates.
    #[inline]
    pub fn insert_many<I>(&mut self, values: I) -> Vec<(usize, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.insert_many(&mut self.storage, values)
    }

    /// Inserts every value, keeping duplicates.
    #[inline]
    pub fn insert_many_duplicate<I>(&mut self, values: I) -> Vec<(usize, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.insert_many_duplicate(&mut self.storage, values)
    }

    /// Removes the element at `key`; the end position and stale keys are
    /// no-ops.
    #[inline]
    pub fn erase(&mut self, key: usize) -> Option<T> {
        self.tree.erase(&mut self.storage, key)
    }

    /// Moves every element of `other` whose key is absent here.
    ///
    /// Elements are checked as they move, so of several equivalent elements
    /// in `other` only the first moves and the rest stay behind. The two
    /// trees own separate storage: each moved value is taken out of `other`
    /// and inserted here under a new key, O(m log(n + m)) overall.
    pub fn merge(&mut self, other: &mut Self) {
        let mut moved = 0usize;
        let mut key = other.begin();
        while key != other.end() {
            let next = other.successor(key);
            let present = other
                .get(key)
                .is_some_and(|v| self.contains(self.comparator().key(v)));
            if !present {
                if let Some(value) = other.erase(key) {
                    let (_, inserted) = self.tree.insert(&mut self.storage, value);
                    debug_assert!(inserted, "merge moved a value already present");
                    moved += 1;
                }
            }
            key = next;
        }
        log::trace!(
            "tree merge moved {} values between storages, {} stayed in source",
            moved,
            other.len()
        );
    }

    /// Moves every element of `other` here, keeping duplicates. `other` is
    /// left empty.
    ///
    /// O(1) when this tree is empty (the trees are swapped and keys carry
    /// over); otherwise every value is moved under a new key.
    pub fn merge_duplicates(&mut self, other: &mut Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.swap(other);
            return;
        }
        log::trace!("tree merge moving {} values between storages", other.len());
        while let Some(value) = other.erase(other.begin()) {
            self.tree.insert_duplicate(&mut self.storage, value);
        }
    }

    /// Removes all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear(&mut self.storage);
    }

    /// Swaps contents with `other` in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns an iterator over elements in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, SlabTreeStorage<T>, usize> {
        self.tree.iter(&self.storage)
    }

    /// Returns an iterator over node keys in order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, T, SlabTreeStorage<T>, usize> {
        self.tree.keys(&self.storage)
    }

    /// Returns an iterator over the elements in `[from, to)`.
    #[inline]
    pub fn range(&self, from: usize, to: usize) -> Iter<'_, T, SlabTreeStorage<T>, usize> {
        self.tree.range(&self.storage, from, to)
    }

    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        self.tree.validate_invariants(&self.storage);
        assert_eq!(self.storage.len(), self.tree.len(), "leaked nodes");
    }
}

impl<T, C> Default for OwnedTree<T, C>
where
    C: Compare<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C> Clone for OwnedTree<T, C>
where
    C: Compare<T> + Clone,
{
    /// Copies the storage slot for slot: keys, shape and colors carry over.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            tree: self.tree.clone_header(),
        }
    }
}

impl<T: core::fmt::Debug, C> core::fmt::Debug for OwnedTree<T, C>
where
    C: Compare<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for OwnedTree<T, C>
where
    C: Compare<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for OwnedTree<T, C> where C: Compare<T> {}

impl<T, C> FromIterator<T> for OwnedTree<T, C>
where
    C: Compare<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.insert_many(iter);
        tree
    }
}

impl<T, C> Extend<T> for OwnedTree<T, C>
where
    C: Compare<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a OwnedTree<T, C>
where
    C: Compare<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, SlabTreeStorage<T>, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
