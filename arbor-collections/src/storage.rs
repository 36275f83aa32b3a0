//! Node storage with stable indices.
//!
//! Lists and trees never own their nodes. Nodes live in a [`Storage`] and the
//! structures link them by index, so a node can change owner (splice, merge)
//! without being moved in memory.

use crate::Index;

/// Slab-like storage with stable indices.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable indices**: an index remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Slot reuse**: removed slots can be reused by future inserts
/// - **No `NONE` slot**: `Index::NONE` is never handed out by `insert`
///
/// `slab::Slab<T>` implements this trait with `usize` indices.
pub trait Storage<T> {
    /// Index type for this storage.
    type Index: Index;

    /// Inserts a value, returning its stable index.
    fn insert(&mut self, value: T) -> Self::Index;

    /// Removes and returns the value at `index`, if present.
    fn remove(&mut self, index: Self::Index) -> Option<T>;

    /// Returns a reference to the value at `index`, if present.
    fn get(&self, index: Self::Index) -> Option<&T>;

    /// Returns a mutable reference to the value at `index`, if present.
    fn get_mut(&mut self, index: Self::Index) -> Option<&mut T>;

    /// Returns mutable references to two distinct occupied slots.
    ///
    /// Returns `None` if `a == b` or either slot is vacant.
    fn get2_mut(&mut self, a: Self::Index, b: Self::Index) -> Option<(&mut T, &mut T)>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slot is occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Storage<T> for slab::Slab<T> {
    type Index = usize;

    #[inline]
    fn insert(&mut self, value: T) -> Self::Index {
        slab::Slab::insert(self, value)
    }

    #[inline]
    fn remove(&mut self, index: Self::Index) -> Option<T> {
        self.try_remove(index)
    }

    #[inline]
    fn get(&self, index: Self::Index) -> Option<&T> {
        slab::Slab::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: Self::Index) -> Option<&mut T> {
        slab::Slab::get_mut(self, index)
    }

    #[inline]
    fn get2_mut(&mut self, a: Self::Index, b: Self::Index) -> Option<(&mut T, &mut T)> {
        // slab panics on equal keys
        if a == b {
            return None;
        }
        slab::Slab::get2_mut(self, a, b)
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }
}
