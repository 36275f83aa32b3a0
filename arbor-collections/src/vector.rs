//! Contiguous growable array.
//!
//! [`Vector`] keeps `len` initialized elements at the front of a buffer of
//! `capacity` slots. Growth doubles the capacity (starting at one slot),
//! [`reserve`](Vector::reserve) allocates exactly what it is asked for, and
//! nothing but [`shrink_to_fit`](Vector::shrink_to_fit) ever gives memory
//! back.
//!
//! # Example
//!
//! ```
//! use arbor_collections::Vector;
//!
//! let mut v: Vector<i32> = [1, 2, 4, 5].into_iter().collect();
//! v.insert(2, 3).unwrap();
//!
//! assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5]);
//! assert!(v.capacity() >= 5);
//! assert!(v.at(5).is_err());
//! ```

use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};

use crate::{Error, Result};

/// A growable array with exact `reserve` and doubling growth.
pub struct Vector<T> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

// Safety: Vector owns its elements like Vec<T>
unsafe impl<T: Send> Send for Vector<T> {}
unsafe impl<T: Sync> Sync for Vector<T> {}

const fn is_zst<T>() -> bool {
    core::mem::size_of::<T>() == 0
}

impl<T> Vector<T> {
    /// Creates an empty vector without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: if is_zst::<T>() { usize::MAX } else { 0 },
            _marker: PhantomData,
        }
    }

    /// Creates an empty vector with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if `capacity > max_size()`.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut v = Self::new();
        v.reserve(capacity)?;
        Ok(v)
    }

    /// Creates a vector of `len` default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if `len > max_size()`.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        let mut v = Self::with_capacity(len)?;
        for _ in 0..len {
            v.push_back(T::default())?;
        }
        Ok(v)
    }

    /// Returns the number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of allocated slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the largest capacity this vector can reach.
    #[inline]
    pub const fn max_size(&self) -> usize {
        if is_zst::<T>() {
            usize::MAX
        } else {
            isize::MAX as usize / core::mem::size_of::<T>()
        }
    }

    /// Returns the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // Safety: the first len slots are initialized and ptr is aligned
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: the first len slots are initialized and ptr is aligned
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the element at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `pos >= len()`.
    #[inline]
    pub fn at(&self, pos: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(pos)
            .ok_or(Error::OutOfBounds { index: pos, len })
    }

    /// Returns the element at `pos` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `pos >= len()`.
    #[inline]
    pub fn at_mut(&mut self, pos: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(pos)
            .ok_or(Error::OutOfBounds { index: pos, len })
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the vector is empty.
    #[inline]
    pub fn front(&self) -> Result<&T> {
        self.as_slice().first().ok_or(Error::Empty { op: "front" })
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the vector is empty.
    #[inline]
    pub fn back(&self) -> Result<&T> {
        self.as_slice().last().ok_or(Error::Empty { op: "back" })
    }

    /// Ensures room for at least `capacity` elements.
    ///
    /// Does nothing when `capacity <= capacity()`. Otherwise reallocates to
    /// exactly `capacity` slots and moves the elements over in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if `capacity > max_size()`.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity > self.max_size() {
            return Err(Error::CapacityOverflow {
                requested: capacity,
                max: self.max_size(),
            });
        }
        if capacity <= self.cap {
            return Ok(());
        }
        self.reallocate(capacity)
    }

    /// Reallocates to exactly `len()` slots.
    pub fn shrink_to_fit(&mut self) {
        if is_zst::<T>() || self.cap == self.len {
            return;
        }
        // len <= cap <= max_size, so the layout is valid
        if let Err(err) = self.reallocate(self.len) {
            log::warn!("shrink_to_fit skipped: {err}");
        }
    }

    /// Drops every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();
        // Set len first so a panicking Drop cannot cause a double drop
        self.len = 0;
        // Safety: elems covers the initialized prefix we just forgot
        unsafe { ptr::drop_in_place(elems) };
    }

    /// Inserts `value` before position `pos`, returning `pos`.
    ///
    /// Grows to `max(1, 2 * capacity())` when full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `pos > len()`, or
    /// [`Error::CapacityOverflow`] if the vector cannot grow.
    pub fn insert(&mut self, pos: usize, value: T) -> Result<usize> {
        if pos > self.len {
            return Err(Error::OutOfBounds {
                index: pos,
                len: self.len,
            });
        }
        self.grow_if_full()?;

        // Safety: pos <= len < cap, shifted range stays inside the buffer
        unsafe {
            let at = self.ptr.as_ptr().add(pos);
            ptr::copy(at, at.add(1), self.len - pos);
            ptr::write(at, value);
        }
        self.len += 1;
        Ok(pos)
    }

    /// Removes and returns the element at `pos`. Capacity is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `pos >= len()`.
    pub fn erase(&mut self, pos: usize) -> Result<T> {
        if pos >= self.len {
            return Err(Error::OutOfBounds {
                index: pos,
                len: self.len,
            });
        }

        // Safety: pos < len, the tail is shifted over the read-out slot
        unsafe {
            let at = self.ptr.as_ptr().add(pos);
            let value = ptr::read(at);
            ptr::copy(at.add(1), at, self.len - pos - 1);
            self.len -= 1;
            Ok(value)
        }
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the vector cannot grow.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.grow_if_full()?;
        // Safety: len < cap after growing
        unsafe { ptr::write(self.ptr.as_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the vector is empty.
    pub fn pop_back(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(Error::Empty { op: "pop_back" });
        }
        self.len -= 1;
        // Safety: slot len was initialized and is now outside the live prefix
        Ok(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Inserts every value of `values` before `pos`, keeping their order.
    ///
    /// Returns the position of the first inserted element (`pos`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `pos > len()`. Values inserted
    /// before a growth failure stay in place.
    pub fn insert_many<I>(&mut self, pos: usize, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        if pos > self.len {
            return Err(Error::OutOfBounds {
                index: pos,
                len: self.len,
            });
        }
        for (offset, value) in values.into_iter().enumerate() {
            self.insert(pos + offset, value)?;
        }
        Ok(pos)
    }

    /// Appends every value of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the vector cannot grow.
    pub fn insert_many_back<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.push_back(value)?;
        }
        Ok(())
    }

    /// Swaps contents with `other` in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    fn grow_if_full(&mut self) -> Result<()> {
        if self.len < self.cap {
            return Ok(());
        }
        let target = if self.cap == 0 {
            1
        } else {
            self.cap.checked_mul(2).unwrap_or(usize::MAX)
        };
        self.reserve(target.min(self.max_size()).max(self.cap + 1))
    }

    /// Moves the live prefix into a fresh buffer of exactly `new_cap` slots.
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        if is_zst::<T>() {
            return Ok(());
        }
        log::trace!(
            "vector reallocation: {} -> {} slots ({} live)",
            self.cap,
            new_cap,
            self.len
        );

        let new_ptr = if new_cap == 0 {
            NonNull::dangling()
        } else {
            let layout = Layout::array::<T>(new_cap).map_err(|_| Error::CapacityOverflow {
                requested: new_cap,
                max: self.max_size(),
            })?;
            // Safety: layout has non-zero size (new_cap > 0, T not a ZST)
            let raw = unsafe { alloc(layout) } as *mut T;
            let Some(new_ptr) = NonNull::new(raw) else {
                handle_alloc_error(layout);
            };
            // Safety: both buffers hold at least len slots and do not overlap
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
            new_ptr
        };

        self.release();
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Frees the buffer without touching the elements.
    fn release(&mut self) {
        if is_zst::<T>() || self.cap == 0 {
            return;
        }
        // Safety: the buffer was allocated with this exact layout
        unsafe {
            let layout = Layout::array::<T>(self.cap).unwrap_unchecked();
            dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        self.clear();
        self.release();
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Vector<T> {
    /// Copies the elements into a buffer of the same capacity.
    fn clone(&self) -> Self {
        let mut out = Self::new();
        if out.reserve(self.cap).is_err() {
            return self.as_slice().iter().cloned().collect();
        }
        for value in self.as_slice() {
            // Safety: out.cap == self.cap >= self.len
            unsafe { ptr::write(out.ptr.as_ptr().add(out.len), value.clone()) };
            out.len += 1;
        }
        out
    }
}

impl<T> core::ops::Deref for Vector<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> core::ops::DerefMut for Vector<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T> FromIterator<T> for Vector<T> {
    /// # Panics
    ///
    /// Panics if the element count exceeds `max_size()`.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        v.extend(iter);
        v
    }
}

impl<T> Extend<T> for Vector<T> {
    /// # Panics
    ///
    /// Panics if the element count exceeds `max_size()`.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_many_back(iter).expect("vector capacity overflow");
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}
