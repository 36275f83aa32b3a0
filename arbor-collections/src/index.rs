//! Sentinel-based link type for node structures.
//!
//! Lists and trees link their nodes by storage index. A reserved sentinel
//! value (e.g. `usize::MAX`) stands for "no node" instead of `Option<Idx>`,
//! and doubles as the end handle of every container.

/// A copyable index type with a sentinel "none" value.
///
/// # Example
///
/// ```
/// use arbor_collections::Index;
///
/// let idx: usize = 5;
/// let none: usize = usize::NONE;
///
/// assert!(idx.is_some());
/// assert!(none.is_none());
/// ```
pub trait Index: Copy + Eq + core::fmt::Debug {
    /// Sentinel value representing "no node".
    ///
    /// Links equal to `NONE` point at the container header (the sentinel),
    /// and `NONE` is the end handle returned by `end()`.
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Returns the index as a `usize`.
    fn as_usize(self) -> usize;

    /// Creates an index from a `usize`.
    fn from_usize(val: usize) -> Self;
}

macro_rules! impl_index_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Index for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_index_for_unsigned!(u8, u16, u32, u64, usize);
