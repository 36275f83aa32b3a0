//! Strict weak ordering used by the tree.
//!
//! A [`Compare`] projects each stored value to a key and orders keys with a
//! strict less-than. Two values are *equivalent* when neither is less than
//! the other; unique trees reject an insert whose key is equivalent to a
//! stored one.

/// Strict weak ordering over the keys of `T`.
///
/// # Example
///
/// ```
/// use arbor_collections::{ByFirst, Compare, Natural};
///
/// assert!(Natural.less(&1, &2));
/// assert!(Natural.equivalent(&2, &2));
///
/// let pair = ("b", 7);
/// assert_eq!(*ByFirst.key(&pair), "b");
/// ```
pub trait Compare<T> {
    /// The part of `T` the ordering looks at.
    type Key: ?Sized;

    /// Projects a stored value to its key.
    fn key<'a>(&self, value: &'a T) -> &'a Self::Key;

    /// Returns `true` if `a` orders strictly before `b`.
    fn less(&self, a: &Self::Key, b: &Self::Key) -> bool;

    /// Returns `true` if neither key orders before the other.
    #[inline]
    fn equivalent(&self, a: &Self::Key, b: &Self::Key) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders values by their own `PartialOrd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: PartialOrd> Compare<T> for Natural {
    type Key = T;

    #[inline]
    fn key<'a>(&self, value: &'a T) -> &'a T {
        value
    }

    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Orders `(K, V)` pairs by `K` alone.
///
/// Used by [`Map`](crate::Map) so lookups only need a `&K`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByFirst;

impl<K: PartialOrd, V> Compare<(K, V)> for ByFirst {
    type Key = K;

    #[inline]
    fn key<'a>(&self, value: &'a (K, V)) -> &'a K {
        &value.0
    }

    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Adapts a `Fn(&T, &T) -> bool` less-than closure.
///
/// ```
/// use arbor_collections::{Compare, FnCompare};
///
/// let desc = FnCompare(|a: &i32, b: &i32| a > b);
/// assert!(desc.less(&3, &1));
/// ```
#[derive(Clone, Copy)]
pub struct FnCompare<F>(pub F);

impl<F> core::fmt::Debug for FnCompare<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnCompare")
    }
}

impl<T, F> Compare<T> for FnCompare<F>
where
    F: Fn(&T, &T) -> bool,
{
    type Key = T;

    #[inline]
    fn key<'a>(&self, value: &'a T) -> &'a T {
        value
    }

    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}
