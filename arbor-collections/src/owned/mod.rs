//! Convenience wrappers that own their storage.
//!
//! The types in this module combine a data structure with its own
//! `slab::Slab`, so no method takes a storage argument.
//!
//! # When to use owned variants
//!
//! Use [`OwnedList`], [`OwnedTree`], [`Set`], [`Multiset`] or [`Map`] when:
//! - You have a single data structure (not several sharing one pool)
//! - You want a simpler API without passing `&mut storage` to every method
//! - You want `Clone`, `PartialEq` and `FromIterator`
//!
//! # When to use the raw variants
//!
//! Use [`List`](crate::List) or [`RbTree`](crate::RbTree) with external
//! storage when:
//! - Several structures share one storage pool
//! - Splice or merge must relink nodes in place (keys stay valid)
//!
//! Owned splice and merge move *values* between the two storages, so moved
//! elements get new keys in the destination and the cost is linear in the
//! moved elements (`O(m log n)` for tree merges) instead of the constant
//! relink of the raw types. List splice and merge, and tree
//! `merge_duplicates`, swap the storages in O(1) when the destination is
//! empty, and keys survive.
//!
//! # Example
//!
//! ```
//! use arbor_collections::{Map, OwnedList, Set};
//!
//! let mut list: OwnedList<i32> = [3, 1, 2].into_iter().collect();
//! list.sort();
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
//!
//! let mut set: Set<i32> = [5, 3, 5].into_iter().collect();
//! assert_eq!(set.len(), 2);
//! assert!(!set.insert(3).1);
//!
//! let mut map: Map<&str, u32> = Map::new();
//! *map.get_or_insert_default("apples") += 3;
//! assert_eq!(map.at(&"apples"), Ok(&3));
//! assert!(map.at(&"pears").is_err());
//! ```

mod list;
mod map;
mod multiset;
mod set;
mod tree;

pub use list::OwnedList;
pub use map::{Map, MapIter};
pub use multiset::Multiset;
pub use set::Set;
pub use tree::OwnedTree;
