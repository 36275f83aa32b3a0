//! Node-based collections over external storage, plus a growable array.
//!
//! Two of the three containers here keep their nodes in a storage pool
//! and link them by index:
//!
//! ```text
//! Storage (Slab)  - owns nodes, hands out stable keys
//! List / RbTree   - link keys, don't own data
//! Vector          - contiguous buffer, owns its elements
//! ```
//!
//! A key stays valid until its node is erased, no matter how many other
//! nodes come and go. Lists and trees that share one storage can move nodes
//! between each other without copying values.
//!
//! # Quick Start
//!
//! ```
//! use arbor_collections::{RbTree, SlabTreeStorage};
//!
//! let mut storage: SlabTreeStorage<u64> = slab::Slab::with_capacity(64);
//! let mut tree: RbTree<u64, SlabTreeStorage<u64>> = RbTree::new();
//!
//! let (key, inserted) = tree.insert(&mut storage, 42);
//! assert!(inserted);
//! assert_eq!(tree.find(&storage, &42), key);
//!
//! assert_eq!(tree.erase(&mut storage, key), Some(42));
//! assert_eq!(tree.find(&storage, &42), tree.end());
//! ```
//!
//! # Positions and the End Sentinel
//!
//! Every container header doubles as a sentinel. [`Index::NONE`] is the
//! end position: lookups that fail return it, `next` from the last element
//! returns it, and `next` from it returns the first element.
//!
//! ```
//! use arbor_collections::{List, SlabListStorage};
//!
//! let mut storage: SlabListStorage<char> = slab::Slab::new();
//! let mut list: List<char, SlabListStorage<char>> = List::new();
//! list.insert_many_back(&mut storage, ['a', 'b']);
//!
//! let last = list.prev_key(&storage, list.end());
//! assert_eq!(list.get(&storage, last), Some(&'b'));
//! assert_eq!(list.next_key(&storage, last), list.end());
//! assert_eq!(list.next_key(&storage, list.end()), list.begin());
//! ```
//!
//! # Critical Invariant: Same Storage Instance
//!
//! All operations on a list or tree must use the storage its nodes live
//! in. Splice and merge on raw structures require both sides to share one
//! storage. A foreign storage never causes memory unsafety, but a key from
//! another pool names an unrelated node and the structure panics or returns
//! garbage.
//!
//! # Data Structures
//!
//! | Structure | Use Case | Key Operations |
//! |-----------|----------|----------------|
//! | [`List`] | Queues, splicing, stable positions | O(1) insert/erase/splice |
//! | [`RbTree`] | Ordered sets and maps | O(log n) insert/erase/find |
//! | [`Vector`] | Contiguous storage | O(1) amortized push, O(1) index |
//! | [`OwnedList`] / [`OwnedTree`] | Single structure, no shared pool | same, storage built in |
//! | [`Set`] / [`Multiset`] / [`Map`] | Ordered lookups | thin wrappers over [`OwnedTree`] |
//!
//! # Errors
//!
//! Fallible operations return [`Result`]. Each [`Error`] maps to an
//! [`ErrorKind`]: out of bounds (bad index, missing map key), logic (empty
//! container) or length (capacity beyond `max_size`).

#![warn(missing_docs)]

pub mod compare;
pub mod error;
pub mod index;
pub mod list;
pub mod owned;
pub mod storage;
pub mod tree;
pub mod vector;

pub use compare::{ByFirst, Compare, FnCompare, Natural};
pub use error::{Error, ErrorKind, Result};
pub use index::Index;
pub use list::{List, ListNode, SlabListStorage};
pub use owned::{Map, MapIter, Multiset, OwnedList, OwnedTree, Set};
pub use storage::Storage;
pub use tree::{Color, RbTree, SlabTreeStorage, TreeNode};
pub use vector::Vector;
