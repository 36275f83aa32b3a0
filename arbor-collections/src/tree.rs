//! Red-black tree over external node storage.
//!
//! The tree header is the sentinel: it records the root, the cached minimum
//! and maximum, the length and the comparator. Nodes live in a [`Storage`]
//! and are linked by index, with `K::NONE` standing for an absent child and
//! for the end position.
//!
//! Erasing a node never moves values between nodes: a node with two children
//! trades *positions* (links and colors) with its in-order predecessor, so
//! every other handle stays valid. Merging between trees that share one
//! storage detaches a node from the source and attaches the same slot to the
//! destination.
//!
//! # Invariants
//!
//! After every public mutation:
//! - the root is black
//! - a red node has no red child
//! - every path from the root to an absent child crosses the same number of
//!   black nodes
//! - the cached minimum/maximum are the in-order first/last nodes
//!
//! # Storage Invariant
//!
//! A tree must always be used with the storage it was built on. This is the
//! caller's responsibility (same discipline as the `slab` crate).
//!
//! # Example
//!
//! ```
//! use arbor_collections::{RbTree, SlabTreeStorage};
//!
//! let mut storage: SlabTreeStorage<i32> = slab::Slab::new();
//! let mut tree: RbTree<i32, SlabTreeStorage<i32>> = RbTree::new();
//!
//! for v in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(&mut storage, v);
//! }
//! assert_eq!(
//!     tree.iter(&storage).copied().collect::<Vec<_>>(),
//!     [1, 3, 4, 5, 7, 8, 9]
//! );
//!
//! let (_, inserted) = tree.insert(&mut storage, 4);
//! assert!(!inserted);
//!
//! let lb = tree.lower_bound(&storage, &6);
//! assert_eq!(tree.get(&storage, lb), Some(&7));
//! ```
//!
//! # Moving Between Trees
//!
//! ```
//! use arbor_collections::{RbTree, SlabTreeStorage};
//!
//! let mut storage: SlabTreeStorage<i32> = slab::Slab::new();
//! let mut a: RbTree<i32, SlabTreeStorage<i32>> = RbTree::new();
//! let mut b: RbTree<i32, SlabTreeStorage<i32>> = RbTree::new();
//!
//! a.insert_many(&mut storage, [1, 2, 3]);
//! let (four, _) = b.insert(&mut storage, 4);
//! b.insert(&mut storage, 2);
//!
//! a.merge(&mut storage, &mut b);
//!
//! // 4 moved, 2 already existed in `a` and stays behind
//! assert_eq!(a.len(), 4);
//! assert_eq!(b.iter(&storage).copied().collect::<Vec<_>>(), [2]);
//! assert_eq!(a.get(&storage, four), Some(&4));
//! ```

use core::marker::PhantomData;

use crate::{Compare, Index, Natural, Storage};

/// Tree storage backed by `slab::Slab`.
pub type SlabTreeStorage<T> = slab::Slab<TreeNode<T, usize>>;

const VACANT: &str = "tree link points at a vacant slot";

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Red node.
    Red,
    /// Black node; absent children count as black.
    Black,
}

/// A node in the tree: the value plus parent/child links and color.
#[derive(Debug, Clone)]
pub struct TreeNode<T, K: Index = usize> {
    pub(crate) value: T,
    pub(crate) parent: K,
    pub(crate) left: K,
    pub(crate) right: K,
    pub(crate) color: Color,
}

impl<T, K: Index> TreeNode<T, K> {
    /// Creates an unlinked red node.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value,
            parent: K::NONE,
            left: K::NONE,
            right: K::NONE,
            color: Color::Red,
        }
    }

    /// Returns the stored value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the node color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Where a descent for a key ended.
#[derive(Debug, Clone, Copy)]
enum Slot<K> {
    /// An equivalent key is stored at this node.
    Occupied(K),
    /// The key belongs under `parent` on the given side.
    Vacant { parent: K, left: bool },
}

// =============================================================================
// Navigation helpers shared by the tree and its iterators
// =============================================================================

#[inline]
fn node<T, S, K: Index>(storage: &S, key: K) -> &TreeNode<T, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    storage.get(key).expect(VACANT)
}

#[inline]
fn node_mut<T, S, K: Index>(storage: &mut S, key: K) -> &mut TreeNode<T, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    storage.get_mut(key).expect(VACANT)
}

fn leftmost<T, S, K: Index>(storage: &S, mut key: K) -> K
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    loop {
        let left = node(storage, key).left;
        if left.is_none() {
            return key;
        }
        key = left;
    }
}

fn rightmost<T, S, K: Index>(storage: &S, mut key: K) -> K
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    loop {
        let right = node(storage, key).right;
        if right.is_none() {
            return key;
        }
        key = right;
    }
}

/// In-order successor of a real node; `NONE` after the last node.
fn successor<T, S, K: Index>(storage: &S, mut key: K) -> K
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    let n = node(storage, key);
    if n.right.is_some() {
        return leftmost(storage, n.right);
    }
    let mut parent = n.parent;
    while parent.is_some() {
        let p = node(storage, parent);
        if p.right != key {
            break;
        }
        key = parent;
        parent = p.parent;
    }
    parent
}

/// In-order predecessor of a real node; `NONE` before the first node.
fn predecessor<T, S, K: Index>(storage: &S, mut key: K) -> K
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    let n = node(storage, key);
    if n.left.is_some() {
        return rightmost(storage, n.left);
    }
    let mut parent = n.parent;
    while parent.is_some() {
        let p = node(storage, parent);
        if p.left != key {
            break;
        }
        key = parent;
        parent = p.parent;
    }
    parent
}

// =============================================================================
// RbTree
// =============================================================================

/// A red-black tree over external storage.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Storage type (e.g. [`SlabTreeStorage<T>`])
/// - `K`: Link type (default `usize`)
/// - `C`: Ordering (default [`Natural`])
#[derive(Debug)]
pub struct RbTree<T, S, K: Index = usize, C = Natural>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    root: K,
    min: K,
    max: K,
    len: usize,
    cmp: C,
    _marker: PhantomData<fn() -> (T, S)>,
}

impl<T, S, K: Index, C> Default for RbTree<T, S, K, C>
where
    S: Storage<TreeNode<T, K>, Index = K>,
    C: Compare<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, K: Index, C> RbTree<T, S, K, C>
where
    S: Storage<TreeNode<T, K>, Index = K>,
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
            root: K::NONE,
            min: K::NONE,
            max: K::NONE,
            len: 0,
            cmp,
            _marker: PhantomData,
        }
    }

    /// Returns the ordering.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the largest number of elements a tree with this link type can
    /// address.
    #[inline]
    pub fn max_size(&self) -> usize {
        let per_node = core::mem::size_of::<TreeNode<T, K>>().max(1);
        K::NONE.as_usize().min(isize::MAX as usize / per_node)
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Returns the smallest element's key, or the end position if empty.
    #[inline]
    pub fn begin(&self) -> K {
        self.min
    }

    /// Returns the end position (`K::NONE`).
    #[inline]
    pub fn end(&self) -> K {
        K::NONE
    }

    /// Returns the smallest element's key, or `None` if empty.
    #[inline]
    pub fn first_key(&self) -> Option<K> {
        if self.min.is_none() {
            None
        } else {
            Some(self.min)
        }
    }

    /// Returns the largest element's key, or `None` if empty.
    #[inline]
    pub fn last_key(&self) -> Option<K> {
        if self.max.is_none() {
            None
        } else {
            Some(self.max)
        }
    }

    /// Returns the in-order successor of `key`.
    ///
    /// The last element steps to the end position; the end position wraps to
    /// the first element.
    #[inline]
    pub fn successor(&self, storage: &S, key: K) -> K {
        if key.is_none() {
            self.min
        } else {
            successor(storage, key)
        }
    }

    /// Returns the in-order predecessor of `key`.
    ///
    /// The first element steps to the end position; the end position wraps to
    /// the last element.
    #[inline]
    pub fn predecessor(&self, storage: &S, key: K) -> K {
        if key.is_none() {
            self.max
        } else {
            predecessor(storage, key)
        }
    }

    /// Returns a reference to the element at `key`.
    #[inline]
    pub fn get<'a>(&self, storage: &'a S, key: K) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
    {
        storage.get(key).map(|n| &n.value)
    }

    /// Returns a mutable reference to the element at `key`.
    ///
    /// Changing the part of the value the ordering reads breaks the tree.
    #[inline]
    pub fn get_mut<'a>(&mut self, storage: &'a mut S, key: K) -> Option<&'a mut T>
    where
        T: 'a,
        K: 'a,
    {
        storage.get_mut(key).map(|n| &mut n.value)
    }

    /// Returns the root's key, or `None` if empty.
    #[inline]
    pub fn root(&self) -> Option<K> {
        if self.root.is_none() {
            None
        } else {
            Some(self.root)
        }
    }

    /// Returns the color of the node at `key`.
    #[inline]
    pub fn color(&self, storage: &S, key: K) -> Option<Color> {
        storage.get(key).map(|n| n.color)
    }

    /// Returns the parent of the node at `key`.
    #[inline]
    pub fn parent(&self, storage: &S, key: K) -> Option<K> {
        storage.get(key).map(|n| n.parent).filter(|k| k.is_some())
    }

    /// Returns the left child of the node at `key`.
    #[inline]
    pub fn left(&self, storage: &S, key: K) -> Option<K> {
        storage.get(key).map(|n| n.left).filter(|k| k.is_some())
    }

    /// Returns the right child of the node at `key`.
    #[inline]
    pub fn right(&self, storage: &S, key: K) -> Option<K> {
        storage.get(key).map(|n| n.right).filter(|k| k.is_some())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn locate(&self, storage: &S, key: &C::Key, unique: bool) -> Slot<K> {
        let mut cur = self.root;
        let mut parent = K::NONE;
        let mut left = false;
        while cur.is_some() {
            let n = node(storage, cur);
            let here = self.cmp.key(&n.value);
            parent = cur;
            if self.cmp.less(key, here) {
                left = true;
                cur = n.left;
            } else if unique && !self.cmp.less(here, key) {
                return Slot::Occupied(cur);
            } else {
                // equivalent keys go right when duplicates are allowed
                left = false;
                cur = n.right;
            }
        }
        Slot::Vacant { parent, left }
    }

    /// Returns the first element equivalent to `key`, or the end position.
    pub fn find(&self, storage: &S, key: &C::Key) -> K {
        let lb = self.lower_bound(storage, key);
        if lb.is_some() && !self.cmp.less(key, self.cmp.key(&node(storage, lb).value)) {
            lb
        } else {
            K::NONE
        }
    }

    /// Returns `true` if an element equivalent to `key` is stored.
    #[inline]
    pub fn contains(&self, storage: &S, key: &C::Key) -> bool {
        self.find(storage, key).is_some()
    }

    /// Returns the first element not less than `key`, or the end position.
    pub fn lower_bound(&self, storage: &S, key: &C::Key) -> K {
        let mut cur = self.root;
        let mut found = K::NONE;
        while cur.is_some() {
            let n = node(storage, cur);
            if self.cmp.less(self.cmp.key(&n.value), key) {
                cur = n.right;
            } else {
                found = cur;
                cur = n.left;
            }
        }
        found
    }

    /// Returns the first element greater than `key`, or the end position.
    pub fn upper_bound(&self, storage: &S, key: &C::Key) -> K {
        let mut cur = self.root;
        let mut found = K::NONE;
        while cur.is_some() {
            let n = node(storage, cur);
            if self.cmp.less(key, self.cmp.key(&n.value)) {
                found = cur;
                cur = n.left;
            } else {
                cur = n.right;
            }
        }
        found
    }

    /// Returns `(lower_bound(key), upper_bound(key))`.
    #[inline]
    pub fn equal_range(&self, storage: &S, key: &C::Key) -> (K, K) {
        (
            self.lower_bound(storage, key),
            self.upper_bound(storage, key),
        )
    }

    /// Counts elements equivalent to `key` with a full scan. O(n).
    pub fn count(&self, storage: &S, key: &C::Key) -> usize {
        self.iter(storage)
            .filter(|v| self.cmp.equivalent(self.cmp.key(v), key))
            .count()
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Inserts `value` unless an equivalent element is stored.
    ///
    /// Returns the new node's key and `true`, or the existing node's key and
    /// `false` (`value` is dropped).
    pub fn insert(&mut self, storage: &mut S, value: T) -> (K, bool) {
        match self.locate(storage, self.cmp.key(&value), true) {
            Slot::Occupied(existing) => (existing, false),
            Slot::Vacant { parent, left } => {
                let key = storage.insert(TreeNode::new(value));
                self.attach(storage, key, parent, left);
                (key, true)
            }
        }
    }

    /// Inserts `value` after every equivalent element. Never rejects.
    pub fn insert_duplicate(&mut self, storage: &mut S, value: T) -> K {
        let (parent, left) = self.vacant_slot(storage, self.cmp.key(&value));
        let key = storage.insert(TreeNode::new(value));
        self.attach(storage, key, parent, left);
        key
    }

    /// Inserts every value with [`insert`](Self::insert) semantics.
    ///
    /// Returns one `(key, inserted)` per value, in input order. Rejected
    /// duplicates are dropped; earlier insertions stay.
    pub fn insert_many<I>(&mut self, storage: &mut S, values: I) -> Vec<(K, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|v| self.insert(storage, v))
            .collect()
    }

    /// Inserts every value with [`insert_duplicate`](Self::insert_duplicate)
    /// semantics. Every result reports `true`.
    pub fn insert_many_duplicate<I>(&mut self, storage: &mut S, values: I) -> Vec<(K, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|v| (self.insert_duplicate(storage, v), true))
            .collect()
    }

    fn vacant_slot(&self, storage: &S, key: &C::Key) -> (K, bool) {
        match self.locate(storage, key, false) {
            Slot::Vacant { parent, left } => (parent, left),
            Slot::Occupied(_) => unreachable!("duplicate descent always reaches a leaf"),
        }
    }

    /// Links the unlinked node `key` under `parent` and rebalances.
    fn attach(&mut self, storage: &mut S, key: K, parent: K, left: bool) {
        let n = node_mut(storage, key);
        n.parent = parent;
        n.left = K::NONE;
        n.right = K::NONE;
        n.color = Color::Red;

        if parent.is_none() {
            self.root = key;
            self.min = key;
            self.max = key;
        } else if left {
            node_mut(storage, parent).left = key;
            if self.min == parent {
                self.min = key;
            }
        } else {
            node_mut(storage, parent).right = key;
            if self.max == parent {
                self.max = key;
            }
        }

        self.len += 1;
        self.insert_fixup(storage, key);
    }

    // ========================================================================
    // Erase
    // ========================================================================

    /// Removes the element at `key`.
    ///
    /// The end position or a vacant key does nothing and returns `None`.
    /// `key` must otherwise belong to this tree.
    pub fn erase(&mut self, storage: &mut S, key: K) -> Option<T> {
        if key.is_none() || storage.get(key).is_none() {
            return None;
        }
        self.detach(storage, key);
        storage.remove(key).map(|n| n.value)
    }

    /// Unlinks `z` and rebalances, leaving the node in storage.
    fn detach(&mut self, storage: &mut S, z: K) {
        if self.min == z {
            self.min = successor(storage, z);
        }
        if self.max == z {
            self.max = predecessor(storage, z);
        }

        let n = node(storage, z);
        if n.left.is_some() && n.right.is_some() {
            let pred = rightmost(storage, n.left);
            self.swap_positions(storage, z, pred);
        }
        // at most one child left, and a lone child is a red leaf
        let n = node(storage, z);
        let child = if n.left.is_some() { n.left } else { n.right };
        if child.is_some() {
            self.swap_positions(storage, z, child);
        }

        if node(storage, z).color == Color::Black {
            self.delete_fixup(storage, z);
        }

        let parent = node(storage, z).parent;
        if parent.is_none() {
            self.root = K::NONE;
        } else {
            let p = node_mut(storage, parent);
            if p.left == z {
                p.left = K::NONE;
            } else {
                p.right = K::NONE;
            }
        }
        let n = node_mut(storage, z);
        n.parent = K::NONE;
        n.color = Color::Red;

        self.len -= 1;
    }

    /// Exchanges the tree positions (links and colors) of nodes `a` and `b`.
    ///
    /// Values stay in their slots, so keys keep pointing at the same values.
    fn swap_positions(&mut self, storage: &mut S, a: K, b: K) {
        let na = node(storage, a);
        let (pa, la, ra, ca) = (na.parent, na.left, na.right, na.color);
        let nb = node(storage, b);
        let (pb, lb, rb, cb) = (nb.parent, nb.left, nb.right, nb.color);

        let flip = |k: K| {
            if k == a {
                b
            } else if k == b {
                a
            } else {
                k
            }
        };

        let na = node_mut(storage, a);
        na.parent = flip(pb);
        na.left = flip(lb);
        na.right = flip(rb);
        na.color = cb;
        let nb = node_mut(storage, b);
        nb.parent = flip(pa);
        nb.left = flip(la);
        nb.right = flip(ra);
        nb.color = ca;

        if pa.is_none() {
            self.root = b;
        } else if pa != b {
            Self::flip_child(storage, pa, a, b);
        }
        if pb.is_none() {
            self.root = a;
        } else if pb != a && pb != pa {
            Self::flip_child(storage, pb, a, b);
        }

        for (owner, child) in [(a, lb), (a, rb), (b, la), (b, ra)] {
            let child = flip(child);
            if child.is_some() && child != a && child != b {
                node_mut(storage, child).parent = owner;
            }
        }
    }

    /// In `parent`, replaces child link `a` with `b` and `b` with `a`.
    fn flip_child(storage: &mut S, parent: K, a: K, b: K) {
        let p = node_mut(storage, parent);
        if p.left == a {
            p.left = b;
        } else if p.left == b {
            p.left = a;
        }
        if p.right == a {
            p.right = b;
        } else if p.right == b {
            p.right = a;
        }
    }

    // ========================================================================
    // Rebalancing
    // ========================================================================

    #[inline]
    fn is_red(storage: &S, key: K) -> bool {
        key.is_some() && node(storage, key).color == Color::Red
    }

    #[inline]
    fn set_color(storage: &mut S, key: K, color: Color) {
        node_mut(storage, key).color = color;
    }

    fn rotate_left(&mut self, storage: &mut S, x: K) {
        let y = node(storage, x).right;
        let y_left = node(storage, y).left;

        node_mut(storage, x).right = y_left;
        if y_left.is_some() {
            node_mut(storage, y_left).parent = x;
        }

        let xp = node(storage, x).parent;
        node_mut(storage, y).parent = xp;
        if xp.is_none() {
            self.root = y;
        } else {
            let p = node_mut(storage, xp);
            if p.left == x {
                p.left = y;
            } else {
                p.right = y;
            }
        }

        node_mut(storage, y).left = x;
        node_mut(storage, x).parent = y;
    }

    fn rotate_right(&mut self, storage: &mut S, x: K) {
        let y = node(storage, x).left;
        let y_right = node(storage, y).right;

        node_mut(storage, x).left = y_right;
        if y_right.is_some() {
            node_mut(storage, y_right).parent = x;
        }

        let xp = node(storage, x).parent;
        node_mut(storage, y).parent = xp;
        if xp.is_none() {
            self.root = y;
        } else {
            let p = node_mut(storage, xp);
            if p.left == x {
                p.left = y;
            } else {
                p.right = y;
            }
        }

        node_mut(storage, y).right = x;
        node_mut(storage, x).parent = y;
    }

    fn insert_fixup(&mut self, storage: &mut S, mut n: K) {
        loop {
            let p = node(storage, n).parent;
            if !Self::is_red(storage, p) {
                break;
            }
            // a red parent is never the root, so the grandparent exists
            let g = node(storage, p).parent;
            let g_node = node(storage, g);

            if p == g_node.left {
                let uncle = g_node.right;
                if Self::is_red(storage, uncle) {
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, uncle, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    n = g;
                } else {
                    if n == node(storage, p).right {
                        n = p;
                        self.rotate_left(storage, n);
                    }
                    let p = node(storage, n).parent;
                    let g = node(storage, p).parent;
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    self.rotate_right(storage, g);
                }
            } else {
                let uncle = g_node.left;
                if Self::is_red(storage, uncle) {
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, uncle, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    n = g;
                } else {
                    if n == node(storage, p).left {
                        n = p;
                        self.rotate_right(storage, n);
                    }
                    let p = node(storage, n).parent;
                    let g = node(storage, p).parent;
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    self.rotate_left(storage, g);
                }
            }
        }

        let root = self.root;
        Self::set_color(storage, root, Color::Black);
    }

    /// Restores black height around `x`, a black node about to lose one
    /// black level (the leaf being removed, then its ancestors).
    fn delete_fixup(&mut self, storage: &mut S, mut x: K) {
        while x != self.root && node(storage, x).color == Color::Black {
            let p = node(storage, x).parent;

            if x == node(storage, p).left {
                let mut s = node(storage, p).right;
                if Self::is_red(storage, s) {
                    Self::set_color(storage, s, Color::Black);
                    Self::set_color(storage, p, Color::Red);
                    self.rotate_left(storage, p);
                    s = node(storage, p).right;
                }

                let sn = node(storage, s);
                let (near, far) = (sn.left, sn.right);
                if !Self::is_red(storage, near) && !Self::is_red(storage, far) {
                    Self::set_color(storage, s, Color::Red);
                    if Self::is_red(storage, p) {
                        Self::set_color(storage, p, Color::Black);
                        return;
                    }
                    x = p;
                } else {
                    if !Self::is_red(storage, far) {
                        Self::set_color(storage, near, Color::Black);
                        Self::set_color(storage, s, Color::Red);
                        self.rotate_right(storage, s);
                        s = node(storage, p).right;
                    }
                    let p_color = node(storage, p).color;
                    Self::set_color(storage, s, p_color);
                    Self::set_color(storage, p, Color::Black);
                    let far = node(storage, s).right;
                    Self::set_color(storage, far, Color::Black);
                    self.rotate_left(storage, p);
                    break;
                }
            } else {
                let mut s = node(storage, p).left;
                if Self::is_red(storage, s) {
                    Self::set_color(storage, s, Color::Black);
                    Self::set_color(storage, p, Color::Red);
                    self.rotate_right(storage, p);
                    s = node(storage, p).left;
                }

                let sn = node(storage, s);
                let (near, far) = (sn.right, sn.left);
                if !Self::is_red(storage, near) && !Self::is_red(storage, far) {
                    Self::set_color(storage, s, Color::Red);
                    if Self::is_red(storage, p) {
                        Self::set_color(storage, p, Color::Black);
                        return;
                    }
                    x = p;
                } else {
                    if !Self::is_red(storage, far) {
                        Self::set_color(storage, near, Color::Black);
                        Self::set_color(storage, s, Color::Red);
                        self.rotate_left(storage, s);
                        s = node(storage, p).left;
                    }
                    let p_color = node(storage, p).color;
                    Self::set_color(storage, s, p_color);
                    Self::set_color(storage, p, Color::Black);
                    let far = node(storage, s).left;
                    Self::set_color(storage, far, Color::Black);
                    self.rotate_right(storage, p);
                    break;
                }
            }
        }

        let root = self.root;
        if root.is_some() {
            Self::set_color(storage, root, Color::Black);
        }
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Moves every node of `other` whose key is absent here into this tree.
    ///
    /// Nodes are relinked, not copied: their keys stay valid. Nodes whose
    /// key is already present stay in `other`. Both trees must share
    /// `storage`.
    pub fn merge(&mut self, storage: &mut S, other: &mut Self) {
        let mut moved = 0usize;
        let mut cur = other.min;
        while cur.is_some() {
            let next = successor(storage, cur);
            let slot = self.locate(storage, self.cmp.key(&node(storage, cur).value), true);
            if let Slot::Vacant { parent, left } = slot {
                other.detach(storage, cur);
                self.attach(storage, cur, parent, left);
                moved += 1;
            }
            cur = next;
        }
        log::debug!(
            "tree merge moved {} nodes, {} stayed in source",
            moved,
            other.len
        );
    }

    /// Moves every node of `other` into this tree, keeping duplicates.
    ///
    /// `other` is left empty. Both trees must share `storage`.
    pub fn merge_duplicates(&mut self, storage: &mut S, other: &mut Self) {
        let moved = other.len;
        let mut cur = other.min;
        while cur.is_some() {
            let next = successor(storage, cur);
            other.detach(storage, cur);
            let (parent, left) = self.vacant_slot(storage, self.cmp.key(&node(storage, cur).value));
            self.attach(storage, cur, parent, left);
            cur = next;
        }
        log::debug!("tree merge moved {} nodes with duplicates", moved);
    }

    /// Removes every element from the tree and storage.
    pub fn clear(&mut self, storage: &mut S) {
        // post-order walk over parent links, freeing leaves as they appear
        let mut cur = self.root;
        while cur.is_some() {
            let n = node(storage, cur);
            if n.left.is_some() {
                cur = n.left;
            } else if n.right.is_some() {
                cur = n.right;
            } else {
                let parent = n.parent;
                if parent.is_some() {
                    let p = node_mut(storage, parent);
                    if p.left == cur {
                        p.left = K::NONE;
                    } else {
                        p.right = K::NONE;
                    }
                }
                storage.remove(cur);
                cur = parent;
            }
        }
        self.root = K::NONE;
        self.min = K::NONE;
        self.max = K::NONE;
        self.len = 0;
    }

    /// Swaps contents with `other` in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Copies the header only. The copy aliases this tree's nodes, so it is
    /// only valid against a clone of the storage.
    pub(crate) fn clone_header(&self) -> Self
    where
        C: Clone,
    {
        Self {
            root: self.root,
            min: self.min,
            max: self.max,
            len: self.len,
            cmp: self.cmp.clone(),
            _marker: PhantomData,
        }
    }

    /// Copies the tree into new nodes of `storage`, keeping its exact shape
    /// and colors.
    pub fn clone_in(&self, storage: &mut S) -> Self
    where
        T: Clone,
        C: Clone,
    {
        let mut out = Self::with_comparator(self.cmp.clone());
        if self.root.is_some() {
            out.root = Self::copy_subtree(storage, self.root, K::NONE);
            out.min = leftmost(storage, out.root);
            out.max = rightmost(storage, out.root);
            out.len = self.len;
        }
        out
    }

    fn copy_subtree(storage: &mut S, src: K, parent: K) -> K
    where
        T: Clone,
    {
        let n = node(storage, src);
        let (left, right) = (n.left, n.right);
        let copy = TreeNode {
            value: n.value.clone(),
            parent,
            left: K::NONE,
            right: K::NONE,
            color: n.color,
        };
        let key = storage.insert(copy);
        if left.is_some() {
            let l = Self::copy_subtree(storage, left, key);
            node_mut(storage, key).left = l;
        }
        if right.is_some() {
            let r = Self::copy_subtree(storage, right, key);
            node_mut(storage, key).right = r;
        }
        key
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over elements in order.
    #[inline]
    pub fn iter<'a>(&self, storage: &'a S) -> Iter<'a, T, S, K> {
        Iter {
            storage,
            front: self.min,
            back: self.max,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over node keys in order.
    #[inline]
    pub fn keys<'a>(&self, storage: &'a S) -> Keys<'a, T, S, K> {
        Keys {
            storage,
            front: self.min,
            back: self.max,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over the elements in `[from, to)`.
    ///
    /// Both positions must belong to this tree with `from` not after `to`,
    /// e.g. the pair returned by [`equal_range`](Self::equal_range).
    pub fn range<'a>(&self, storage: &'a S, from: K, to: K) -> Iter<'a, T, S, K> {
        if from.is_none() || from == to {
            return Iter {
                storage,
                front: K::NONE,
                back: K::NONE,
                _marker: PhantomData,
            };
        }
        Iter {
            storage,
            front: from,
            back: self.predecessor(storage, to),
            _marker: PhantomData,
        }
    }

    /// Checks every red-black invariant, the cached extremes, the length and
    /// the in-order sequence. Returns the black height.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self, storage: &S) -> usize {
        if self.root.is_none() {
            assert_eq!(self.len, 0, "empty tree with non-zero length");
            assert!(self.min.is_none() && self.max.is_none());
            return 0;
        }
        let root = node(storage, self.root);
        assert!(root.parent.is_none(), "root has a parent");
        assert_eq!(root.color, Color::Black, "root is red");

        let mut count = 0;
        let height = self.check_subtree(storage, self.root, &mut count);
        assert_eq!(count, self.len, "length does not match node count");
        assert_eq!(self.min, leftmost(storage, self.root), "stale min");
        assert_eq!(self.max, rightmost(storage, self.root), "stale max");

        let values: Vec<&T> = self.iter(storage).collect();
        assert_eq!(values.len(), self.len);
        for pair in values.windows(2) {
            assert!(
                !self.cmp.less(self.cmp.key(pair[1]), self.cmp.key(pair[0])),
                "in-order sequence decreases"
            );
        }
        height
    }

    #[cfg(test)]
    fn check_subtree(&self, storage: &S, key: K, count: &mut usize) -> usize {
        if key.is_none() {
            return 1;
        }
        *count += 1;
        let n = node(storage, key);
        for child in [n.left, n.right] {
            if child.is_some() {
                assert_eq!(node(storage, child).parent, key, "broken parent link");
                if n.color == Color::Red {
                    assert_eq!(node(storage, child).color, Color::Black, "red-red edge");
                }
            }
        }
        let left = self.check_subtree(storage, n.left, count);
        let right = self.check_subtree(storage, n.right, count);
        assert_eq!(left, right, "unequal black height");
        left + usize::from(n.color == Color::Black)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// In-order iterator over references to tree elements.
pub struct Iter<'a, T, S, K: Index> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Index + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let n = self.storage.get(self.front)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = successor(self.storage, self.front);
        }

        Some(&n.value)
    }
}

impl<'a, T: 'a, S, K: Index + 'a> DoubleEndedIterator for Iter<'a, T, S, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let n = self.storage.get(self.back)?;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = predecessor(self.storage, self.back);
        }

        Some(&n.value)
    }
}

/// In-order iterator over node keys.
pub struct Keys<'a, T, S, K: Index> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T, S, K: Index> Iterator for Keys<'a, T, S, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let key = self.front;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = successor(self.storage, key);
        }

        Some(key)
    }
}

impl<'a, T, S, K: Index> DoubleEndedIterator for Keys<'a, T, S, K>
where
    S: Storage<TreeNode<T, K>, Index = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let key = self.back;

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = predecessor(self.storage, key);
        }

        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByFirst, FnCompare};

    type TestStorage = SlabTreeStorage<i32>;
    type TestTree = RbTree<i32, TestStorage>;

    fn values(tree: &TestTree, storage: &TestStorage) -> Vec<i32> {
        tree.iter(storage).copied().collect()
    }

    fn build(storage: &mut TestStorage, items: &[i32]) -> TestTree {
        let mut tree = TestTree::new();
        for &v in items {
            tree.insert(storage, v);
            tree.validate_invariants(storage);
        }
        tree
    }

    #[test]
    fn accessors_over_borrowed_values() {
        let words = [String::from("b"), String::from("a")];
        let mut storage: SlabTreeStorage<&str> = SlabTreeStorage::new();
        let mut tree: RbTree<&str, SlabTreeStorage<&str>> = RbTree::new();
        for w in &words {
            tree.insert(&mut storage, w.as_str());
        }

        let first = tree.begin();
        assert_eq!(tree.get(&storage, first), Some(&"a"));
        if let Some(v) = tree.get_mut(&mut storage, first) {
            *v = "0";
        }
        assert_eq!(tree.iter(&storage).copied().collect::<Vec<_>>(), ["0", "b"]);
        tree.validate_invariants(&storage);
    }
    #[test]
    fn empty_tree() {
        let storage = TestStorage::new();
        let tree = TestTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.begin(), tree.end());
        assert!(tree.root().is_none());
        assert!(tree.first_key().is_none());
        assert!(tree.last_key().is_none());
        assert_eq!(tree.find(&storage, &1), tree.end());
        assert_eq!(tree.iter(&storage).count(), 0);
        assert_eq!(tree.validate_invariants(&storage), 0);
    }

    #[test]
    fn insert_sequence_is_ordered_and_balanced() {
        let mut storage = TestStorage::new();
        let tree = build(&mut storage, &[5, 3, 8, 1, 4, 7, 9]);

        assert_eq!(values(&tree, &storage), [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(tree.len(), 7);

        let root = tree.root().unwrap();
        assert_eq!(tree.get(&storage, root), Some(&5));
        assert_eq!(tree.color(&storage, root), Some(Color::Black));

        let three = tree.find(&storage, &3);
        let eight = tree.find(&storage, &8);
        assert_eq!(tree.color(&storage, three), Some(Color::Black));
        assert_eq!(tree.color(&storage, eight), Some(Color::Black));
        assert_eq!(tree.parent(&storage, three), Some(root));
        assert_eq!(tree.left(&storage, root), Some(three));
        assert_eq!(tree.right(&storage, root), Some(eight));
        assert!(tree.parent(&storage, root).is_none());
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut storage = TestStorage::new();
        let mut tree = TestTree::new();
        for v in 0..1024 {
            tree.insert(&mut storage, v);
        }
        let height = tree.validate_invariants(&storage);
        // black height of a 1024-node red-black tree is at most log2(n + 1)
        assert!(height <= 11);
    }

    #[test]
    fn duplicate_insert_returns_existing() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[1, 2, 3]);

        let two = tree.find(&storage, &2);
        assert_eq!(tree.insert(&mut storage, 2), (two, false));
        assert_eq!(tree.len(), 3);
        assert_eq!(storage.len(), 3);
    }

    #[test]
    fn insert_duplicate_goes_after_equals() {
        let mut storage: SlabTreeStorage<(i32, char)> = slab::Slab::new();
        let mut tree: RbTree<(i32, char), _, usize, ByFirst> = RbTree::new();

        tree.insert_duplicate(&mut storage, (2, 'a'));
        tree.insert_duplicate(&mut storage, (1, 'a'));
        tree.insert_duplicate(&mut storage, (2, 'b'));
        tree.insert_duplicate(&mut storage, (2, 'c'));
        tree.validate_invariants(&storage);

        let seq: Vec<_> = tree.iter(&storage).copied().collect();
        assert_eq!(seq, [(1, 'a'), (2, 'a'), (2, 'b'), (2, 'c')]);
        assert_eq!(tree.count(&storage, &2), 3);

        let first_two = tree.find(&storage, &2);
        assert_eq!(tree.get(&storage, first_two), Some(&(2, 'a')));
    }

    #[test]
    fn erase_min_repeatedly() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[5, 3, 8, 1, 4, 7, 9]);

        for expected in [1, 3, 4, 5, 7, 8, 9] {
            let min = tree.begin();
            assert_eq!(tree.get(&storage, min), Some(&expected));
            assert_eq!(tree.erase(&mut storage, min), Some(expected));
            tree.validate_invariants(&storage);
        }
        assert!(tree.is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn erase_max_repeatedly() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[5, 3, 8, 1, 4, 7, 9]);

        while let Some(max) = tree.last_key() {
            let before = *tree.get(&storage, max).unwrap();
            tree.erase(&mut storage, max);
            tree.validate_invariants(&storage);
            if let Some(new_max) = tree.last_key() {
                assert!(*tree.get(&storage, new_max).unwrap() < before);
            }
        }
    }

    #[test]
    fn erase_end_and_stale_keys_are_noops() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[1, 2]);

        assert_eq!(tree.erase(&mut storage, tree.end()), None);
        let one = tree.find(&storage, &1);
        assert_eq!(tree.erase(&mut storage, one), Some(1));
        assert_eq!(tree.erase(&mut storage, one), None);
        assert_eq!(tree.len(), 1);
        tree.validate_invariants(&storage);
    }

    #[test]
    fn erase_inner_node_keeps_other_keys() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[50, 25, 75, 10, 30, 60, 90, 27, 35]);
        let keys: Vec<(usize, i32)> = tree
            .keys(&storage)
            .map(|k| (k, *tree.get(&storage, k).unwrap()))
            .collect();

        // 25 has two children
        let victim = tree.find(&storage, &25);
        assert_eq!(tree.erase(&mut storage, victim), Some(25));
        tree.validate_invariants(&storage);

        for (k, v) in keys.into_iter().filter(|&(_, v)| v != 25) {
            assert_eq!(tree.get(&storage, k), Some(&v));
        }
        assert_eq!(values(&tree, &storage), [10, 27, 30, 35, 50, 60, 75, 90]);
    }

    #[test]
    fn erase_root_until_empty() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &(0..64).collect::<Vec<_>>());

        while let Some(root) = tree.root() {
            tree.erase(&mut storage, root);
            tree.validate_invariants(&storage);
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn bounds_and_ranges() {
        let mut storage = TestStorage::new();
        let mut tree = TestTree::new();
        tree.insert_many_duplicate(&mut storage, [1, 3, 3, 3, 5, 7]);
        tree.validate_invariants(&storage);

        let lb = tree.lower_bound(&storage, &3);
        let ub = tree.upper_bound(&storage, &3);
        assert_eq!(tree.get(&storage, lb), Some(&3));
        assert_eq!(tree.get(&storage, ub), Some(&5));
        assert_eq!(tree.equal_range(&storage, &3), (lb, ub));
        assert_eq!(tree.range(&storage, lb, ub).count(), 3);

        assert_eq!(tree.get(&storage, tree.lower_bound(&storage, &4)), Some(&5));
        assert_eq!(tree.upper_bound(&storage, &7), tree.end());
        assert_eq!(tree.lower_bound(&storage, &8), tree.end());
        assert_eq!(tree.get(&storage, tree.lower_bound(&storage, &0)), Some(&1));

        assert_eq!(tree.find(&storage, &4), tree.end());
        assert!(!tree.contains(&storage, &4));
        assert!(tree.contains(&storage, &7));
        assert_eq!(tree.count(&storage, &3), 3);
        assert_eq!(tree.count(&storage, &4), 0);

        let (from, to) = tree.equal_range(&storage, &9);
        assert_eq!(tree.range(&storage, from, to).count(), 0);
        let tail: Vec<_> = tree.range(&storage, ub, tree.end()).copied().collect();
        assert_eq!(tail, [5, 7]);
    }

    #[test]
    fn navigation_wraps_through_end() {
        let mut storage = TestStorage::new();
        let tree = build(&mut storage, &[2, 1, 3]);

        let first = tree.begin();
        let last = tree.last_key().unwrap();
        assert_eq!(tree.predecessor(&storage, first), tree.end());
        assert_eq!(tree.successor(&storage, last), tree.end());
        assert_eq!(tree.successor(&storage, tree.end()), first);
        assert_eq!(tree.predecessor(&storage, tree.end()), last);

        let mid = tree.successor(&storage, first);
        assert_eq!(tree.get(&storage, mid), Some(&2));
        assert_eq!(tree.predecessor(&storage, mid), first);
    }

    #[test]
    fn insert_many_reports_each_value() {
        let mut storage = TestStorage::new();
        let mut tree = build(&mut storage, &[2]);

        let results = tree.insert_many(&mut storage, [1, 2, 3, 1]);
        let flags: Vec<bool> = results.iter().map(|&(_, ok)| ok).collect();
        assert_eq!(flags, [true, false, true, false]);
        assert_eq!(results[0].0, results[3].0);
        assert_eq!(values(&tree, &storage), [1, 2, 3]);
    }

    #[test]
    fn merge_moves_absent_keys_only() {
        let mut storage = TestStorage::new();
        let mut a = build(&mut storage, &[1, 3, 5]);
        let mut b = build(&mut storage, &[2, 3, 4, 5, 6]);
        let four = b.find(&storage, &4);

        a.merge(&mut storage, &mut b);

        a.validate_invariants(&storage);
        b.validate_invariants(&storage);
        assert_eq!(values(&a, &storage), [1, 2, 3, 4, 5, 6]);
        assert_eq!(values(&b, &storage), [3, 5]);
        // same slot, now owned by `a`
        assert_eq!(a.find(&storage, &4), four);
        assert_eq!(storage.len(), 8);
    }

    #[test]
    fn merge_duplicates_empties_source() {
        let mut storage = TestStorage::new();
        let mut a = TestTree::new();
        let mut b = TestTree::new();
        a.insert_many_duplicate(&mut storage, [1, 3, 5]);
        b.insert_many_duplicate(&mut storage, [3, 5, 5, 7]);

        a.merge_duplicates(&mut storage, &mut b);

        a.validate_invariants(&storage);
        b.validate_invariants(&storage);
        assert!(b.is_empty());
        assert_eq!(values(&a, &storage), [1, 3, 3, 5, 5, 5, 7]);
    }

    #[test]
    fn clone_in_keeps_shape_and_colors() {
        let mut storage = TestStorage::new();
        let tree = build(&mut storage, &[5, 3, 8, 1, 4, 7, 9, 10, 11]);

        let mut copy = tree.clone_in(&mut storage);
        copy.validate_invariants(&storage);

        let shape = |t: &TestTree, s: &TestStorage| -> Vec<(i32, Color, Option<i32>)> {
            t.keys(s)
                .map(|k| {
                    let parent = t.parent(s, k).map(|p| *t.get(s, p).unwrap());
                    (*t.get(s, k).unwrap(), t.color(s, k).unwrap(), parent)
                })
                .collect()
        };
        assert_eq!(shape(&tree, &storage), shape(&copy, &storage));

        let one = copy.begin();
        copy.erase(&mut storage, one);
        assert_eq!(tree.len(), 9);
        assert_eq!(copy.len(), 8);
        tree.validate_invariants(&storage);
    }

    #[test]
    fn clear_frees_only_own_nodes() {
        let mut storage = TestStorage::new();
        let mut a = build(&mut storage, &(0..100).collect::<Vec<_>>());
        let b = build(&mut storage, &[7]);

        a.clear(&mut storage);

        assert!(a.is_empty());
        a.validate_invariants(&storage);
        assert_eq!(storage.len(), 1);
        assert_eq!(values(&b, &storage), [7]);
    }

    #[test]
    fn swap_headers() {
        let mut storage = TestStorage::new();
        let mut a = build(&mut storage, &[1]);
        let mut b = build(&mut storage, &[2, 3]);

        a.swap(&mut b);
        assert_eq!(values(&a, &storage), [2, 3]);
        assert_eq!(values(&b, &storage), [1]);
    }

    #[test]
    fn custom_descending_order() {
        let mut storage = TestStorage::new();
        let mut tree: RbTree<i32, TestStorage, usize, _> =
            RbTree::with_comparator(FnCompare(|a: &i32, b: &i32| a > b));
        tree.insert_many(&mut storage, [3, 1, 4, 1, 5, 9, 2, 6]);
        tree.validate_invariants(&storage);

        let seq: Vec<i32> = tree.iter(&storage).copied().collect();
        assert_eq!(seq, [9, 6, 5, 4, 3, 2, 1]);
        assert_eq!(tree.get(&storage, tree.lower_bound(&storage, &7)), Some(&6));
    }

    #[test]
    fn reverse_iteration() {
        let mut storage = TestStorage::new();
        let tree = build(&mut storage, &[4, 2, 6, 1, 3, 5, 7]);

        let rev: Vec<i32> = tree.iter(&storage).rev().copied().collect();
        assert_eq!(rev, [7, 6, 5, 4, 3, 2, 1]);

        let mut iter = tree.iter(&storage);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&7));
        assert_eq!(iter.by_ref().count(), 5);
        assert_eq!(iter.next_back(), None);
        assert_eq!(tree.keys(&storage).rev().count(), 7);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::{BTreeMap, BTreeSet};

        #[derive(Debug, Clone)]
        enum Op {
            Insert(i32),
            InsertDuplicate(i32),
            EraseValue(i32),
            EraseMin,
            EraseMax,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (-64i32..64).prop_map(Op::Insert),
                2 => (-64i32..64).prop_map(Op::InsertDuplicate),
                3 => (-64i32..64).prop_map(Op::EraseValue),
                1 => Just(Op::EraseMin),
                1 => Just(Op::EraseMax),
            ]
        }

        fn model_values(model: &BTreeMap<i32, usize>) -> Vec<i32> {
            model
                .iter()
                .flat_map(|(&v, &n)| std::iter::repeat(v).take(n))
                .collect()
        }

        fn take_one(model: &mut BTreeMap<i32, usize>, v: i32) {
            if let Some(n) = model.get_mut(&v) {
                *n -= 1;
                if *n == 0 {
                    model.remove(&v);
                }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn matches_btree_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
                let mut storage = TestStorage::new();
                let mut tree = TestTree::new();
                let mut model: BTreeMap<i32, usize> = BTreeMap::new();

                for op in ops {
                    match op {
                        Op::Insert(v) => {
                            let (_, inserted) = tree.insert(&mut storage, v);
                            prop_assert_eq!(inserted, !model.contains_key(&v));
                            model.entry(v).or_insert(1);
                        }
                        Op::InsertDuplicate(v) => {
                            tree.insert_duplicate(&mut storage, v);
                            *model.entry(v).or_insert(0) += 1;
                        }
                        Op::EraseValue(v) => {
                            let key = tree.find(&storage, &v);
                            let removed = tree.erase(&mut storage, key);
                            prop_assert_eq!(removed.is_some(), model.contains_key(&v));
                            take_one(&mut model, v);
                        }
                        Op::EraseMin => {
                            let min = tree.begin();
                            let removed = tree.erase(&mut storage, min);
                            prop_assert_eq!(removed, model.keys().next().copied());
                            if let Some(v) = removed {
                                take_one(&mut model, v);
                            }
                        }
                        Op::EraseMax => {
                            let max = tree.last_key().unwrap_or(usize::NONE);
                            let removed = tree.erase(&mut storage, max);
                            prop_assert_eq!(removed, model.keys().next_back().copied());
                            if let Some(v) = removed {
                                take_one(&mut model, v);
                            }
                        }
                    }
                    tree.validate_invariants(&storage);
                    prop_assert_eq!(values(&tree, &storage), model_values(&model));
                    prop_assert_eq!(storage.len(), tree.len());
                }
            }

            #[test]
            fn merge_matches_set_union(
                a in prop::collection::btree_set(-100i32..100, 0..80),
                b in prop::collection::btree_set(-100i32..100, 0..80),
            ) {
                let mut storage = TestStorage::new();
                let mut ta = TestTree::new();
                let mut tb = TestTree::new();
                ta.insert_many(&mut storage, a.iter().copied());
                tb.insert_many(&mut storage, b.iter().copied());

                ta.merge(&mut storage, &mut tb);

                ta.validate_invariants(&storage);
                tb.validate_invariants(&storage);
                let union: BTreeSet<i32> = a.union(&b).copied().collect();
                let common: BTreeSet<i32> = a.intersection(&b).copied().collect();
                prop_assert_eq!(values(&ta, &storage), union.into_iter().collect::<Vec<_>>());
                prop_assert_eq!(values(&tb, &storage), common.into_iter().collect::<Vec<_>>());
            }

            #[test]
            fn merge_from_duplicate_source_loses_nothing(
                a in prop::collection::btree_set(-40i32..40, 0..60),
                b in prop::collection::vec(-40i32..40, 0..120),
            ) {
                let mut storage = TestStorage::new();
                let mut ta = TestTree::new();
                let mut tb = TestTree::new();
                ta.insert_many(&mut storage, a.iter().copied());
                tb.insert_many_duplicate(&mut storage, b.iter().copied());

                ta.merge(&mut storage, &mut tb);

                ta.validate_invariants(&storage);
                tb.validate_invariants(&storage);
                prop_assert_eq!(ta.len() + tb.len(), a.len() + b.len());
                prop_assert_eq!(storage.len(), a.len() + b.len());

                let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
                for &v in &b {
                    *counts.entry(v).or_insert(0) += 1;
                }
                let union: BTreeSet<i32> = a.iter().chain(b.iter()).copied().collect();
                let left: Vec<i32> = counts
                    .iter()
                    .flat_map(|(&v, &n)| {
                        let stay = if a.contains(&v) { n } else { n - 1 };
                        std::iter::repeat(v).take(stay)
                    })
                    .collect();
                prop_assert_eq!(values(&ta, &storage), union.into_iter().collect::<Vec<_>>());
                prop_assert_eq!(values(&tb, &storage), left);
            }

            #[test]
            fn merge_duplicates_moves_every_node(
                a in prop::collection::vec(-40i32..40, 0..100),
                b in prop::collection::vec(-40i32..40, 0..100),
            ) {
                let mut storage = TestStorage::new();
                let mut ta = TestTree::new();
                let mut tb = TestTree::new();
                ta.insert_many_duplicate(&mut storage, a.iter().copied());
                tb.insert_many_duplicate(&mut storage, b.iter().copied());

                ta.merge_duplicates(&mut storage, &mut tb);

                ta.validate_invariants(&storage);
                tb.validate_invariants(&storage);
                prop_assert!(tb.is_empty());
                let mut all: Vec<i32> = a.iter().chain(b.iter()).copied().collect();
                all.sort();
                prop_assert_eq!(values(&ta, &storage), all);
                prop_assert_eq!(storage.len(), ta.len());
            }
        }
    }
}

#[cfg(test)]
mod bench_slab_storage {
    use super::*;
    use hdrhistogram::Histogram;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[inline]
    fn rdtscp() -> u64 {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            core::arch::x86_64::__rdtscp(&mut 0)
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            use std::sync::OnceLock;
            static START: OnceLock<std::time::Instant> = OnceLock::new();
            START.get_or_init(std::time::Instant::now).elapsed().as_nanos() as u64
        }
    }

    fn print_histogram(name: &str, hist: &Histogram<u64>) {
        println!(
            "{:24} p50: {:5} cycles | p99: {:5} cycles | p999: {:6} cycles | min: {:4} | max: {:6}",
            name,
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.min(),
            hist.max(),
        );
    }

    const SIZE: usize = 10_000;
    const ITERATIONS: usize = 100_000;

    fn shuffled(n: usize) -> Vec<u64> {
        let mut values: Vec<u64> = (0..n as u64).collect();
        values.shuffle(&mut StdRng::seed_from_u64(7));
        values
    }

    fn populated() -> (SlabTreeStorage<u64>, RbTree<u64, SlabTreeStorage<u64>>) {
        let mut storage = slab::Slab::with_capacity(SIZE + 1);
        let mut tree = RbTree::new();
        tree.insert_many(&mut storage, shuffled(SIZE).into_iter().map(|v| v * 2));
        (storage, tree)
    }

    #[test]
    #[ignore]
    fn bench_tree_insert_erase() {
        let (mut storage, mut tree) = populated();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..ITERATIONS {
            let value = (i % SIZE) as u64 * 2 + 1;
            let start = rdtscp();
            let (key, _) = tree.insert(&mut storage, value);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            tree.erase(&mut storage, key);
        }

        print_histogram("insert", &hist);
    }

    #[test]
    #[ignore]
    fn bench_tree_find() {
        let (storage, tree) = populated();
        let targets = shuffled(SIZE);
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..ITERATIONS {
            let target = targets[i % SIZE] * 2;
            let start = rdtscp();
            let key = tree.find(&storage, &target);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            assert!(key.is_some());
        }

        print_histogram("find", &hist);
    }

    #[test]
    #[ignore]
    fn bench_tree_erase_min() {
        let (mut storage, mut tree) = populated();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..ITERATIONS {
            let min = tree.begin();
            let start = rdtscp();
            let value = tree.erase(&mut storage, min);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            // keep the size steady
            tree.insert(&mut storage, value.unwrap_or(0) + (SIZE as u64 + i as u64) * 2);
        }

        print_histogram("erase_min", &hist);
    }
}
