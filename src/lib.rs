//! An intrusive AVL tree.
//!
//! Every node carries a balance factor, the height of its right subtree minus the height of its
//! left subtree. Insertion walks back up from the new leaf adjusting balance factors and performs
//! at most one single or double rotation, which keeps every balance factor in `{-1, 0, 1}` and
//! the tree height within `1.44 * log2(n + 2)`.
//!
//! Equal keys are accepted. They are routed to the right on insertion and keep their insertion
//! order in traversals.

// Conventions used in comments:
// - The balance factor of a node `x` is denoted `bf(x)`.
// - A node is `d`-heavy if its `d` subtree is the taller one.
//
// Insertion invariants:
// 1. Before an ancestor absorbs the growth of one of its subtrees, its `bf` is in `{-1, 0, 1}`.
// 2. At most one ancestor on the insertion path reaches `bf = ±2`. Rotating there restores the
//    height the subtree had before the insertion, so nothing above it changes.

extern crate alloc;

use alloc::{format, string::String};
use core::{borrow::Borrow, cmp::Ordering, fmt, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

mod cursor;
mod error;
mod iter;
mod links;
pub mod map;
mod node;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use crate::{
    cursor::Cursor, error::InvariantViolation, iter::Iter, links::Links, map::AvlMap,
    node::NodeRef,
};

use crate::links::{Dir, Link};

/// A node type that can be linked into an [`AvlTree`].
pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// The tree takes ownership of each inserted node through its [`Linked::Handle`] and hands it
/// back when the tree is cleared or dropped.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

// Outcome of absorbing one level of growth in a child subtree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Growth {
    // The node's own subtree grew; its parent must absorb the growth in turn.
    Taller,
    // The shorter side caught up; the subtree height is unchanged.
    Absorbed,
    // The node became ±2 and was fixed by a rotation; the subtree height is unchanged.
    Rebalanced,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rotation {
    SingleLeft,
    SingleRight,
    DoubleLeft,
    DoubleRight,
}

impl Rotation {
    // Picks the rotation for a node that is doubly `heavy`, given the balance factor of its
    // child on that side.
    fn for_heavy_child(heavy: Dir, child_balance: i8) -> Rotation {
        match (heavy, child_balance) {
            (Dir::Left, -1) => Rotation::SingleRight,
            (Dir::Left, 1) => Rotation::DoubleRight,
            (Dir::Right, 1) => Rotation::SingleLeft,
            (Dir::Right, -1) => Rotation::DoubleLeft,
            (_, bf) => unreachable!("heavy child of a ±2 node has balance factor {bf}"),
        }
    }
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns a handle to the root node, if any.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|root| NodeRef::new(self, root))
    }

    /// Returns the height of the tree. An empty tree has height 0.
    ///
    /// The height is read off the balance factors by following the taller child from the root,
    /// so this completes in _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            height += 1;

            let links = unsafe { T::links(cur).as_ref() };
            opt_cur = if links.balance() > 0 {
                links.right()
            } else {
                links.left()
            };
        }

        height
    }

    /// Checks every structural invariant of the tree and returns its height.
    ///
    /// Subtree heights are recomputed from scratch and compared against the stored balance
    /// factors. This completes in _O(n)_ time.
    pub fn verify(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(InvariantViolation::LenMismatch {
                    expected: self.len,
                    found: 0,
                });
            }

            return Ok(0);
        };

        unsafe {
            if T::links(root).as_ref().parent().is_some() {
                return Err(InvariantViolation::RootHasParent {
                    key: describe(root),
                });
            }

            let (height, found) = self.verify_at(root, None, None)?;
            if found != self.len {
                return Err(InvariantViolation::LenMismatch {
                    expected: self.len,
                    found,
                });
            }

            Ok(height)
        }
    }

    /// Panics if any structural invariant of the tree does not hold.
    #[track_caller]
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.verify() {
            panic!("AVL tree invariant violated: {violation}");
        }
    }

    // Returns the height and the node count of the subtree rooted at `node`.
    //
    // Every key in the subtree must lie within the inclusive bounds set by `lower` and `upper`.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn verify_at(
        &self,
        node: NonNull<T>,
        lower: Link<T>,
        upper: Link<T>,
    ) -> Result<(usize, usize), InvariantViolation> {
        unsafe {
            let key = node.as_ref().key();

            let below = lower.filter(|l| key < l.as_ref().key());
            let above = upper.filter(|u| key > u.as_ref().key());
            if let Some(ancestor) = below.or(above) {
                return Err(InvariantViolation::OutOfOrder {
                    key: describe(node),
                    ancestor: describe(ancestor),
                });
            }

            let mut heights = [0; 2];
            let mut count = 1;

            for dir in [Dir::Left, Dir::Right] {
                let Some(child) = T::links(node).as_ref().child(dir) else {
                    continue;
                };

                if T::links(child).as_ref().parent() != Some(node) {
                    return Err(InvariantViolation::ParentMismatch {
                        key: describe(node),
                        child: describe(child),
                    });
                }

                // Equal keys may end up on either side of each other after a rotation.
                let (child_lower, child_upper) = match dir {
                    Dir::Left => (lower, Some(node)),
                    Dir::Right => (Some(node), upper),
                };

                let (height, subtree_len) = self.verify_at(child, child_lower, child_upper)?;
                heights[dir as usize] = height;
                count += subtree_len;
            }

            let balance = T::links(node).as_ref().balance();
            if !(-1..=1).contains(&balance) {
                return Err(InvariantViolation::BalanceOutOfRange {
                    key: describe(node),
                    balance,
                });
            }

            let computed = heights[Dir::Right as usize] as isize - heights[Dir::Left as usize] as isize;
            if computed != isize::from(balance) {
                return Err(InvariantViolation::BalanceMismatch {
                    key: describe(node),
                    stored: balance,
                    computed,
                });
            }

            Ok((1 + heights[0].max(heights[1]), count))
        }
    }

    /// Returns a handle to a node whose key equals `key`.
    ///
    /// If several nodes share the key, the one closest to the root is returned.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        Some(NodeRef::new(self, ptr))
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains a node with the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = T::links(cur).as_ref().left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = T::links(cur).as_ref().right(),
                }
            }
        }
    }

    /// Returns the node with the minimum key.
    pub fn min(&self) -> Option<NodeRef<'_, T>> {
        self.first_raw().map(|ptr| NodeRef::new(self, ptr))
    }

    /// Returns the node with the maximum key.
    pub fn max(&self) -> Option<NodeRef<'_, T>> {
        self.last_raw().map(|ptr| NodeRef::new(self, ptr))
    }

    /// Returns the in-order successor of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` belongs to a different tree.
    pub fn successor<'tree>(&'tree self, node: NodeRef<'tree, T>) -> Option<NodeRef<'tree, T>> {
        assert!(node.belongs_to(self), "node belongs to a different tree");

        let next = unsafe { self.successor_raw(node.as_ptr())? };
        Some(NodeRef::new(self, next))
    }

    /// Returns the in-order predecessor of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` belongs to a different tree.
    pub fn predecessor<'tree>(&'tree self, node: NodeRef<'tree, T>) -> Option<NodeRef<'tree, T>> {
        assert!(node.belongs_to(self), "node belongs to a different tree");

        let prev = unsafe { self.predecessor_raw(node.as_ptr())? };
        Some(NodeRef::new(self, prev))
    }

    /// Returns an in-order iterator over the nodes of the tree.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing at the minimum node.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.first_raw())
    }

    /// Returns a cursor pointing at the maximum node.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.last_raw())
    }

    /// Returns a cursor pointing at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` belongs to a different tree.
    pub fn cursor_at<'tree>(&'tree self, node: NodeRef<'tree, T>) -> Cursor<'tree, T> {
        assert!(node.belongs_to(self), "node belongs to a different tree");

        Cursor::new(self, Some(node.as_ptr()))
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.root.map(|root| unsafe { self.extreme_in_subtree(root, Dir::Left) })
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        self.root.map(|root| unsafe { self.extreme_in_subtree(root, Dir::Right) })
    }

    pub(crate) unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.step_raw(node, Dir::Right) }
    }

    pub(crate) unsafe fn predecessor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.step_raw(node, Dir::Left) }
    }

    // Returns the in-order neighbor of `node` in direction `dir`.
    //
    // If `node` has a `dir` subtree, the neighbor is that subtree's `!dir`-most node. Otherwise
    // it is the nearest ancestor whose `!dir` subtree contains `node`.
    unsafe fn step_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = T::links(node).as_ref().child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            let mut cur = node;
            loop {
                let parent = T::links(cur).as_ref().parent()?;

                if T::links(parent).as_ref().child(!dir) == Some(cur) {
                    return Some(parent);
                }

                cur = parent;
            }
        }
    }

    // Returns the `dir`-most node in the subtree rooted at `root`.
    #[inline]
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(next) = unsafe { T::links(cur).as_ref().child(dir) } {
            cur = next;
        }

        cur
    }

    /// Inserts an item into the tree and returns a handle to it.
    ///
    /// An item whose key equals an existing key is placed after it in key order.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> NodeRef<'_, T> {
        let ptr = T::into_ptr(item);

        let Some(root) = self.root else {
            // Tree is empty. Set `item` as the root and return.
            unsafe { T::links(ptr).as_mut().reset(None) };

            self.root = Some(ptr);
            self.len += 1;
            return NodeRef::new(self, ptr);
        };

        // Descend the tree, looking for a free slot. Ties go right.
        let mut parent = root;
        let dir = loop {
            let dir = match unsafe { ptr.as_ref().key().cmp(parent.as_ref().key()) } {
                Ordering::Less => Dir::Left,
                Ordering::Equal | Ordering::Greater => Dir::Right,
            };

            match unsafe { T::links(parent).as_ref().child(dir) } {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        unsafe {
            T::links(ptr).as_mut().reset(Some(parent));
            T::links(parent).as_mut().set_child(dir, Some(ptr));
        }

        self.len += 1;
        self.rebalance_inserted(ptr);

        NodeRef::new(self, ptr)
    }

    // Performs a bottom-up rebalance of the tree after the insertion of the leaf `node`.
    //
    // Each ancestor absorbs the growth of the subtree it was reached from; the walk stops at the
    // first ancestor whose own height did not change.
    fn rebalance_inserted(&mut self, node: NonNull<T>) {
        let mut child = node;

        while let Some(parent) = unsafe { T::links(child).as_ref().parent() } {
            let dir = unsafe { self.which_child(parent, child) };

            match unsafe { self.grow(parent, dir) } {
                Growth::Taller => child = parent,
                Growth::Absorbed | Growth::Rebalanced => return,
            }
        }
    }

    // Records that the `dir` subtree of `node` grew by one level.
    unsafe fn grow(&mut self, node: NonNull<T>, dir: Dir) -> Growth {
        let links = unsafe { T::links(node).as_mut() };
        let before = links.balance();

        assert!(
            (-1..=1).contains(&before),
            "balance factor {before} out of range before absorbing growth"
        );

        links.lean(dir);

        if before == 0 {
            Growth::Taller
        } else if before == -dir.sign() {
            Growth::Absorbed
        } else {
            unsafe { self.rebalance(node, dir) };
            Growth::Rebalanced
        }
    }

    // Restores the balance of `node`, which has just become doubly `heavy`.
    unsafe fn rebalance(&mut self, node: NonNull<T>, heavy: Dir) {
        unsafe {
            debug_assert_eq!(T::links(node).as_ref().balance(), 2 * heavy.sign());

            let child = T::links(node)
                .as_ref()
                .child(heavy)
                .expect("heavy side of a ±2 node must have a child");

            let rotation = Rotation::for_heavy_child(heavy, T::links(child).as_ref().balance());

            tracing::trace!(
                ?rotation,
                node = ?node.as_ref().key(),
                pivot = ?child.as_ref().key(),
                "rebalancing after insertion"
            );

            match rotation {
                Rotation::SingleLeft => self.rotate_left(child),
                Rotation::SingleRight => self.rotate_right(child),
                Rotation::DoubleLeft => self.rotate_double_left(child),
                Rotation::DoubleRight => self.rotate_double_right(child),
            }
        }
    }

    // Single left rotation about `pivot`, the right child of a +2 node.
    unsafe fn rotate_left(&mut self, pivot: NonNull<T>) {
        unsafe { self.rotate_single(pivot, Dir::Right) }
    }

    // Single right rotation about `pivot`, the left child of a -2 node.
    unsafe fn rotate_right(&mut self, pivot: NonNull<T>) {
        unsafe { self.rotate_single(pivot, Dir::Left) }
    }

    // Double left rotation about `pivot`, the right child of a +2 node. `pivot`'s left child is
    // promoted above both.
    unsafe fn rotate_double_left(&mut self, pivot: NonNull<T>) {
        unsafe { self.rotate_double(pivot, Dir::Right) }
    }

    // Double right rotation about `pivot`, the left child of a -2 node. `pivot`'s right child is
    // promoted above both.
    unsafe fn rotate_double_right(&mut self, pivot: NonNull<T>) {
        unsafe { self.rotate_double(pivot, Dir::Left) }
    }

    //     a              c
    //    / \            / \
    //   x   c    =>    a   z
    //      / \        / \
    //     y   z      x   y
    //
    // `c` is the `heavy` child of `a` and leans the same way. Both end up balanced.
    unsafe fn rotate_single(&mut self, up: NonNull<T>, heavy: Dir) {
        unsafe {
            let down = T::links(up)
                .as_ref()
                .parent()
                .expect("rotation pivot must have a parent");

            assert_eq!(T::links(down).as_ref().balance(), 2 * heavy.sign());
            assert_eq!(T::links(up).as_ref().balance(), heavy.sign());

            self.rotate_at(down, up);

            T::links(down).as_mut().set_balance(0);
            T::links(up).as_mut().set_balance(0);
        }
    }

    //     a                 d
    //    / \              /   \
    //   x   c            a     c
    //      / \    =>    / \   / \
    //     d   z        x   y w   z
    //    / \
    //   y   w
    //
    // `c` is the `heavy` child of `a` and leans the other way, toward `d`. The balance factors of
    // `a` and `c` depend on which of `y` and `w` is the taller; `d` ends up balanced.
    unsafe fn rotate_double(&mut self, child: NonNull<T>, heavy: Dir) {
        unsafe {
            let top = T::links(child)
                .as_ref()
                .parent()
                .expect("rotation pivot must have a parent");
            let up = T::links(child)
                .as_ref()
                .child(!heavy)
                .expect("double rotation requires an inner grandchild");

            assert_eq!(T::links(top).as_ref().balance(), 2 * heavy.sign());
            assert_eq!(T::links(child).as_ref().balance(), -heavy.sign());

            let up_balance = T::links(up).as_ref().balance();

            self.rotate_twice_at(top, child, up);

            let (top_balance, child_balance) = if up_balance == heavy.sign() {
                (-heavy.sign(), 0)
            } else if up_balance == -heavy.sign() {
                (0, heavy.sign())
            } else {
                (0, 0)
            };

            T::links(top).as_mut().set_balance(top_balance);
            T::links(child).as_mut().set_balance(child_balance);
            T::links(up).as_mut().set_balance(0);
        }
    }

    // Moves `up` into the place of its parent `down`, which becomes `up`'s child on the other
    // side. `up`'s inner subtree moves across to `down`.
    //
    // Balance factors are not updated.
    unsafe fn rotate_at(&mut self, down: NonNull<T>, up: NonNull<T>) {
        unsafe {
            let side = self.which_child(down, up);
            let across = T::links(up).as_ref().child(!side);

            T::links(down).as_mut().set_child(side, across);
            Self::maybe_set_parent(across, Some(down));

            T::links(up).as_mut().set_child(!side, Some(down));
            let parent = T::links(down).as_mut().set_parent(Some(up));
            T::links(up).as_mut().set_parent(parent);

            self.replace_child_or_set_root(parent, down, Some(up));
        }
    }

    // Moves `up`, the inner grandchild of `top` through `child`, into the place of `top`. `top`
    // and `child` become its children, each taking one of `up`'s former subtrees.
    //
    // Balance factors are not updated.
    unsafe fn rotate_twice_at(&mut self, top: NonNull<T>, child: NonNull<T>, up: NonNull<T>) {
        unsafe {
            let side = self.which_child(top, child);
            debug_assert_eq!(T::links(child).as_ref().child(!side), Some(up));

            let across_top = T::links(up).as_ref().child(!side);
            let across_child = T::links(up).as_ref().child(side);

            T::links(top).as_mut().set_child(side, across_top);
            Self::maybe_set_parent(across_top, Some(top));

            T::links(child).as_mut().set_child(!side, across_child);
            Self::maybe_set_parent(across_child, Some(child));

            T::links(up).as_mut().set_child(!side, Some(top));
            T::links(up).as_mut().set_child(side, Some(child));
            T::links(child).as_mut().set_parent(Some(up));

            let parent = T::links(top).as_mut().set_parent(Some(up));
            T::links(up).as_mut().set_parent(parent);

            self.replace_child_or_set_root(parent, top, Some(up));
        }
    }

    unsafe fn maybe_set_parent(opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => {
                debug_assert_eq!(self.root, Some(old_child));

                if let Some(new_root) = new_child {
                    let key = unsafe { new_root.as_ref().key() };
                    tracing::trace!(root = ?key, "new root");
                }

                self.root = new_child;
            }
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    unsafe fn replace_child(&mut self, parent: NonNull<T>, old_child: NonNull<T>, new_child: Link<T>) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            debug_assert!(
                new_child.is_none() || T::links(parent).as_ref().child(!dir) != new_child,
                "`new_child` must not already be a child of `parent`"
            );

            T::links(parent).as_mut().set_child(dir, new_child);
        }
    }

    pub(crate) unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        let links = unsafe { T::links(parent).as_ref() };

        if links.left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                links.right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    /// Clears the tree, handing every node back to its owner handle.
    pub fn clear(&mut self) {
        let released = self.len;
        let mut opt_cur = self.root.take();

        // Post-order teardown: descend to a leaf, unlink it from its parent, release it, and
        // resume from the parent.
        while let Some(cur) = opt_cur {
            unsafe {
                let links = T::links(cur).as_ref();

                if let Some(child) = links.left().or(links.right()) {
                    opt_cur = Some(child);
                    continue;
                }

                let parent = links.parent();
                if let Some(parent) = parent {
                    let dir = self.which_child(parent, cur);
                    T::links(parent).as_mut().set_child(dir, None);
                }

                drop(T::from_ptr(cur));
                self.len -= 1;

                opt_cur = parent;
            }
        }

        if released > 0 {
            tracing::debug!(released, "cleared tree");
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|node| node.key()))
            .finish()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

fn describe<T>(node: NonNull<T>) -> String
where
    T: TreeNode<Links<T>> + ?Sized,
{
    format!("{:?}", unsafe { node.as_ref().key() })
}
