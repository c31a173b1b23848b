use core::{fmt, ops::Deref, pin::Pin, ptr::NonNull};

use crate::{links::Dir, AvlTree, Links, TreeNode};

/// A read-only handle to a node linked into an [`AvlTree`].
///
/// The handle borrows the tree, so the tree cannot be restructured while it is alive.
pub struct NodeRef<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree AvlTree<T>,
    ptr: NonNull<T>,
}

impl<'tree, T> NodeRef<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    // `ptr` must be linked into `tree`.
    pub(crate) fn new(tree: &'tree AvlTree<T>, ptr: NonNull<T>) -> Self {
        NodeRef { tree, ptr }
    }

    pub(crate) fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    pub(crate) fn belongs_to(&self, tree: &AvlTree<T>) -> bool {
        core::ptr::eq(self.tree, tree)
    }

    /// Returns the node itself.
    pub fn get(&self) -> Pin<&'tree T> {
        unsafe { Pin::new_unchecked(self.ptr.as_ref()) }
    }

    /// Returns the node's key.
    pub fn key(&self) -> &'tree T::Key {
        unsafe { self.ptr.as_ref().key() }
    }

    /// Returns the height of the node's right subtree minus the height of its left subtree.
    pub fn balance_factor(&self) -> i8 {
        self.links().balance()
    }

    pub fn left(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.links().child(Dir::Left))
    }

    pub fn right(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.links().child(Dir::Right))
    }

    /// Returns the node's parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.links().parent())
    }

    /// Returns the in-order successor of this node.
    pub fn next(&self) -> Option<NodeRef<'tree, T>> {
        self.tree.successor(*self)
    }

    /// Returns the in-order predecessor of this node.
    pub fn prev(&self) -> Option<NodeRef<'tree, T>> {
        self.tree.predecessor(*self)
    }

    fn links(&self) -> &'tree Links<T> {
        unsafe { T::links(self.ptr).as_ref() }
    }

    fn relative(&self, ptr: Option<NonNull<T>>) -> Option<NodeRef<'tree, T>> {
        ptr.map(|ptr| NodeRef::new(self.tree, ptr))
    }
}

impl<T> Clone for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> where T: TreeNode<Links<T>> + ?Sized {}

impl<T> PartialEq for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for NodeRef<'_, T> where T: TreeNode<Links<T>> + ?Sized {}

impl<T> Deref for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> fmt::Debug for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("balance_factor", &self.balance_factor())
            .finish()
    }
}
