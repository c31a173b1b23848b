use core::{cell::UnsafeCell, fmt, marker::PhantomPinned, mem, ops::Not, ptr::NonNull};

pub(crate) type Link<T> = Option<NonNull<T>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    /// The balance factor delta caused by growth on this side.
    #[inline]
    pub(crate) const fn sign(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Tree links embedded in every node of an [`AvlTree`](crate::AvlTree).
///
/// A node type stores one `Links` value and exposes it through its
/// [`cordyceps::Linked`] implementation. The links are owned by the tree while the node is
/// inserted and must not be touched by the node's owner.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    // height(right) - height(left)
    balance: i8,
    _unpin: PhantomPinned,
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    pub(crate) fn balance(&self) -> i8 {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    pub(crate) fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn increment_balance(&mut self) {
        self.inner.get_mut().balance += 1;
    }

    #[inline]
    pub(crate) fn decrement_balance(&mut self) {
        self.inner.get_mut().balance -= 1;
    }

    /// Shifts the balance factor one step toward `dir`.
    #[inline]
    pub(crate) fn lean(&mut self, dir: Dir) {
        match dir {
            Dir::Left => self.decrement_balance(),
            Dir::Right => self.increment_balance(),
        }
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, balance: i8) {
        self.inner.get_mut().balance = balance;
    }

    // Resets the links of a node about to be inserted.
    #[inline]
    pub(crate) fn reset(&mut self, parent: Link<T>) {
        let inner = self.inner.get_mut();
        inner.parent = parent;
        inner.children = [None; 2];
        inner.balance = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("balance", &self.balance())
            .finish()
    }
}
