extern crate alloc;

use alloc::string::String;

use thiserror::Error;

/// A structural fault found by [`AvlTree::verify`](crate::AvlTree::verify).
///
/// Keys are rendered with their `Debug` representation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("balance factor {balance} at node {key} is outside [-1, 1]")]
    BalanceOutOfRange { key: String, balance: i8 },

    #[error("balance factor at node {key} is {stored}, but subtree heights give {computed}")]
    BalanceMismatch {
        key: String,
        stored: i8,
        computed: isize,
    },

    #[error("child {child} of node {key} does not point back at it")]
    ParentMismatch { key: String, child: String },

    #[error("root node {key} has a parent")]
    RootHasParent { key: String },

    #[error("key {key} is out of order with respect to ancestor {ancestor}")]
    OutOfOrder { key: String, ancestor: String },

    #[error("tree reports {expected} nodes but {found} are reachable")]
    LenMismatch { expected: usize, found: usize },
}
