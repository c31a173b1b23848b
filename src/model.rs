extern crate std;

use std::{iter, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Links, NodeRef, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// Upper bound on the height of an AVL tree with `len` nodes.
pub fn max_height(len: usize) -> usize {
    (1.44 * ((len + 2) as f64).log2()).floor() as usize
}

/// Position of `node` in the in-order sequence of its tree.
pub fn rank<T>(node: NodeRef<'_, T>) -> usize
where
    T: TreeNode<Links<T>> + ?Sized,
{
    iter::successors(node.prev(), |n| n.prev()).count()
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Search(ItemValue),
    Successor(ItemValue),
    Predecessor(ItemValue),
    Min,
    Max,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Search(item) => FinalOp::Search(get_value(sorted, item)),
            Op::Successor(item) => FinalOp::Successor(get_value(sorted, item)),
            Op::Predecessor(item) => FinalOp::Predecessor(get_value(sorted, item)),
            Op::Min => FinalOp::Min,
            Op::Max => FinalOp::Max,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Search(u32),
    Successor(u32),
    Predecessor(u32),
    Min,
    Max,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Search),
        value_strategy().prop_map(Op::Successor),
        value_strategy().prop_map(Op::Predecessor),
        Just(Op::Min),
        Just(Op::Max),
    ]
}

/// Runs `ops` against an [`AvlTree`] and a sorted `Vec`, asserting that both agree after every
/// operation and that the tree's invariants hold throughout.
pub fn run_sorted_equivalence(ops: Vec<Op>) {
    // A sorted multiset; equal keys are ordered by insertion.
    let mut sorted_values: Vec<u32> = Vec::with_capacity(ops.len());
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    #[inline]
    fn node_key(node: NodeRef<'_, TestNode>) -> u32 {
        node.key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                let idx = sorted_values.partition_point(|&v| v <= value);
                sorted_values.insert(idx, value);

                let inserted = avl.insert(TestNode::new(value));

                assert_eq!(inserted.key, value, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(rank(inserted), idx, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(value) => {
                let from_vec = sorted_values.binary_search(&value).ok().map(|_| value);
                let from_avl = avl.search(&value).map(node_key);

                assert_eq!(from_vec, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Successor(value) => {
                if let Some(node) = avl.search(&value) {
                    let idx = rank(node);
                    let from_vec = sorted_values.get(idx + 1).copied();
                    let next = avl.successor(node);

                    assert_eq!(from_vec, next.map(node_key), "FinalOp #{op_id}: {final_op:?}");
                    if let Some(next) = next {
                        assert_eq!(avl.predecessor(next), Some(node));
                    }
                }
            }

            FinalOp::Predecessor(value) => {
                if let Some(node) = avl.search(&value) {
                    let idx = rank(node);
                    let from_vec = idx.checked_sub(1).map(|i| sorted_values[i]);
                    let prev = avl.predecessor(node);

                    assert_eq!(from_vec, prev.map(node_key), "FinalOp #{op_id}: {final_op:?}");
                    if let Some(prev) = prev {
                        assert_eq!(avl.successor(prev), Some(node));
                    }
                }
            }

            FinalOp::Min => {
                let from_vec = sorted_values.first().copied();
                let from_avl = avl.min().map(node_key);

                assert_eq!(from_vec, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Max => {
                let from_vec = sorted_values.last().copied();
                let from_avl = avl.max().map(node_key);

                assert_eq!(from_vec, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        let height = avl.verify().unwrap_or_else(|e| panic!("FinalOp #{op_id}: {e}"));
        assert_eq!(height, avl.height());
        assert!(height <= max_height(avl.len()));
        assert_eq!(sorted_values.len(), avl.len());
        assert!(sorted_values.iter().zip(avl.iter()).all(|(&a, b)| a == b.key));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            // Keep the range narrow so duplicates show up.
            u8::arbitrary(u).map(u32::from).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = iter::repeat_with(|| op(u)).take(num_ops.into()).collect();

        Ok(CursorEquivalenceInput { values, ops })
    }
}

/// Walks a [`Cursor`](crate::Cursor) and an index into a sorted `Vec` in lockstep.
pub fn run_cursor_equivalence(values: Vec<u32>, ops: Vec<CursorOp>) {
    let mut avl: AvlTree<TestNode> = AvlTree::new();
    for &val in &values {
        avl.insert(TestNode::new(val));
    }
    avl.assert_invariants();

    let mut vec = values;
    vec.sort_unstable();

    fn vec_curs_prev(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut avl_curs = avl.cursor_first();

    // Check that the initial states are equivalent.
    {
        let v = vec_curs.map(|i| &vec[i]);
        let w = avl_curs.get().map(TestNode::key);

        assert_eq!(v, w);
    }

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                avl_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                avl_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| &vec[i]);
                let w = avl_curs.peek_next().map(TestNode::key);

                assert_eq!(v, w);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| &vec[i]);
                let w = avl_curs.peek_prev().map(TestNode::key);

                assert_eq!(v, w);
            }
        }

        let v = vec_curs.map(|i| &vec[i]);
        let w = avl_curs.get().map(TestNode::key);

        assert_eq!(v, w);

        // The cursor position and its node handle agree on the in-order index.
        if let (Some(i), Some(node)) = (vec_curs, avl_curs.node()) {
            assert_eq!(rank(node), i);
        }
    }
}
