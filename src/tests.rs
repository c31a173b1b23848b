extern crate std;

use std::{cell::Cell, fmt::Write, ops::Range, prelude::v1::*, rc::Rc, vec};

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::model::{self, max_height, rank, TestNode};

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    tree
}

// Renders the subtree as `key(left,right)`, with `_` for a missing child.
fn shape(node: Option<NodeRef<'_, TestNode>>) -> String {
    let mut out = String::new();
    write_shape(&mut out, node);
    out
}

fn write_shape(out: &mut String, node: Option<NodeRef<'_, TestNode>>) {
    let Some(node) = node else {
        out.push('_');
        return;
    };

    write!(out, "{}", node.key).unwrap();

    if node.left().is_some() || node.right().is_some() {
        out.push('(');
        write_shape(out, node.left());
        out.push(',');
        write_shape(out, node.right());
        out.push(')');
    }
}

// Recomputes the height of the subtree through the public node accessors, checking stored
// balance factors and parent links along the way.
fn checked_height(node: Option<NodeRef<'_, TestNode>>) -> usize {
    let Some(node) = node else {
        return 0;
    };

    for child in [node.left(), node.right()].into_iter().flatten() {
        assert_eq!(child.parent(), Some(node), "bad parent link at {}", child.key);
    }

    let left = checked_height(node.left());
    let right = checked_height(node.right());

    assert_eq!(
        isize::from(node.balance_factor()),
        right as isize - left as isize,
        "incorrect balance factor at node {}",
        node.key
    );

    1 + left.max(right)
}

fn balance_of(tree: &AvlTree<TestNode>, key: u32) -> i8 {
    tree.search(&key).expect("key not found").balance_factor()
}

fn permutations(n: u32) -> Vec<Vec<u32>> {
    if n == 0 {
        return vec![vec![]];
    }

    let mut out = Vec::new();
    for perm in permutations(n - 1) {
        for i in 0..=perm.len() {
            let mut next = perm.clone();
            next.insert(i, n - 1);
            out.push(next);
        }
    }

    out
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.search(key).expect("item not found");
        assert_eq!(node.key(), key);
    }

    assert_eq!(checked_height(tree.root()), tree.height());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn all_permutations_find() {
    for n in 2..=7 {
        for keys in permutations(n) {
            insert_find_all(&keys);
        }
    }
}

#[test]
fn single_left_rotation() {
    let tree = tree_of(&[1, 2, 3]);

    assert_eq!(shape(tree.root()), "2(1,3)");
    assert_eq!(tree.root().unwrap().balance_factor(), 0);
}

#[test]
fn single_right_rotation() {
    let tree = tree_of(&[3, 2, 1]);

    assert_eq!(shape(tree.root()), "2(1,3)");
    assert_eq!(tree.root().unwrap().balance_factor(), 0);
}

#[test]
fn double_left_rotation() {
    assert_eq!(shape(tree_of(&[1, 3, 2]).root()), "2(1,3)");

    // The promoted node was left-heavy.
    let tree = tree_of(&[20, 10, 40, 30, 50, 25]);
    assert_eq!(shape(tree.root()), "30(20(10,25),40(_,50))");
    assert_eq!(balance_of(&tree, 20), 0);
    assert_eq!(balance_of(&tree, 40), 1);
    assert_eq!(balance_of(&tree, 30), 0);

    // The promoted node was right-heavy.
    let tree = tree_of(&[20, 10, 40, 30, 50, 35]);
    assert_eq!(shape(tree.root()), "30(20(10,_),40(35,50))");
    assert_eq!(balance_of(&tree, 20), -1);
    assert_eq!(balance_of(&tree, 40), 0);
    assert_eq!(balance_of(&tree, 30), 0);
}

#[test]
fn double_right_rotation() {
    assert_eq!(shape(tree_of(&[3, 1, 2]).root()), "2(1,3)");

    // The promoted node was right-heavy.
    let tree = tree_of(&[40, 50, 20, 10, 30, 35]);
    assert_eq!(shape(tree.root()), "30(20(10,_),40(35,50))");
    assert_eq!(balance_of(&tree, 40), 0);
    assert_eq!(balance_of(&tree, 20), -1);
    assert_eq!(balance_of(&tree, 30), 0);

    // The promoted node was left-heavy.
    let tree = tree_of(&[40, 50, 20, 10, 30, 25]);
    assert_eq!(shape(tree.root()), "30(20(10,25),40(_,50))");
    assert_eq!(balance_of(&tree, 40), 1);
    assert_eq!(balance_of(&tree, 20), 0);
    assert_eq!(balance_of(&tree, 30), 0);
}

#[test]
fn ascending_run_cascades_left_rotations() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let mut roots = Vec::new();

    for key in 7..=12 {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
        roots.push(tree.root().unwrap().key);
    }

    assert_eq!(roots, vec![7, 7, 8, 8, 8, 10]);
    assert_eq!(shape(tree.root()), "10(8(7,9),11(_,12))");
    assert_eq!(balance_of(&tree, 10), 0);
    assert_eq!(balance_of(&tree, 11), 1);
}

#[test]
fn descending_run_cascades_right_rotations() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let mut roots = Vec::new();

    for key in (7..=12).rev() {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
        roots.push(tree.root().unwrap().key);
    }

    assert_eq!(roots, vec![12, 12, 11, 11, 11, 9]);
    assert_eq!(shape(tree.root()), "9(8(7,_),11(10,12))");
    assert_eq!(balance_of(&tree, 9), 0);
    assert_eq!(balance_of(&tree, 8), -1);
}

#[test]
fn double_rotation_deep_in_tree() {
    let keys = [80, 30, 100, 20, 50, 90, 120, 10, 40, 60];
    let mut tree = tree_of(&keys);

    // No rotation so far: insertion order shaped the tree.
    assert_eq!(
        shape(tree.root()),
        "80(30(20(10,_),50(40,60)),100(90,120))"
    );
    assert_eq!(balance_of(&tree, 80), -1);

    tree.insert(TestNode::new(55));
    tree.assert_invariants();

    assert_eq!(
        shape(tree.root()),
        "50(30(20(10,_),40),80(60(55,_),100(90,120)))"
    );
    assert_eq!(balance_of(&tree, 50), 0);
    assert_eq!(balance_of(&tree, 30), -1);
    assert_eq!(balance_of(&tree, 80), 0);
    assert_eq!(balance_of(&tree, 90), 0);
    assert_eq!(balance_of(&tree, 60), -1);
}

#[test]
#[cfg_attr(miri, ignore)]
fn many_random_keys() {
    const COUNT: usize = 150_000;

    let mut rng = StdRng::seed_from_u64(57);
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let (mut min, mut max) = (u32::MAX, u32::MIN);

    for _ in 0..COUNT {
        let key = rng.gen_range(1..=500_000);
        min = min.min(key);
        max = max.max(key);

        tree.insert(TestNode::new(key));
    }

    let height = tree.verify().unwrap();

    assert_eq!(tree.len(), COUNT);
    assert_eq!(tree.min().unwrap().key, min);
    assert_eq!(tree.max().unwrap().key, max);
    assert_eq!(height, tree.height());
    assert!((height as f64) <= 1.5 * (COUNT as f64).log2());
    assert!(height <= max_height(COUNT));
    assert!(tree.iter().zip(tree.iter().skip(1)).all(|(a, b)| a.key <= b.key));
}

#[test]
fn empty_tree() {
    let tree: AvlTree<TestNode> = AvlTree::new();

    for key in [0, 1, 42, u32::MAX] {
        assert!(tree.search(&key).is_none());
        assert!(!tree.contains_key(&key));
    }

    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert!(tree.min().is_none());
    assert!(tree.max().is_none());
    assert!(tree.iter().next().is_none());
    assert!(tree.cursor_first().get().is_none());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.verify(), Ok(0));
}

#[test]
fn height_bounds() {
    for len in [1, 2, 3, 10, 100, 1000, 5000] {
        let ascending: Vec<u32> = (0..len).collect();
        let tree = tree_of_unchecked(&ascending);

        let height = tree.verify().unwrap();
        let best = (len as f64).log2().floor() as usize + 1;

        assert!(height >= best, "len {len}: height {height} below {best}");
        assert!(height <= max_height(len as usize), "len {len}: height {height}");
    }
}

// Builds a tree checking invariants only once at the end.
fn tree_of_unchecked(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key));
    }

    tree.assert_invariants();
    tree
}

#[test]
fn successor_predecessor_duality() {
    let tree = tree_of_unchecked(&[50, 20, 80, 10, 30, 70, 90, 25, 35, 60, 75, 5]);

    let mut forward = Vec::new();
    let mut cur = tree.min();
    while let Some(node) = cur {
        forward.push(node.key);

        let next = tree.successor(node);
        if let Some(next) = next {
            assert_eq!(tree.predecessor(next), Some(node));
        }

        cur = next;
    }

    let mut backward = Vec::new();
    let mut cur = tree.max();
    while let Some(node) = cur {
        backward.push(node.key);
        cur = node.prev();
    }
    backward.reverse();

    assert_eq!(forward, vec![5, 10, 20, 25, 30, 35, 50, 60, 70, 75, 80, 90]);
    assert_eq!(forward, backward);
    assert_eq!(tree.successor(tree.max().unwrap()), None);
    assert_eq!(tree.predecessor(tree.min().unwrap()), None);
}

#[test]
fn duplicates_go_right_and_keep_order() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for i in 0..50 {
        let inserted = tree.insert(TestNode::new(5));
        assert_eq!(rank(inserted), i);
    }
    tree.insert(TestNode::new(3));
    tree.insert(TestNode::new(7));

    tree.assert_invariants();
    assert_eq!(tree.len(), 52);
    assert_eq!(tree.min().unwrap().key, 3);
    assert_eq!(tree.max().unwrap().key, 7);
    assert_eq!(tree.iter().filter(|n| n.key == 5).count(), 50);
    assert_eq!(tree.search(&5).unwrap().key, 5);
}

#[test]
fn node_accessors() {
    let tree = tree_of(&[2, 1, 3]);
    let root = tree.root().unwrap();

    assert_eq!(*root.key(), 2);
    assert!(root.parent().is_none());
    assert_eq!(root.left().unwrap().key, 1);
    assert_eq!(root.right().unwrap().key, 3);
    assert_eq!(root.left().unwrap().parent(), Some(root));
    assert_eq!(root.get().key, 2);
    assert_eq!(root.next().unwrap().key, 3);
    assert_eq!(root.prev().unwrap().key, 1);
}

#[test]
#[should_panic(expected = "different tree")]
fn foreign_node_rejected() {
    let a = tree_of(&[1, 2, 3]);
    let b = tree_of(&[1, 2, 3]);

    let node = a.search(&2).unwrap();
    let _ = b.successor(node);
}

#[test]
fn cursor_walks_both_ways() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    let mut curs = tree.cursor_first();
    let mut seen = Vec::new();
    while let Some(node) = curs.get() {
        seen.push(node.key);
        curs.move_next();
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);

    // From the ghost, stepping forward wraps to the first element and back to the last.
    assert_eq!(curs.peek_next().map(|n| n.key), Some(1));
    assert_eq!(curs.peek_prev().map(|n| n.key), Some(7));

    let mut curs = tree.cursor_at(tree.search(&4).unwrap());
    curs.move_prev();
    assert_eq!(curs.get().map(|n| n.key), Some(3));

    let mut curs = tree.cursor_last();
    curs.move_next();
    assert!(curs.get().is_none());
}

#[test]
fn iter_is_double_ended() {
    let tree = tree_of_unchecked(&[9, 3, 7, 1, 5]);

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next().map(|n| n.key), Some(1));
    assert_eq!(iter.next_back().map(|n| n.key), Some(9));
    assert_eq!(iter.next().map(|n| n.key), Some(3));
    assert_eq!(iter.next_back().map(|n| n.key), Some(7));
    assert_eq!(iter.next().map(|n| n.key), Some(5));
    assert!(iter.next().is_none());
    assert!(iter.next_back().is_none());
}

#[test]
fn verify_reports_corruption() {
    let tree = tree_of(&[1, 2, 3]);
    let root = tree.root.unwrap();

    unsafe { TestNode::links(root).as_mut().set_balance(1) };
    assert_eq!(
        tree.verify(),
        Err(InvariantViolation::BalanceMismatch {
            key: "2".to_string(),
            stored: 1,
            computed: 0,
        })
    );

    unsafe { TestNode::links(root).as_mut().set_balance(2) };
    assert!(matches!(
        tree.verify(),
        Err(InvariantViolation::BalanceOutOfRange { balance: 2, .. })
    ));

    unsafe { TestNode::links(root).as_mut().set_balance(0) };
    assert_eq!(tree.verify(), Ok(2));
}

#[repr(C)]
struct DropNode {
    links: Links<DropNode>,
    key: u32,
    drops: Rc<Cell<usize>>,
}

impl Drop for DropNode {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

unsafe impl Linked<Links<DropNode>> for DropNode {
    type Handle = Box<DropNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<DropNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<DropNode>> for DropNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

#[test]
fn clear_and_drop_release_every_node() {
    let drops = Rc::new(Cell::new(0));
    let node = |key| {
        Box::new(DropNode {
            links: Links::new(),
            key,
            drops: drops.clone(),
        })
    };

    let mut tree: AvlTree<DropNode> = AvlTree::new();
    for key in 0..100 {
        tree.insert(node(key % 17));
    }

    tree.clear();
    assert_eq!(drops.get(), 100);
    assert!(tree.is_empty());
    assert_eq!(tree.verify(), Ok(0));

    for key in 0..10 {
        tree.insert(node(key));
    }
    tree.assert_invariants();

    drop(tree);
    assert_eq!(drops.get(), 110);
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn sorted_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_sorted_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..64, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }

    #[test]
    fn balance_factors_match_heights(keys in proptest::collection::vec(any::<u32>(), 0..200)) {
        let tree = tree_of_unchecked(&keys);
        prop_assert_eq!(checked_height(tree.root()), tree.height());
    }
}
