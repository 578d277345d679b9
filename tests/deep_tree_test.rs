//! Tests for degenerate (chain-shaped) trees far deeper than the call stack allows for recursion

use idtree::{Node, Tree};
use rstest::{fixture, rstest};

const DEPTH: i64 = 100_000;

// 0 -> 1 -> 2 -> ... -> DEPTH - 1
#[fixture]
fn chain() -> Tree<i64> {
    let mut tree = Tree::new();
    let mut last = tree.set_root(Node::new(0, 0)).unwrap();
    for id in 1..DEPTH {
        last = tree.get_mut(last).unwrap().attach_child(Node::new(id, id));
    }
    tree
}

fn detached_chain() -> Node<i64> {
    let mut node = Node::new(DEPTH - 1, DEPTH - 1);
    for id in (0..DEPTH - 1).rev() {
        node = Node::new(id, id).with_child(node);
    }
    node
}

// ============================================================
// Attached Chain Tests
// ============================================================

#[rstest]
fn given_deep_chain_when_dumping_then_returns_every_edge(chain: Tree<i64>) {
    let structure = chain.dump_structure().unwrap();

    assert_eq!(structure.len(), DEPTH as usize);
    assert_eq!(structure[0], "(NULL) -> (0)");
    assert_eq!(
        structure.last().unwrap(),
        &format!("({}) -> ({})", DEPTH - 2, DEPTH - 1)
    );
}

#[rstest]
fn given_deep_chain_when_filtering_then_prunes_below_rejected_node(chain: Tree<i64>) {
    let filtered = chain.filter_tree(|&n| n != DEPTH / 2).unwrap();

    assert_eq!(filtered.len(), (DEPTH / 2) as usize);
    assert_eq!(filtered.depth(), (DEPTH / 2) as usize);
    assert!(filtered.find(DEPTH / 2).is_none());
    assert_eq!(chain.len(), DEPTH as usize);
}

#[rstest]
fn given_deep_chain_when_filtering_everything_in_then_copy_is_complete(chain: Tree<i64>) {
    let filtered = chain.filter_tree(|_| true).unwrap();

    assert_eq!(filtered.len(), DEPTH as usize);
    assert_eq!(filtered.leaf_nodes(), vec![DEPTH - 1]);
}

#[rstest]
fn given_deep_chain_when_measuring_then_depth_and_backtrack_match(chain: Tree<i64>) {
    assert_eq!(chain.depth(), DEPTH as usize);
    assert_eq!(chain.backtrack_from(DEPTH - 1).unwrap().len(), DEPTH as usize);
    assert_eq!(chain.iter_postorder().next().map(|n| n.id()), Some(DEPTH - 1));
}

// ============================================================
// Detached Chain Tests
// ============================================================

#[test]
fn given_deep_detached_chain_when_inspecting_and_dropping_then_completes() {
    let node = detached_chain();

    assert_eq!(node.size(), DEPTH as usize);
    assert_eq!(node.dump_structure().len(), DEPTH as usize);
    drop(node);
}

#[test]
fn given_deep_detached_chain_when_set_as_root_then_tree_holds_all_nodes() {
    let mut tree = Tree::new();
    tree.set_root(detached_chain()).unwrap();

    assert_eq!(tree.len(), DEPTH as usize);
    assert_eq!(tree.depth(), DEPTH as usize);
}

#[rstest]
fn given_deep_chain_when_copying_subtree_then_detached_copy_drops_cleanly(chain: Tree<i64>) {
    let copy = chain.root().unwrap().filter_subtree(|_| true).unwrap();

    assert_eq!(copy.size(), DEPTH as usize);
    drop(copy);
}
