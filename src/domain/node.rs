//! Nodes: detached values and cursors into a [`Tree`].
//!
//! Every traversal here uses an explicit stack, so arbitrarily deep trees
//! never exhaust the call stack.

use std::fmt;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{Tree, TreeIterator, TreeNode};

/// Formats one structure edge, `NULL` standing in for a missing parent.
pub(crate) fn edge(parent: Option<i64>, id: i64) -> String {
    match parent {
        Some(parent_id) => format!("({}) -> ({})", parent_id, id),
        None => format!("(NULL) -> ({})", id),
    }
}

/// Handle of a node stored in a [`Tree`].
///
/// Carries the identity of the issuing tree; other trees refuse to resolve
/// it. Clones of a tree share that identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) idx: Index,
}

/// Owned children of a detached node.
///
/// Dropping flattens the subtree onto a heap stack instead of recursing.
#[derive(Debug, Clone, PartialEq)]
struct Children<T>(Vec<Node<T>>);

impl<T> Drop for Children<T> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.0);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children.0);
        }
    }
}

/// Node that is not part of any tree.
///
/// Id and payload are fixed at creation. Children may be attached before the
/// node is handed to [`Tree::set_root`] or [`Tree::attach`], which moves the
/// whole subtree into the tree.
///
/// Dropping, [`Node::size`] and [`Node::dump_structure`] work at any depth.
/// The derived `Clone`, `PartialEq` and `Debug` recurse once per level.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    id: i64,
    data: T,
    children: Children<T>,
}

impl<T> Node<T> {
    pub fn new(id: i64, data: T) -> Self {
        Self {
            id,
            data,
            children: Children(Vec::new()),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn get(&self) -> (i64, &T) {
        (self.id, &self.data)
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children.0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.0.is_empty()
    }

    /// Appends `child` after any existing children.
    pub fn attach_child(&mut self, child: Node<T>) {
        self.children.0.push(child);
    }

    pub fn with_child(mut self, child: Node<T>) -> Self {
        self.attach_child(child);
        self
    }

    /// Number of nodes in this subtree, this node included.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Pre-order edge listing; this node is reported as having no parent.
    pub fn dump_structure(&self) -> Vec<String> {
        let mut structure = Vec::new();
        let mut stack = vec![(self, None)];
        while let Some((node, parent)) = stack.pop() {
            structure.push(edge(parent, node.id));
            // Push children in reverse order for left-to-right traversal
            stack.extend(node.children().iter().rev().map(|child| (child, Some(node.id))));
        }
        structure
    }

    pub(crate) fn into_parts(self) -> (i64, T, Vec<Node<T>>) {
        let Node {
            id,
            data,
            mut children,
        } = self;
        (id, data, std::mem::take(&mut children.0))
    }
}

/// Read-only cursor on a node stored in a [`Tree`].
pub struct NodeRef<'a, T> {
    tree: &'a Tree<T>,
    idx: Index,
    node: &'a TreeNode<T>,
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T> PartialEq for NodeRef<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.idx == other.idx
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for NodeRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.node.id)
            .field("data", &self.node.data)
            .field("parent", &self.parent().map(|p| p.id()))
            .field("children", &self.node.children.len())
            .finish()
    }
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, idx: Index, node: &'a TreeNode<T>) -> Self {
        Self { tree, idx, node }
    }

    pub(crate) fn index(&self) -> Index {
        self.idx
    }

    pub fn node_id(&self) -> NodeId {
        self.tree.handle(self.idx)
    }

    pub fn id(&self) -> i64 {
        self.node.id
    }

    pub fn data(&self) -> &'a T {
        &self.node.data
    }

    pub fn get(&self) -> (i64, &'a T) {
        (self.node.id, &self.node.data)
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.node.parent.and_then(|idx| self.tree.node_ref(idx))
    }

    /// Children in attachment order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, T>> + 'a {
        let tree = self.tree;
        self.node
            .children
            .iter()
            .filter_map(move |&idx| tree.node_ref(idx))
    }

    /// This node and all its descendants, in pre-order.
    pub fn descendants(&self) -> TreeIterator<'a, T> {
        TreeIterator::from_index(self.tree, self.idx)
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.children.is_empty()
    }

    /// Path from this node up to the root, both included.
    #[instrument(level = "trace", skip(self), fields(id = self.node.id))]
    pub fn backtrack(&self) -> Vec<NodeRef<'a, T>> {
        let mut path = vec![*self];
        let mut current = self.parent();
        while let Some(node) = current {
            path.push(node);
            current = node.parent();
        }
        path
    }

    /// Pre-order `"(<parent>) -> (<id>)"` edges for this node and all descendants.
    #[instrument(level = "trace", skip(self), fields(id = self.node.id))]
    pub fn dump_structure(&self) -> Vec<String> {
        self.descendants()
            .map(|node| edge(node.parent().map(|p| p.id()), node.id()))
            .collect()
    }

    /// Detached copy of this subtree keeping only nodes whose whole path from
    /// this node satisfies `predicate`.
    ///
    /// Returns `None` when this node itself is rejected. The predicate sees
    /// nodes in pre-order and never sees descendants of a rejected node.
    #[instrument(level = "trace", skip(self, predicate), fields(id = self.node.id))]
    pub fn filter_subtree<P>(&self, mut predicate: P) -> Option<Node<T>>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        // Copies in pre-order, each with the position of its parent copy
        let mut kept: Vec<(Node<T>, Option<usize>)> = Vec::new();
        let mut stack = vec![(*self, None)];
        while let Some((node, parent_pos)) = stack.pop() {
            if !predicate(node.data()) {
                if parent_pos.is_none() {
                    return None;
                }
                continue;
            }
            let pos = kept.len();
            kept.push((Node::new(node.id(), node.data().clone()), parent_pos));
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(pos))));
        }

        // Descendants sit after their ancestors, so folding from the back
        // completes every child list before its owner is moved.
        while let Some((mut copy, parent_pos)) = kept.pop() {
            copy.children.0.reverse();
            match parent_pos {
                Some(pos) => kept[pos].0.attach_child(copy),
                None => return Some(copy),
            }
        }
        None
    }
}

/// Mutable cursor on a node stored in a [`Tree`].
///
/// Allows payload updates and attaching children; ids and existing links
/// stay fixed.
pub struct NodeMut<'a, T> {
    tree: &'a mut Tree<T>,
    idx: Index,
}

impl<'a, T> NodeMut<'a, T> {
    pub(crate) fn new(tree: &'a mut Tree<T>, idx: Index) -> Self {
        Self { tree, idx }
    }

    pub fn node_id(&self) -> NodeId {
        self.tree.handle(self.idx)
    }

    pub fn id(&self) -> i64 {
        self.tree.node(self.idx).id
    }

    pub fn data(&self) -> &T {
        &self.tree.node(self.idx).data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.tree.node_mut(self.idx).data
    }

    pub fn as_node_ref(&self) -> NodeRef<'_, T> {
        NodeRef::new(self.tree, self.idx, self.tree.node(self.idx))
    }

    /// Links `child` (and any subtree it carries) as the last child of this node.
    pub fn attach_child(&mut self, child: Node<T>) -> NodeId {
        let idx = self.tree.insert_subtree(Some(self.idx), child);
        self.tree.handle(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_node_structure() {
        let node = Node::new(0, "a")
            .with_child(Node::new(1, "b").with_child(Node::new(3, "d")))
            .with_child(Node::new(2, "c"));

        assert_eq!(node.size(), 4);
        assert!(!node.is_leaf());
        assert!(node.children()[1].is_leaf());
        assert_eq!(node.get(), (0, &"a"));
        assert_eq!(
            node.dump_structure(),
            vec!["(NULL) -> (0)", "(0) -> (1)", "(1) -> (3)", "(0) -> (2)"]
        );
    }

    #[test]
    fn test_edge_format() {
        assert_eq!(edge(None, 7), "(NULL) -> (7)");
        assert_eq!(edge(Some(-1), 12), "(-1) -> (12)");
    }

    #[test]
    fn test_into_parts_hands_over_children() {
        let node = Node::new(0, 'r')
            .with_child(Node::new(1, 'a'))
            .with_child(Node::new(2, 'b'));

        let (id, data, children) = node.into_parts();
        assert_eq!((id, data), (0, 'r'));
        let ids: Vec<i64> = children.iter().map(Node::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_filter_subtree_keeps_child_order() {
        let mut tree = Tree::new();
        tree.set_root(Node::new(0, 0)).unwrap();
        for id in 1..=4 {
            tree.attach(0, Node::new(id, id)).unwrap();
        }
        tree.attach(2, Node::new(5, 5)).unwrap();
        tree.attach(2, Node::new(6, 6)).unwrap();

        let copy = tree.root().unwrap().filter_subtree(|&n| n != 3).unwrap();
        assert_eq!(
            copy.dump_structure(),
            vec![
                "(NULL) -> (0)",
                "(0) -> (1)",
                "(0) -> (2)",
                "(2) -> (5)",
                "(2) -> (6)",
                "(0) -> (4)"
            ]
        );
    }

    #[test]
    fn test_node_mut_updates_payload_and_attaches() {
        let mut tree = Tree::new();
        tree.set_root(Node::new(0, 10)).unwrap();

        let mut root = tree.root_mut().unwrap();
        *root.data_mut() += 5;
        let child = root.attach_child(Node::new(1, 20));
        assert_eq!(root.data(), &15);
        assert_eq!(root.as_node_ref().children().count(), 1);

        let child = tree.get(child).unwrap();
        assert_eq!(child.parent().map(|p| p.id()), Some(0));
    }

    #[test]
    fn test_node_ref_equality_is_identity() {
        let mut tree = Tree::new();
        tree.set_root(Node::new(0, "x")).unwrap();
        tree.attach(0, Node::new(1, "x")).unwrap();

        let root = tree.root().unwrap();
        let found = tree.find(0).unwrap();
        let child = tree.find(1).unwrap();
        assert_eq!(root, found);
        assert_ne!(root, child);
    }
}
