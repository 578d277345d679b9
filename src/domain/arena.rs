use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{Node, NodeId, NodeMut, NodeRef};

// Source of per-tree identities stamped into `NodeId`s
static NEXT_TREE_TAG: AtomicU64 = AtomicU64::new(0);

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<T> {
    /// Caller supplied identifier, not checked for uniqueness
    pub(crate) id: i64,
    pub(crate) data: T,
    /// Index of parent node in the arena, None for the root
    pub(crate) parent: Option<Index>,
    /// Indices of child nodes in the arena, in attachment order
    pub(crate) children: Vec<Index>,
}

/// Arena-based tree with a single root and id-addressed nodes.
///
/// The tree owns every node reachable from its root. Parent links are plain
/// arena indices used for upward traversal only. Nodes are never removed, so
/// an index handed out stays valid for the lifetime of the tree.
///
/// Id lookups are a pre-order depth-first search from the root; with
/// duplicate ids the first node in pre-order wins.
///
/// `Display` prints the structure dump, one edge per line in pre-order;
/// empty trees print nothing.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    /// Identity checked when resolving a `NodeId`; shared by clones
    tag: u64,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            tag: NEXT_TREE_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Adopts `node` (with any children it carries) as root.
    ///
    /// Fails without touching the tree if a root is already set.
    #[instrument(level = "debug", skip(self, node), fields(id = node.id()))]
    pub fn set_root(&mut self, node: Node<T>) -> TreeResult<NodeId> {
        if let Some(root) = self.root {
            let existing = self.node(root).id;
            debug!(existing, "Rejecting root, tree already has one");
            return Err(TreeError::RootAlreadySet { existing });
        }

        let idx = self.insert_subtree(None, node);
        self.root = Some(idx);
        Ok(self.handle(idx))
    }

    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.and_then(|idx| self.node_ref(idx))
    }

    pub fn root_mut(&mut self) -> Option<NodeMut<'_, T>> {
        let idx = self.root?;
        Some(NodeMut::new(self, idx))
    }

    /// Links `node` as last child of the first node with id `parent_id`.
    #[instrument(level = "debug", skip(self, node), fields(id = node.id()))]
    pub fn attach(&mut self, parent_id: i64, node: Node<T>) -> TreeResult<NodeId> {
        if self.root.is_none() {
            debug!("Rejecting attach, tree is empty");
            return Err(TreeError::EmptyTree);
        }

        let parent = self.find_index(parent_id).ok_or_else(|| {
            debug!(parent_id, "Rejecting attach, parent not found");
            TreeError::ParentNotFound(parent_id)
        })?;

        let idx = self.insert_subtree(Some(parent), node);
        Ok(self.handle(idx))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, id: i64) -> Option<NodeRef<'_, T>> {
        self.iter().find(|node| node.id() == id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_mut(&mut self, id: i64) -> Option<NodeMut<'_, T>> {
        let idx = self.find_index(id)?;
        Some(NodeMut::new(self, idx))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }

    /// Resolves a handle returned by [`Tree::set_root`] or [`Tree::attach`].
    ///
    /// Handles issued by another tree resolve to `None`.
    pub fn get(&self, node_id: NodeId) -> Option<NodeRef<'_, T>> {
        if node_id.tree != self.tag {
            return None;
        }
        self.node_ref(node_id.idx)
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Option<NodeMut<'_, T>> {
        if node_id.tree != self.tag {
            return None;
        }
        self.arena.get(node_id.idx)?;
        Some(NodeMut::new(self, node_id.idx))
    }

    /// Path from the node with id `id` up to the root.
    #[instrument(level = "debug", skip(self))]
    pub fn backtrack_from(&self, id: i64) -> Option<Vec<NodeRef<'_, T>>> {
        self.find(id).map(|node| node.backtrack())
    }

    /// Pre-order edge listing of the whole tree, `None` when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn dump_structure(&self) -> Option<Vec<String>> {
        self.root().map(|root| root.dump_structure())
    }

    /// Independent copy holding only nodes whose whole root path satisfies
    /// `predicate`.
    ///
    /// `None` when the tree is empty or the root itself is rejected.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn filter_tree<P>(&self, predicate: P) -> Option<Tree<T>>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        let root = self.root()?.filter_subtree(predicate)?;
        let mut filtered = Tree::new();
        filtered.set_root(root).ok()?;
        debug!(kept = filtered.len(), of = self.len(), "Filtered tree");
        Some(filtered)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Number of levels; a lone root has depth 1, an empty tree 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((node_idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in &self.node(node_idx).children {
                stack.push((child, depth + 1));
            }
        }

        max_depth
    }

    /// Ids of all leaf nodes, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<i64> {
        self.iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.id())
            .collect()
    }

    /// One backtrack path per leaf, leaves in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn branches(&self) -> Vec<Vec<NodeRef<'_, T>>> {
        self.iter()
            .filter(|node| node.is_leaf())
            .map(|leaf| leaf.backtrack())
            .collect()
    }

    pub(crate) fn handle(&self, idx: Index) -> NodeId {
        NodeId { tree: self.tag, idx }
    }

    pub(crate) fn node_ref(&self, idx: Index) -> Option<NodeRef<'_, T>> {
        self.arena
            .get(idx)
            .map(|node| NodeRef::new(self, idx, node))
    }

    // Indices handed out by this tree are never invalidated.
    pub(crate) fn node(&self, idx: Index) -> &TreeNode<T> {
        &self.arena[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: Index) -> &mut TreeNode<T> {
        &mut self.arena[idx]
    }

    fn find_index(&self, id: i64) -> Option<Index> {
        self.find(id).map(|node| node.index())
    }

    /// Moves a detached subtree into the arena below `parent`, returning the
    /// index of its top node.
    #[instrument(level = "trace", skip(self, node), fields(id = node.id()))]
    pub(crate) fn insert_subtree(&mut self, parent: Option<Index>, node: Node<T>) -> Index {
        let (id, data, children) = node.into_parts();
        let top = self.insert_node(id, data, parent);

        // Children pushed in reverse so they are inserted left to right
        let mut stack: Vec<(Node<T>, Index)> =
            children.into_iter().rev().map(|child| (child, top)).collect();
        while let Some((current, parent_idx)) = stack.pop() {
            let (id, data, children) = current.into_parts();
            let idx = self.insert_node(id, data, Some(parent_idx));
            stack.extend(children.into_iter().rev().map(|child| (child, idx)));
        }

        top
    }

    fn insert_node(&mut self, id: i64, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            id,
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
                trace!(parent = parent.id, id, "Attached node");
            }
        }

        node_idx
    }
}

impl<T> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(structure) = self.dump_structure() {
            write!(f, "{}", structure.join("\n"))?;
        }
        Ok(())
    }
}

pub struct TreeIterator<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root {
            stack.push(root);
        }
        Self { tree, stack }
    }

    /// Pre-order walk of the subtree rooted at `start`.
    pub(crate) fn from_index(tree: &'a Tree<T>, start: Index) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.tree.node_ref(current_idx)?;
        // Push children in reverse order for left-to-right traversal
        for &child in self.tree.node(current_idx).children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

pub struct PostOrderIterator<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if visited {
                return self.tree.node_ref(current_idx);
            }
            self.stack.push((current_idx, true));
            for &child in self.tree.node(current_idx).children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
