use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeRef, Tree as IdTree};

/// Renders a hierarchy as a `termtree` tree, one `"<id>: <payload>"` line per node.
///
/// Building the `termtree` value is iterative; formatting it recurses once
/// per level inside `termtree`.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<'a, T: Display> TreeNodeConvert for NodeRef<'a, T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // Pre-order labels with the child positions of each entry
        let mut labels: Vec<String> = Vec::new();
        let mut children_of: Vec<Vec<usize>> = Vec::new();
        let mut stack: Vec<(NodeRef<'a, T>, Option<usize>)> = vec![(*self, None)];
        while let Some((node, parent_pos)) = stack.pop() {
            let pos = labels.len();
            labels.push(format!("{}: {}", node.id(), node.data()));
            children_of.push(Vec::new());
            if let Some(parent_pos) = parent_pos {
                children_of[parent_pos].push(pos);
            }
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(pos))));
        }

        // Children come after their parent, so build from the back
        let mut built: Vec<Option<Tree<String>>> = (0..labels.len()).map(|_| None).collect();
        for (pos, label) in labels.into_iter().enumerate().rev() {
            let leaves: Vec<Tree<String>> = children_of[pos]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[pos] = Some(Tree::new(label).with_leaves(leaves));
        }

        built
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| Tree::new(format!("{}: {}", self.id(), self.data())))
    }
}

impl<T: Display> TreeNodeConvert for IdTree<T> {
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => root.to_tree_string(),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Node;

    #[test]
    fn test_render_nested_tree() {
        let mut tree = IdTree::new();
        tree.set_root(Node::new(0, "root")).unwrap();
        tree.attach(0, Node::new(1, "left")).unwrap();
        tree.attach(0, Node::new(2, "right")).unwrap();
        tree.attach(1, Node::new(3, "leaf")).unwrap();

        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0: root");
        assert!(lines[1].ends_with("1: left"));
        assert!(lines[2].ends_with("3: leaf"));
        assert!(lines[3].ends_with("2: right"));
    }

    #[test]
    fn test_render_empty_tree() {
        let tree: IdTree<String> = IdTree::new();
        assert_eq!(tree.to_tree_string().to_string().trim_end(), "Empty tree");
    }
}
