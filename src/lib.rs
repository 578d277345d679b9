//! Generic, unbalanced, in-memory tree whose nodes are addressed by
//! caller-supplied integer ids.
//!
//! A [`Tree`] starts empty, receives exactly one root through
//! [`Tree::set_root`] and grows through [`Tree::attach`]. Nodes are never
//! removed or moved. Lookups, backtracking to the root, structure dumps and
//! predicate filtering all go through the id-based search of [`Tree`].
//!
//! ```
//! use idtree::{Node, Tree};
//!
//! let mut tree = Tree::new();
//! tree.set_root(Node::new(0, "root")).unwrap();
//! tree.attach(0, Node::new(1, "child")).unwrap();
//!
//! let path: Vec<_> = tree.backtrack_from(1).unwrap().iter().map(|n| *n.data()).collect();
//! assert_eq!(path, vec!["child", "root"]);
//! assert_eq!(
//!     tree.dump_structure().unwrap(),
//!     vec!["(NULL) -> (0)", "(0) -> (1)"]
//! );
//! ```

pub mod domain;
pub mod tree_traits;
pub mod util;

pub use domain::{Node, NodeId, NodeMut, NodeRef, Tree, TreeError, TreeResult};
