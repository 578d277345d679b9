//! Domain layer: the tree container and its nodes
//!
//! This layer is pure in-memory logic (no I/O, no configuration).

pub mod arena;
pub mod error;
pub mod node;

pub use arena::{PostOrderIterator, Tree, TreeIterator};
pub use error::{TreeError, TreeResult};
pub use node::{Node, NodeId, NodeMut, NodeRef};
