//! Tree errors (no external dependencies besides thiserror)

use thiserror::Error;

/// Rejections reported by structural tree operations.
///
/// Lookups never produce an error; a missing id is simply `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree already has a root: {existing}")]
    RootAlreadySet { existing: i64 },

    #[error("tree is empty")]
    EmptyTree,

    #[error("parent not found: {0}")]
    ParentNotFound(i64),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
