//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found (never allocated or already discarded)
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor under its descendant)
    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Operation requires a different node type
    #[error("invalid node type for {0}")]
    InvalidNodeType(NodeId),

    /// Operation not supported in the element's current state
    #[error("invalid state: {0}")]
    InvalidState(String),
}
