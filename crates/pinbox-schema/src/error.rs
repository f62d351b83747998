use crate::node::NodeId;

/// Errors returned by [`Schema`](crate::Schema) editing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The index path does not address a node.
    #[error("no node at index path {0:?}")]
    InvalidPath(Vec<usize>),
    /// No node carries this id.
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// The operation needs a group or list but the node is a field.
    #[error("node at {0:?} cannot hold children")]
    NotAContainer(Vec<usize>),
    /// The operation needs a sibling position but got the root path.
    #[error("operation needs a non-empty index path")]
    EmptyPath,
    /// The root group cannot be deleted or replaced.
    #[error("the root node cannot be removed")]
    RootImmutable,
}
