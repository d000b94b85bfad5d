use crate::NodeId;
use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is a text entity and cannot hold children or attributes")]
    NotAContainer(NodeId),

    #[error("The document root cannot be removed")]
    RootRemoval,

    #[error("Node {0} is not attached to a parent")]
    NotAttached(NodeId),

    #[error("Node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("Attaching {node} under {parent} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },
}

impl DomError {
    pub fn cycle(node: NodeId, parent: NodeId) -> Self {
        Self::CycleDetected { node, parent }
    }
}
