//! Network construction errors.

use thiserror::Error;

use dnl_core::{DestinationId, DnlError, NodeId, OriginId};
use dnl_link::LinkError;
use dnl_node::NodeError;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("{node}: {source}")]
    Node {
        node:   NodeId,
        #[source]
        source: NodeError,
    },

    #[error("origin {node} must feed a connector")]
    OriginWithoutConnector { node: NodeId },

    #[error("{0} is attached to more than one node")]
    DuplicateOrigin(OriginId),

    #[error("{0} is attached to more than one node")]
    DuplicateDestination(DestinationId),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Core(#[from] DnlError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
