//! Engine-level error types.

use thiserror::Error;

use nodes::NodeError;

/// Errors produced by the flow engine (validation + execution).
///
/// A cancelled run is not an error; it ends with `RunStatus::Cancelled`.
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Structural validation ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the graph.
    #[error("edge '{edge_id}' references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        edge_id: String,
        node_id: String,
        side: &'static str,
    },

    // ------ Scheduling ------

    /// The reachable subgraph cannot be fully ordered.
    #[error("flow graph contains a cycle involving: {}", excluded.join(", "))]
    Cycle {
        /// Reachable node ids left out of the order, in graph order.
        excluded: Vec<String>,
    },

    // ------ Execution ------

    /// No handler is registered for a node's type.
    #[error("No executor function found for node type: \"{node_type}\"")]
    HandlerNotFound { node_id: String, node_type: String },

    /// A handler failed while executing.
    #[error("{source}")]
    HandlerExecution {
        node_id: String,
        #[source]
        source: NodeError,
    },
}

impl EngineError {
    /// Id of the node this error is attributed to, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::HandlerNotFound { node_id, .. } | Self::HandlerExecution { node_id, .. } => {
                Some(node_id)
            }
            _ => None,
        }
    }
}
