//! The `NodeHandler` trait — the contract every node type must fulfil.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NodeError;

/// Library metadata for a node type, plus the data a freshly created node of
/// that type starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Type tag that nodes in a graph use to select this handler.
    pub node_type: String,
    /// Human-readable name shown in the node library.
    pub label: String,
    pub description: String,
    /// Library grouping, e.g. `Triggers` or `Services`.
    pub category: String,
    /// Default `data` payload for a new node of this type.
    pub default_data: Value,
}

/// What a handler hands back to the engine.
///
/// Most handlers produce a single value that is both forwarded to
/// descendants and shown in the run log. Handlers whose log representation
/// differs from what they forward (e.g. a delay that forwards its input but
/// logs how long it waited) return `Annotated`.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    Plain(Value),
    Annotated {
        /// Stored in the output table for descendants.
        passthrough: Value,
        /// Stored in the log entry.
        log_output: Value,
    },
}

impl HandlerOutput {
    /// Split into `(passthrough, log_output)`.
    pub fn into_parts(self) -> (Value, Value) {
        match self {
            HandlerOutput::Plain(value) => (value.clone(), value),
            HandlerOutput::Annotated {
                passthrough,
                log_output,
            } => (passthrough, log_output),
        }
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Plain(value)
    }
}

/// The core handler trait.
///
/// Built-in nodes and externally registered nodes implement this; the engine
/// dispatches through `Arc<dyn NodeHandler>` looked up by node type.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    /// Metadata describing this node type.
    fn descriptor(&self) -> NodeDescriptor;

    /// Execute the node.
    ///
    /// `inputs` holds one slot per incoming edge, in edge order; a slot is
    /// `None` when the upstream node has no recorded output. `config` is the
    /// node's `data` payload.
    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError>;
}
