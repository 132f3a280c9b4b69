//! `MockNode` — a test double for `NodeHandler`.
//!
//! Useful in unit and integration tests where a real handler is either
//! unavailable or irrelevant. Clones share the same call record, so a test
//! can register one clone and inspect the other.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::{HandlerOutput, NodeDescriptor, NodeError, NodeHandler};

/// Behaviour injected into `MockNode` at construction time.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Return separate passthrough and log values.
    ReturnAnnotated { passthrough: Value, log_output: Value },
    /// Return the received inputs as a JSON array (`null` for empty slots).
    EchoInputs,
    /// Fail with the given error.
    Fail(NodeError),
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub inputs: Vec<Option<Value>>,
    pub config: Value,
}

/// A mock handler that records every call it receives and returns a
/// programmer-specified result.
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Type tag this mock registers under.
    pub node_type: String,
    /// What the node will do when `execute` is called.
    pub behaviour: MockBehaviour,
    /// Every call seen by this node (in call order).
    pub calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockNode {
    fn with_behaviour(node_type: impl Into<String>, behaviour: MockBehaviour) -> Self {
        Self {
            node_type: node_type.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always succeeds with the given value.
    pub fn returning(node_type: impl Into<String>, value: Value) -> Self {
        Self::with_behaviour(node_type, MockBehaviour::ReturnValue(value))
    }

    /// Create a mock that forwards `passthrough` and logs `log_output`.
    pub fn annotated(node_type: impl Into<String>, passthrough: Value, log_output: Value) -> Self {
        Self::with_behaviour(
            node_type,
            MockBehaviour::ReturnAnnotated {
                passthrough,
                log_output,
            },
        )
    }

    /// Create a mock that returns its inputs.
    pub fn echoing(node_type: impl Into<String>) -> Self {
        Self::with_behaviour(node_type, MockBehaviour::EchoInputs)
    }

    /// Create a mock that always fails with a `Failed` error.
    pub fn failing(node_type: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_behaviour(node_type, MockBehaviour::Fail(NodeError::Failed(msg.into())))
    }

    /// Number of times this node has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of every recorded call.
    pub fn recorded_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeHandler for MockNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: self.node_type.clone(),
            label: format!("Mock {}", self.node_type),
            description: "Test double".into(),
            category: "Testing".into(),
            default_data: json!({}),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        self.calls.lock().unwrap().push(MockCall {
            inputs: inputs.to_vec(),
            config: config.clone(),
        });

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(HandlerOutput::Plain(v.clone())),
            MockBehaviour::ReturnAnnotated {
                passthrough,
                log_output,
            } => Ok(HandlerOutput::Annotated {
                passthrough: passthrough.clone(),
                log_output: log_output.clone(),
            }),
            MockBehaviour::EchoInputs => Ok(HandlerOutput::Plain(Value::Array(
                inputs
                    .iter()
                    .map(|slot| slot.clone().unwrap_or(Value::Null))
                    .collect(),
            ))),
            MockBehaviour::Fail(err) => Err(err.clone()),
        }
    }
}
