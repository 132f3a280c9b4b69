//! `start` — the trigger node that seeds a flow with initial data.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "start";

/// Parses the configured `initialJsonData` text and emits it as the flow's
/// first items.
#[derive(Debug, Default)]
pub struct StartNode;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(StartNode);
}

#[async_trait]
impl NodeHandler for StartNode {
    fn descriptor(&self) -> NodeDescriptor {
        // Items are wrapped in `json` so expressions read `{{ $json.message }}`.
        let sample = json!([
            { "json": { "message": "Hello from your new flow!", "runId": "abc-123" } }
        ]);
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Start".into(),
            description: "Triggers the workflow with initial data.".into(),
            category: "Triggers".into(),
            default_data: json!({
                "label": "Start",
                "initialJsonData": serde_json::to_string_pretty(&sample).unwrap_or_default(),
            }),
        }
    }

    async fn execute(
        &self,
        _inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let initial = match config.get("initialJsonData") {
            None | Some(Value::Null) => json!([]),
            Some(Value::String(text)) => serde_json::from_str::<Value>(text).map_err(|err| {
                warn!(error = %err, "invalid JSON in start node");
                NodeError::Config(
                    "Invalid JSON format in Start Node. Please check your syntax.".into(),
                )
            })?,
            Some(other) => other.clone(),
        };

        debug!(initial = %initial, "start node produced initial data");
        Ok(HandlerOutput::Plain(initial))
    }
}
