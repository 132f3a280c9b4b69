//! `process` — generic transform that stamps each parent output.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{into_fields, now_rfc3339};
use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "process";

#[derive(Debug, Default)]
pub struct ProcessNode;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(ProcessNode);
}

#[async_trait]
impl NodeHandler for ProcessNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Process Node".into(),
            description: "A generic node for custom processing.".into(),
            category: "Custom".into(),
            default_data: json!({ "label": "Process", "configValue": "Default Value" }),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let config_value = config.get("configValue").cloned().unwrap_or(Value::Null);
        let timestamp = now_rfc3339();

        let processed: Vec<Value> = inputs
            .iter()
            .map(|slot| {
                let mut fields = into_fields(slot.clone().unwrap_or(Value::Null));
                fields.insert("processed".into(), Value::Bool(true));
                fields.insert("configValueUsed".into(), config_value.clone());
                fields.insert("timestamp".into(), Value::String(timestamp.clone()));
                Value::Object(fields)
            })
            .collect();

        debug!(count = processed.len(), "process node transformed inputs");
        Ok(HandlerOutput::Plain(Value::Array(processed)))
    }
}
