//! `slack` — simulated message send; tags every incoming item.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::{now_rfc3339, tag_item};
use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "slack";

#[derive(Debug, Default)]
pub struct SlackNode;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(SlackNode);
}

/// Flatten every input slot into one item list.
fn flatten_inputs(inputs: &[Option<Value>]) -> Vec<Value> {
    let mut items = Vec::new();
    for slot in inputs.iter().flatten() {
        match slot {
            Value::Array(values) => items.extend(values.iter().cloned()),
            other => items.push(other.clone()),
        }
    }
    items
}

#[async_trait]
impl NodeHandler for SlackNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Slack".into(),
            description: "Sends a message to a Slack channel (simulated).".into(),
            category: "Services".into(),
            default_data: json!({
                "label": "Send Message",
                "channel": "#general",
                "message": "Hello from your flow app!",
            }),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let channel = config.get("channel").cloned().unwrap_or(Value::Null);
        let message = config.get("message").cloned().unwrap_or(Value::Null);
        info!(channel = %channel, message = %message, "simulating slack message");

        let sent_at = now_rfc3339();
        let items: Vec<Value> = flatten_inputs(inputs)
            .into_iter()
            .map(|item| {
                tag_item(
                    item,
                    "slack_simulation",
                    json!({
                        "status": "sent_successfully",
                        "channel": channel,
                        "message": message,
                        "sentAt": sent_at,
                    }),
                )
            })
            .collect();

        Ok(HandlerOutput::Plain(Value::Array(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tags_flattened_items() {
        let inputs = [
            Some(json!([{ "json": { "a": 1 } }, { "json": { "a": 2 } }])),
            None,
            Some(json!({ "json": { "a": 3 } })),
        ];
        let config = json!({ "channel": "#ops", "message": "deployed" });
        let (out, _) = SlackNode.execute(&inputs, &config).await.unwrap().into_parts();

        let items = out.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["json"]["a"], 3);
        for item in items {
            assert_eq!(item["slack_simulation"]["status"], "sent_successfully");
            assert_eq!(item["slack_simulation"]["channel"], "#ops");
            assert_eq!(item["slack_simulation"]["message"], "deployed");
        }
    }
}
