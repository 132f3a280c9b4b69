//! `minitap` — sends an action request to a Minitap server.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{config_str, first_input_items, now_rfc3339, tag_item};
use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "minitap";

#[derive(Debug, Clone)]
pub struct MinitapNode {
    client: reqwest::Client,
}

impl MinitapNode {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn register(registry: &mut HandlerRegistry, client: reqwest::Client) {
    registry.register(MinitapNode::new(client));
}

fn prepare_request(config: &Value) -> Result<(String, Value), NodeError> {
    let url = config_str(config, "minitapUrl").ok_or_else(|| {
        NodeError::Config(
            "Minitap URL is not configured for the Minitap node. Please add it in the Minitap node settings."
                .into(),
        )
    })?;
    let action = config_str(config, "action").ok_or_else(|| {
        NodeError::Config(
            "Action is not configured for the Minitap node. Please add it in the Minitap node settings."
                .into(),
        )
    })?;

    Ok((
        url.to_owned(),
        json!({
            "action": action,
            "expectedOutput": config.get("expectedOutput").cloned().unwrap_or(Value::Null),
        }),
    ))
}

#[async_trait]
impl NodeHandler for MinitapNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Minitap".into(),
            description: "Sends a message to a Minitap server.".into(),
            category: "Services".into(),
            default_data: json!({
                "label": "Minitap",
                "minitapUrl": "",
                "action": "",
                "expectedOutput": "",
            }),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let (url, payload) = prepare_request(config)?;
        info!(url = %url, "sending minitap request");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "failed to send minitap request");
                NodeError::Http(format!(
                    "Network error or issue sending Minitap request: {err}"
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(NodeError::from)?;
        if !status.is_success() {
            return Err(NodeError::Http(format!(
                "Minitap API returned an error: {} - {body}",
                status.as_u16()
            )));
        }

        let sent_at = now_rfc3339();
        let items: Vec<Value> = first_input_items(inputs)
            .into_iter()
            .map(|item| {
                tag_item(
                    item,
                    "minitap",
                    json!({ "status": "success", "response": body, "sentAt": sent_at }),
                )
            })
            .collect();

        Ok(HandlerOutput::Plain(Value::Array(items)))
    }
}
