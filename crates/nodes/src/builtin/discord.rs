//! `discord` — posts a message to a Discord channel webhook.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{config_str, first_input_items, now_rfc3339, tag_item};
use crate::expression::resolve;
use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "discord";

const WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

#[derive(Debug, Clone)]
pub struct DiscordNode {
    client: reqwest::Client,
}

impl DiscordNode {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn register(registry: &mut HandlerRegistry, client: reqwest::Client) {
    registry.register(DiscordNode::new(client));
}

/// Validate the configuration and build the webhook URL and request body.
///
/// `content` is resolved against the first item of the first input.
fn prepare_request(
    inputs: &[Option<Value>],
    config: &Value,
) -> Result<(String, Value), NodeError> {
    let webhook_url = config_str(config, "webhookUrl").ok_or_else(|| {
        NodeError::Config("Webhook URL is not configured for the Discord node.".into())
    })?;
    if !webhook_url.starts_with(WEBHOOK_PREFIX) {
        return Err(NodeError::Config(
            "The provided URL does not look like a valid Discord Webhook URL.".into(),
        ));
    }

    let first_item = inputs
        .first()
        .and_then(Option::as_ref)
        .and_then(|items| items.get(0));
    let content = config.get("content").and_then(Value::as_str).unwrap_or_default();

    Ok((
        webhook_url.to_owned(),
        json!({ "content": resolve(content, first_item) }),
    ))
}

#[async_trait]
impl NodeHandler for DiscordNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Discord".into(),
            description: "Sends a message to a Discord channel.".into(),
            category: "Services".into(),
            default_data: json!({
                "label": "Discord",
                "content": "{{ $json.message }}",
                "webhookUrl": "",
            }),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let (url, payload) = prepare_request(inputs, config)?;
        self.send(&url, &payload, inputs).await
    }
}

impl DiscordNode {
    /// POST `payload` to an already validated webhook and tag the first
    /// input's items with the delivery status.
    async fn send(
        &self,
        url: &str,
        payload: &Value,
        inputs: &[Option<Value>],
    ) -> Result<HandlerOutput, NodeError> {
        info!(payload = %payload, "sending discord message");

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "failed to send discord notification");
                NodeError::Http(format!(
                    "Network error or issue sending Discord notification: {err}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NodeError::Http(format!(
                "Discord API returned an error: {} - {body}",
                status.as_u16()
            )));
        }

        // Discord answers 204 No Content on success.
        let sent_at = now_rfc3339();
        let items: Vec<Value> = first_input_items(inputs)
            .into_iter()
            .map(|item| {
                tag_item(
                    item,
                    "discord",
                    json!({ "status": "success", "sentAt": sent_at }),
                )
            })
            .collect();

        info!(count = items.len(), "discord message sent");
        Ok(HandlerOutput::Plain(Value::Array(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::stub_server::{closed_url, respond_once};

    const URL: &str = "https://discord.com/api/webhooks/123/abc";

    #[test]
    fn content_is_resolved_against_first_item() {
        let inputs = [Some(json!([
            { "json": { "message": "first" } },
            { "json": { "message": "second" } }
        ]))];
        let config = json!({ "webhookUrl": URL, "content": "says: {{ $json.message }}" });
        let (url, payload) = prepare_request(&inputs, &config).unwrap();
        assert_eq!(url, URL);
        assert_eq!(payload, json!({ "content": "says: first" }));
    }

    #[test]
    fn unresolvable_content_is_sent_verbatim() {
        let config = json!({ "webhookUrl": URL, "content": "{{ $json.message }}" });
        let (_, payload) = prepare_request(&[None], &config).unwrap();
        assert_eq!(payload["content"], "{{ $json.message }}");
    }

    #[tokio::test]
    async fn missing_url_fails_before_any_request() {
        let node = DiscordNode::new(reqwest::Client::new());
        let err = node
            .execute(&[], &json!({ "content": "x" }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NodeError::Config("Webhook URL is not configured for the Discord node.".into())
        );
    }

    #[tokio::test]
    async fn foreign_url_is_rejected() {
        let node = DiscordNode::new(reqwest::Client::new());
        let config = json!({ "webhookUrl": "https://example.com/hook", "content": "x" });
        let err = node.execute(&[], &config).await.unwrap_err();
        assert!(matches!(err, NodeError::Config(msg) if msg.contains("valid Discord Webhook URL")));
    }

    #[tokio::test]
    async fn successful_send_tags_every_item() {
        let (url, server) = respond_once("204 No Content", "").await;
        let node = DiscordNode::new(reqwest::Client::new());
        let inputs = [Some(json!([{ "json": { "n": 1 } }, "plain"]))];
        let payload = json!({ "content": "hello" });

        let (out, _) = node.send(&url, &payload, &inputs).await.unwrap().into_parts();

        let sent: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent, payload);
        let items = out.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["json"], json!({ "n": 1 }));
        assert_eq!(items[1]["value"], "plain");
        for item in items {
            assert_eq!(item["discord"]["status"], "success");
            assert!(item["discord"]["sentAt"].is_string());
        }
    }

    #[tokio::test]
    async fn rejected_send_reports_status_and_body() {
        let (url, _server) = respond_once("404 Not Found", "Unknown Webhook").await;
        let node = DiscordNode::new(reqwest::Client::new());

        let err = node
            .send(&url, &json!({ "content": "x" }), &[])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            NodeError::Http("Discord API returned an error: 404 - Unknown Webhook".into())
        );
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_network_error() {
        let node = DiscordNode::new(reqwest::Client::new());
        let err = node
            .send(&closed_url().await, &json!({ "content": "x" }), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Http(msg)
            if msg.starts_with("Network error or issue sending Discord notification: ")));
    }
}
