//! `delay` — pauses the flow, then forwards its first input unchanged.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::{HandlerOutput, HandlerRegistry, NodeDescriptor, NodeError, NodeHandler};

pub const NODE_TYPE: &str = "delay";

#[derive(Debug, Default)]
pub struct DelayNode;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(DelayNode);
}

/// Milliseconds per unit; unknown units count as seconds.
fn unit_millis(unit: Option<&str>) -> f64 {
    match unit {
        Some("minutes") => 60_000.0,
        Some("hours") => 3_600_000.0,
        _ => 1_000.0,
    }
}

/// `delay` may arrive as a number or as numeric text from a form field.
fn delay_amount(config: &Value) -> f64 {
    match config.get("delay") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[async_trait]
impl NodeHandler for DelayNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            node_type: NODE_TYPE.into(),
            label: "Delay".into(),
            description: "Pauses the flow for a specified duration.".into(),
            category: "Utilities".into(),
            default_data: json!({ "label": "Delay", "delay": 1, "unit": "seconds" }),
        }
    }

    async fn execute(
        &self,
        inputs: &[Option<Value>],
        config: &Value,
    ) -> Result<HandlerOutput, NodeError> {
        let amount = delay_amount(config);
        let unit = config.get("unit").and_then(Value::as_str);
        let delay_ms = amount * unit_millis(unit);

        if delay_ms > 0.0 {
            let wait = Duration::try_from_secs_f64(delay_ms / 1000.0).map_err(|_| {
                NodeError::Config(format!("Delay of {delay_ms} ms is too long to wait for."))
            })?;
            info!(delay_ms, "delay node pausing");
            tokio::time::sleep(wait).await;
            info!("delay node resuming");
        }

        Ok(HandlerOutput::Annotated {
            passthrough: inputs.first().cloned().flatten().unwrap_or(Value::Null),
            log_output: Value::String(format!("Waited for {delay_ms} ms")),
        })
    }
}
