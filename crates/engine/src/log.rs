//! Run log and run result types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Node;

/// Outcome of one attempted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
    /// The node was scheduled but never ran because the run stopped early.
    Skipped,
}

/// One append-only record in a run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub node_id: String,
    pub node_label: String,
    pub status: LogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    fn for_node(node: &Node, status: LogStatus) -> Self {
        Self {
            node_id: node.id.clone(),
            node_label: node.label().to_owned(),
            status,
            output: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn success(node: &Node, output: Value) -> Self {
        Self {
            output: Some(output),
            ..Self::for_node(node, LogStatus::Success)
        }
    }

    pub fn error(node: &Node, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::for_node(node, LogStatus::Error)
        }
    }

    pub fn skipped(node: &Node) -> Self {
        Self::for_node(node, LogStatus::Skipped)
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
    Cancelled,
}

/// Everything a caller gets back from a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,
    pub log: Vec<LogEntry>,
    /// Output table: node id → value forwarded to descendants.
    pub outputs: BTreeMap<String, Value>,
}

impl RunResult {
    /// A successful run that executed nothing.
    pub fn empty() -> Self {
        Self {
            status: RunStatus::Success,
            log: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// The log entry of the node that failed the run, if any.
    pub fn failure(&self) -> Option<&LogEntry> {
        self.log.iter().find(|e| e.status == LogStatus::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_serialize_camel_case() {
        let node = Node::new("n1", "delay", json!({ "label": "Wait" }));
        let value = serde_json::to_value(LogEntry::success(&node, json!("Waited for 0 ms"))).unwrap();
        assert_eq!(value["nodeId"], "n1");
        assert_eq!(value["nodeLabel"], "Wait");
        assert_eq!(value["status"], "success");
        assert_eq!(value["output"], "Waited for 0 ms");
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn failure_finds_error_entry() {
        let a = Node::new("a", "start", json!({}));
        let b = Node::new("b", "process", json!({}));
        let result = RunResult {
            status: RunStatus::Error,
            log: vec![
                LogEntry::success(&a, json!([])),
                LogEntry::error(&b, "bad config"),
                LogEntry::skipped(&b),
            ],
            outputs: BTreeMap::new(),
        };
        let failed = result.failure().unwrap();
        assert_eq!(failed.node_id, "b");
        assert_eq!(failed.error.as_deref(), Some("bad config"));
        assert!(!result.is_success());
        assert!(RunResult::empty().failure().is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RunStatus::Cancelled).unwrap(), json!("cancelled"));
        assert_eq!(serde_json::to_value(LogStatus::Skipped).unwrap(), json!("skipped"));
    }
}
