//! Progress reporting hooks for presentation layers.
//!
//! The execution loop calls these synchronously and never inspects their
//! outcome. All methods default to no-ops.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::log::LogEntry;

/// Receives progress signals from a run.
pub trait ExecutionObserver: Send + Sync {
    /// A node is about to execute; `None` signals the run went idle.
    fn on_node_start(&self, _node_id: Option<&str>) {}

    /// A node failed with the given message.
    fn on_node_error(&self, _node_id: &str, _message: &str) {}

    /// A log entry was appended.
    fn on_log_entry(&self, _entry: &LogEntry) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// A progress signal, as captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    NodeStarted { node_id: Option<String> },
    NodeFailed { node_id: String, message: String },
    LogEntry(LogEntry),
}

/// Observer that keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ExecutionEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: ExecutionEvent) {
        self.lock().push(event);
    }
}

impl ExecutionObserver for RecordingObserver {
    fn on_node_start(&self, node_id: Option<&str>) {
        self.push(ExecutionEvent::NodeStarted {
            node_id: node_id.map(str::to_owned),
        });
    }

    fn on_node_error(&self, node_id: &str, message: &str) {
        self.push(ExecutionEvent::NodeFailed {
            node_id: node_id.to_owned(),
            message: message.to_owned(),
        });
    }

    fn on_log_entry(&self, entry: &LogEntry) {
        self.push(ExecutionEvent::LogEntry(entry.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use serde_json::json;

    #[test]
    fn recording_observer_keeps_arrival_order() {
        let observer = RecordingObserver::new();
        let node = Node::new("a", "process", json!({}));

        observer.on_node_start(Some("a"));
        observer.on_node_error("a", "boom");
        observer.on_log_entry(&LogEntry::error(&node, "boom"));
        observer.on_node_start(None);

        let events = observer.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ExecutionEvent::NodeStarted { node_id: Some("a".into()) });
        assert_eq!(
            events[1],
            ExecutionEvent::NodeFailed { node_id: "a".into(), message: "boom".into() }
        );
        assert!(matches!(&events[2], ExecutionEvent::LogEntry(e) if e.node_id == "a"));
        assert_eq!(events[3], ExecutionEvent::NodeStarted { node_id: None });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ExecutionEvent::NodeStarted { node_id: Some("n1".into()) };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({ "type": "node_started", "node_id": "n1" }));
    }
}
