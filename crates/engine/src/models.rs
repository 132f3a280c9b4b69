//! Core graph model for the flow engine.
//!
//! These types are the caller-facing shape of a flow: the same JSON the
//! editor saves (`{ "nodes": [...], "edges": [...] }`) deserializes straight
//! into a [`Graph`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::observer::ExecutionEvent;

/// Node type that marks a flow entry point.
pub const TRIGGER_NODE_TYPE: &str = "start";

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single step in the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier within the graph (referenced by edges).
    pub id: String,
    /// Selects the registered handler.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Opaque configuration handed to the handler.
    #[serde(default)]
    pub data: Value,
    /// Progress flag for presentation layers. Never read by the scheduler.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_running: bool,
    /// Last failure message for presentation layers. Never read by the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data,
            is_running: false,
            error: None,
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.node_type == TRIGGER_NODE_TYPE
    }

    /// `data.label` when it is a non-empty string, otherwise the node type.
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.node_type)
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Source of fresh node and edge ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Random ids: `<prefix>-<uuid v4>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4())
    }
}

/// Deterministic ids: `<prefix>-1`, `<prefix>-2`, ... from a per-instance counter.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// The nodes and edges supplied for one execution request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Append a node with a generated id and return that id.
    pub fn add_node(
        &mut self,
        node_type: impl Into<String>,
        data: Value,
        ids: &dyn IdGenerator,
    ) -> String {
        let node_type = node_type.into();
        let id = ids.next_id(&node_type);
        self.nodes.push(Node::new(id.clone(), node_type, data));
        id
    }

    /// Append an edge with a generated id and return that id.
    pub fn connect(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        ids: &dyn IdGenerator,
    ) -> String {
        let id = ids.next_id("edge");
        self.edges.push(Edge::new(id.clone(), source, target));
        id
    }

    /// Reflect a progress event in the nodes' transient status fields.
    pub fn apply_event(&mut self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::NodeStarted { node_id } => {
                for node in &mut self.nodes {
                    let started = node_id.as_deref() == Some(node.id.as_str());
                    node.is_running = started;
                    if started {
                        node.error = None;
                    }
                }
            }
            ExecutionEvent::NodeFailed { node_id, message } => {
                for node in self.nodes.iter_mut().filter(|n| &n.id == node_id) {
                    node.is_running = false;
                    node.error = Some(message.clone());
                }
            }
            ExecutionEvent::LogEntry(_) => {}
        }
    }

    /// Clear every node's transient status fields.
    pub fn reset_status(&mut self) {
        for node in &mut self.nodes {
            node.is_running = false;
            node.error = None;
        }
    }
}
