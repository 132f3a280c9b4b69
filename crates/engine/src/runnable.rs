//! Side-effect-free checks a caller can use before starting a run.

use crate::dag::compute_order;
use crate::models::{Edge, Node};
use crate::reachability::compute_reachable;
use crate::EngineError;

/// Whether `run` would get past scheduling for this graph.
///
/// `false` when there are no nodes, no trigger node, or the reachable
/// subgraph contains a cycle.
pub fn is_runnable(nodes: &[Node], edges: &[Edge]) -> bool {
    if nodes.is_empty() || !nodes.iter().any(Node::is_trigger) {
        return false;
    }
    execution_order(nodes, edges).is_ok()
}

/// The order `run` would execute nodes in. Empty when there is no trigger.
///
/// # Errors
/// - [`EngineError::Cycle`] if the reachable subgraph cannot be ordered.
pub fn execution_order(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>, EngineError> {
    let reachable = compute_reachable(nodes, edges);
    if reachable.trigger_ids.is_empty() {
        return Ok(Vec::new());
    }
    compute_order(&reachable.nodes, &reachable.edges, &reachable.trigger_ids)
}
