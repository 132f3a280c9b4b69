//! Forward reachability from trigger nodes.
//!
//! Only the part of the graph reachable from a `start` node takes part in a
//! run. Anything else, including in-degree-zero islands, is left out.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Edge, Node};

/// Borrowed view of the nodes and edges reachable from the trigger nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReachableSubgraph<'a> {
    /// Reachable nodes in graph order (first occurrence of each id).
    pub nodes: Vec<&'a Node>,
    /// Edges whose endpoints are both reachable, in graph order.
    pub edges: Vec<&'a Edge>,
    /// Ids of the reachable trigger nodes, in graph order.
    pub trigger_ids: Vec<String>,
}

impl ReachableSubgraph<'_> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == node_id)
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Compute the subgraph reachable by forward BFS from every trigger node.
///
/// Edges with an unknown endpoint are ignored. Without any trigger node the
/// result is empty.
pub fn compute_reachable<'a>(nodes: &'a [Node], edges: &'a [Edge]) -> ReachableSubgraph<'a> {
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let is_known = |edge: &Edge| {
        known.contains(edge.source.as_str()) && known.contains(edge.target.as_str())
    };

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges.iter().filter(|e| is_known(*e)) {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    // Seed with every trigger, then walk forward.
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for node in nodes.iter().filter(|n| n.is_trigger()) {
        if visited.insert(node.id.as_str()) {
            queue.push_back(node.id.as_str());
        }
    }

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(current).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let reachable_nodes: Vec<&Node> = nodes
        .iter()
        .filter(|n| visited.contains(n.id.as_str()) && seen.insert(n.id.as_str()))
        .collect();

    let reachable_edges: Vec<&Edge> = edges
        .iter()
        .filter(|e| is_known(*e) && visited.contains(e.source.as_str()))
        .collect();

    let trigger_ids = reachable_nodes
        .iter()
        .filter(|n| n.is_trigger())
        .map(|n| n.id.clone())
        .collect();

    ReachableSubgraph {
        nodes: reachable_nodes,
        edges: reachable_edges,
        trigger_ids,
    }
}
