//! Scheduling over the reachable subgraph, plus an optional structural lint.
//!
//! [`compute_order`] is Kahn's algorithm seeded from the trigger nodes only:
//! an in-degree-zero node that is not a trigger never starts the flow.
//! Ordering is deterministic: seeds in the order given, neighbours in edge
//! order, FIFO frontier.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Edge, Graph, Node};
use crate::EngineError;

/// Order the given nodes so that every edge's source precedes its target.
///
/// `seed_ids` are the trigger nodes the frontier starts from. A seed that
/// itself has incoming edges waits for them like any other node. Edges with
/// an endpoint outside `nodes` are ignored.
///
/// # Errors
/// - [`EngineError::Cycle`] if some nodes could not be ordered; `excluded`
///   lists them in input order.
pub fn compute_order(
    nodes: &[&Node],
    edges: &[&Edge],
    seed_ids: &[String],
) -> Result<Vec<String>, EngineError> {
    let node_set: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    // -----------------------------------------------------------------------
    // Adjacency list and in-degree map, restricted to the given nodes.
    // -----------------------------------------------------------------------
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for node in nodes {
        adjacency.entry(node.id.as_str()).or_default();
        in_degree.entry(node.id.as_str()).or_insert(0);
    }

    for edge in edges {
        if !node_set.contains(edge.source.as_str()) || !node_set.contains(edge.target.as_str()) {
            continue;
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    // -----------------------------------------------------------------------
    // Seed the frontier with the trigger nodes that are ready to run.
    // -----------------------------------------------------------------------
    let mut scheduled: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for seed in seed_ids {
        if let Some(&id) = node_set.get(seed.as_str()) {
            if in_degree.get(id) == Some(&0) && scheduled.insert(id) {
                queue.push_back(id);
            }
        }
    }

    let mut sorted: Vec<String> = Vec::with_capacity(node_set.len());

    while let Some(node_id) = queue.pop_front() {
        sorted.push(node_id.to_owned());

        if let Some(neighbours) = adjacency.get(node_id) {
            for &neighbour in neighbours {
                let deg = in_degree.entry(neighbour).or_insert(0);
                *deg = deg.saturating_sub(1);
                if *deg == 0 && scheduled.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    // If we didn't visit every node, the rest sit on or behind a cycle.
    if sorted.len() != node_set.len() {
        let mut excluded_seen: HashSet<&str> = HashSet::new();
        let excluded = nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !scheduled.contains(id) && excluded_seen.insert(*id))
            .map(str::to_owned)
            .collect();
        return Err(EngineError::Cycle { excluded });
    }

    Ok(sorted)
}

/// Check graph structure: unique node ids and edges that reference existing
/// nodes.
///
/// The engine tolerates both problems at run time (dangling edges are
/// ignored, the first node with a given id wins), so this is for callers that
/// want to reject such graphs up front.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
pub fn validate_structure(graph: &Graph) -> Result<(), EngineError> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    for edge in &graph.edges {
        if !seen_ids.contains(edge.source.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !seen_ids.contains(edge.target.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    Ok(())
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn make_node(id: &str, node_type: &str) -> Node {
        Node::new(id, node_type, Value::Null)
    }

    fn make_edge(source: &str, target: &str) -> Edge {
        Edge::new(format!("{source}->{target}"), source, target)
    }

    fn order(nodes: &[Node], edges: &[Edge], seeds: &[&str]) -> Result<Vec<String>, EngineError> {
        let node_refs: Vec<&Node> = nodes.iter().collect();
        let edge_refs: Vec<&Edge> = edges.iter().collect();
        let seeds: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
        compute_order(&node_refs, &edge_refs, &seeds)
    }

    #[test]
    fn linear_chain_returns_sorted_order() {
        // S → A → B
        let nodes = vec![make_node("b", "mock"), make_node("a", "mock"), make_node("s", "start")];
        let edges = vec![make_edge("a", "b"), make_edge("s", "a")];
        assert_eq!(order(&nodes, &edges, &["s"]).unwrap(), vec!["s", "a", "b"]);
    }

    #[test]
    fn diamond_respects_every_edge() {
        //   S
        //  / \
        // B   C
        //  \ /
        //   D
        let nodes = vec![
            make_node("s", "start"),
            make_node("b", "mock"),
            make_node("c", "mock"),
            make_node("d", "mock"),
        ];
        let edges = vec![
            make_edge("s", "c"),
            make_edge("s", "b"),
            make_edge("b", "d"),
            make_edge("c", "d"),
        ];

        let sorted = order(&nodes, &edges, &["s"]).expect("should be valid");
        // Ties break in edge order: c was connected first.
        assert_eq!(sorted, vec!["s", "c", "b", "d"]);

        let position = |id: &str| sorted.iter().position(|x| x == id).unwrap();
        for edge in &edges {
            assert!(position(edge.source.as_str()) < position(edge.target.as_str()));
        }
    }

    #[test]
    fn zero_in_degree_non_trigger_is_not_seeded() {
        let nodes = vec![make_node("s", "start"), make_node("orphan", "mock")];
        let err = order(&nodes, &[], &["s"]).unwrap_err();
        assert!(matches!(err, EngineError::Cycle { excluded } if excluded == vec!["orphan"]));
    }

    #[test]
    fn cycle_is_detected_with_excluded_ids() {
        // S → A → B → C → A  (cycle!)
        let nodes = vec![
            make_node("s", "start"),
            make_node("a", "mock"),
            make_node("b", "mock"),
            make_node("c", "mock"),
        ];
        let edges = vec![
            make_edge("s", "a"),
            make_edge("a", "b"),
            make_edge("b", "c"),
            make_edge("c", "a"), // back-edge
        ];
        let err = order(&nodes, &edges, &["s"]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Cycle { excluded } if excluded == vec!["a", "b", "c"]
        ));
    }

    #[test]
    fn trigger_with_incoming_edge_waits_its_turn() {
        let nodes = vec![
            make_node("s1", "start"),
            make_node("a", "mock"),
            make_node("s2", "start"),
        ];
        let edges = vec![make_edge("s1", "a"), make_edge("a", "s2")];
        assert_eq!(
            order(&nodes, &edges, &["s1", "s2"]).unwrap(),
            vec!["s1", "a", "s2"]
        );
    }

    #[test]
    fn parallel_edges_do_not_duplicate_nodes() {
        let nodes = vec![make_node("s", "start"), make_node("a", "mock")];
        let edges = vec![make_edge("s", "a"), make_edge("s", "a")];
        assert_eq!(order(&nodes, &edges, &["s"]).unwrap(), vec!["s", "a"]);
    }

    #[test]
    fn single_trigger_no_edges_is_valid() {
        let nodes = vec![make_node("solo", "start")];
        assert_eq!(order(&nodes, &[], &["solo"]).unwrap(), vec!["solo"]);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let graph = Graph::new(vec![make_node("a", "start"), make_node("a", "mock")], vec![]);
        assert!(matches!(
            validate_structure(&graph),
            Err(EngineError::DuplicateNodeId(id)) if id == "a"
        ));
    }

    #[test]
    fn edge_referencing_missing_node_is_rejected() {
        let graph = Graph::new(vec![make_node("a", "start")], vec![make_edge("a", "ghost")]);
        assert!(matches!(
            validate_structure(&graph),
            Err(EngineError::UnknownNodeReference { node_id, side: "target", .. }) if node_id == "ghost"
        ));
    }

    #[test]
    fn well_formed_graph_passes_structure_check() {
        let graph = Graph::new(
            vec![make_node("s", "start"), make_node("a", "mock")],
            vec![make_edge("s", "a")],
        );
        assert!(validate_structure(&graph).is_ok());
    }
}
