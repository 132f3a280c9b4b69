//! Flow execution engine.
//!
//! `FlowExecutor` is the central orchestrator:
//! 1. Computes the subgraph reachable from the trigger nodes.
//! 2. Orders it topologically (a cycle fails the call before anything runs).
//! 3. Runs nodes strictly one at a time, dispatching each through the
//!    handler registry with the outputs of its upstream nodes as input.
//! 4. Records an output table and a run log, reporting progress to an
//!    [`ExecutionObserver`].
//! 5. Stops at the first failing node (fail-fast) and returns what was
//!    collected so far.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use nodes::{HandlerOutput, HandlerRegistry};

use crate::dag::compute_order;
use crate::log::{LogEntry, RunResult, RunStatus};
use crate::models::{Graph, Node};
use crate::observer::ExecutionObserver;
use crate::reachability::compute_reachable;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Pause after announcing each node, for UI pacing. Zero when headless.
    pub step_delay: Duration,
    /// On a failed or cancelled run, append a `skipped` entry for every
    /// scheduled node that never ran.
    pub record_skipped: bool,
}

// ---------------------------------------------------------------------------
// Per-run state
// ---------------------------------------------------------------------------

/// Output table and log, owned by a single run.
struct RunState<'o> {
    observer: &'o dyn ExecutionObserver,
    outputs: BTreeMap<String, Value>,
    log: Vec<LogEntry>,
}

impl<'o> RunState<'o> {
    fn new(observer: &'o dyn ExecutionObserver) -> Self {
        Self {
            observer,
            outputs: BTreeMap::new(),
            log: Vec::new(),
        }
    }

    fn append(&mut self, entry: LogEntry) {
        self.observer.on_log_entry(&entry);
        self.log.push(entry);
    }

    fn finish(self, status: RunStatus) -> RunResult {
        RunResult {
            status,
            log: self.log,
            outputs: self.outputs,
        }
    }
}

// ---------------------------------------------------------------------------
// FlowExecutor
// ---------------------------------------------------------------------------

/// Runs a flow graph once against a handler registry.
///
/// The executor holds no per-run state, so one instance can serve any number
/// of runs; each run gets its own output table and log.
pub struct FlowExecutor {
    registry: Arc<HandlerRegistry>,
    config: ExecutorConfig,
}

impl FlowExecutor {
    /// Create a new executor.
    pub fn new(registry: Arc<HandlerRegistry>, config: ExecutorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the flow to completion or first failure.
    ///
    /// # Errors
    /// Returns [`EngineError::Cycle`] when the reachable subgraph cannot be
    /// ordered; no handler runs in that case. Handler failures are reported
    /// through the returned [`RunResult`] instead.
    pub async fn run(
        &self,
        graph: &Graph,
        observer: &dyn ExecutionObserver,
    ) -> Result<RunResult, EngineError> {
        self.run_with_cancel(graph, observer, CancellationToken::new())
            .await
    }

    /// Like [`FlowExecutor::run`], stopping early with
    /// [`RunStatus::Cancelled`] once `cancel` fires.
    #[instrument(
        skip_all,
        fields(nodes = graph.nodes.len(), edges = graph.edges.len())
    )]
    pub async fn run_with_cancel(
        &self,
        graph: &Graph,
        observer: &dyn ExecutionObserver,
        cancel: CancellationToken,
    ) -> Result<RunResult, EngineError> {
        // ------------------------------------------------------------------
        // Restrict to what the triggers can reach.
        // ------------------------------------------------------------------
        let reachable = compute_reachable(&graph.nodes, &graph.edges);
        if reachable.trigger_ids.is_empty() {
            info!("no trigger node in flow, nothing to run");
            observer.on_node_start(None);
            return Ok(RunResult::empty());
        }

        // ------------------------------------------------------------------
        // Order the reachable subgraph.
        // ------------------------------------------------------------------
        let order = compute_order(&reachable.nodes, &reachable.edges, &reachable.trigger_ids)
            .map_err(|err| {
                error!(error = %err, "cannot schedule flow");
                err
            })?;
        info!(
            "flow scheduled, executing {} nodes in order: {:?}",
            order.len(),
            order
        );

        let node_map: HashMap<&str, &Node> = reachable
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), *n))
            .collect();
        let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

        let mut state = RunState::new(observer);

        // ------------------------------------------------------------------
        // Execute nodes sequentially.
        // ------------------------------------------------------------------
        for (position, node_id) in order.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(state, &order[position..], &node_map));
            }

            let node = node_map[node_id.as_str()];
            observer.on_node_start(Some(node_id));

            if !self.config.step_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Ok(self.cancelled(state, &order[position..], &node_map));
                    }
                    _ = tokio::time::sleep(self.config.step_delay) => {}
                }
            }

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.execute_node(node, graph, &known, &state.outputs) => Some(result),
            };

            match outcome {
                None => {
                    warn!(node_id = %node_id, "run cancelled while node was executing");
                    return Ok(self.cancelled(state, &order[position..], &node_map));
                }

                Some(Ok(output)) => {
                    let (passthrough, log_output) = output.into_parts();
                    debug!(
                        node_id = %node_id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "node succeeded"
                    );
                    state.outputs.insert(node_id.clone(), passthrough);
                    state.append(LogEntry::success(node, log_output));
                }

                Some(Err(engine_err)) => {
                    let message = engine_err.to_string();
                    error!(node_id = %node_id, label = %node.label(), "node failed: {}", message);

                    observer.on_node_error(node_id, &message);
                    state.append(LogEntry::error(node, message));
                    self.record_skipped(&mut state, &order[position + 1..], &node_map);

                    return Ok(state.finish(RunStatus::Error));
                }
            }
        }

        info!(nodes = order.len(), "flow execution completed successfully");
        observer.on_node_start(None);
        Ok(state.finish(RunStatus::Success))
    }

    // -----------------------------------------------------------------------
    // Internal: resolve, feed and invoke one node's handler.
    // -----------------------------------------------------------------------

    async fn execute_node(
        &self,
        node: &Node,
        graph: &Graph,
        known: &HashSet<&str>,
        outputs: &BTreeMap<String, Value>,
    ) -> Result<HandlerOutput, EngineError> {
        let handler = self
            .registry
            .get(&node.node_type)
            .ok_or_else(|| EngineError::HandlerNotFound {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            })?;

        // One slot per incoming edge; upstream nodes that never ran give `None`.
        let inputs: Vec<Option<Value>> = graph
            .edges
            .iter()
            .filter(|e| e.target == node.id && known.contains(e.source.as_str()))
            .map(|e| outputs.get(&e.source).cloned())
            .collect();

        debug!(
            node_id = %node.id,
            node_type = %node.node_type,
            inputs = inputs.len(),
            "executing node"
        );

        handler
            .execute(&inputs, &node.data)
            .await
            .map_err(|source| EngineError::HandlerExecution {
                node_id: node.id.clone(),
                source,
            })
    }

    fn record_skipped(
        &self,
        state: &mut RunState<'_>,
        remaining: &[String],
        node_map: &HashMap<&str, &Node>,
    ) {
        if !self.config.record_skipped {
            return;
        }
        for node_id in remaining {
            if let Some(node) = node_map.get(node_id.as_str()) {
                state.append(LogEntry::skipped(node));
            }
        }
    }

    fn cancelled(
        &self,
        mut state: RunState<'_>,
        remaining: &[String],
        node_map: &HashMap<&str, &Node>,
    ) -> RunResult {
        info!(remaining = remaining.len(), "flow execution cancelled");
        self.record_skipped(&mut state, remaining, node_map);
        state.observer.on_node_start(None);
        state.finish(RunStatus::Cancelled)
    }
}
