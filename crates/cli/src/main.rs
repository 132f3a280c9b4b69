//! `flowrun` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`      — execute a flow definition JSON file.
//! - `validate` — check a flow definition without running it.
//! - `nodes`    — list the built-in node library.
//! - `scaffold` — write a sample flow to start from.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use engine::{
    execution_order, is_runnable, validate_structure, ExecutionObserver, ExecutorConfig,
    FlowExecutor, Graph, LogEntry, LogStatus, RunStatus, UuidIds,
};
use nodes::{BuiltinOptions, HandlerRegistry};

#[derive(Parser)]
#[command(
    name = "flowrun",
    about = "Run node-based automation flows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a flow definition JSON file.
    Run {
        /// Path to the flow JSON file.
        path: PathBuf,
        /// Pause before each node, in milliseconds.
        #[arg(long, env = "FLOWRUN_STEP_DELAY_MS", default_value_t = 0)]
        step_delay_ms: u64,
        /// Log nodes that never ran after a failure or cancellation.
        #[arg(long, env = "FLOWRUN_RECORD_SKIPPED")]
        record_skipped: bool,
        /// Timeout for outbound webhook requests, in seconds.
        #[arg(long, env = "FLOWRUN_HTTP_TIMEOUT_SECS", default_value_t = 30)]
        http_timeout_secs: u64,
    },
    /// Validate a flow definition JSON file.
    Validate {
        /// Path to the flow JSON file.
        path: PathBuf,
    },
    /// List the available node types.
    Nodes,
    /// Write a sample start → delay → process flow.
    Scaffold {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Mirrors run progress into the tracing log.
struct LoggingObserver;

impl ExecutionObserver for LoggingObserver {
    fn on_node_start(&self, node_id: Option<&str>) {
        match node_id {
            Some(id) => info!(node_id = %id, "running node"),
            None => info!("run idle"),
        }
    }

    fn on_node_error(&self, node_id: &str, message: &str) {
        error!(node_id = %node_id, "{message}");
    }

    fn on_log_entry(&self, entry: &LogEntry) {
        if entry.status == LogStatus::Skipped {
            warn!(node_id = %entry.node_id, label = %entry.node_label, "node skipped");
        }
    }
}

fn load_flow(path: &Path) -> anyhow::Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid flow JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("engine=info,nodes=info,flowrun=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            path,
            step_delay_ms,
            record_skipped,
            http_timeout_secs,
        } => {
            let graph = load_flow(&path)?;
            let registry = HandlerRegistry::with_builtins(&BuiltinOptions {
                http_timeout: Duration::from_secs(http_timeout_secs),
            });
            let executor = FlowExecutor::new(
                Arc::new(registry),
                ExecutorConfig {
                    step_delay: Duration::from_millis(step_delay_ms),
                    record_skipped,
                },
            );

            let cancel = CancellationToken::new();
            let cancel_clone = cancel.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Cancelling run...");
                cancel_clone.cancel();
            });

            info!("Running flow {}", path.display());
            let result = executor
                .run_with_cancel(&graph, &LoggingObserver, cancel)
                .await
                .context("flow could not be scheduled")?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.status != RunStatus::Success {
                std::process::exit(1);
            }
        }
        Command::Validate { path } => {
            let graph = load_flow(&path)?;

            if let Err(e) = validate_structure(&graph) {
                println!("⚠️  Structural issue: {e}");
            }

            if !is_runnable(&graph.nodes, &graph.edges) {
                match execution_order(&graph.nodes, &graph.edges) {
                    Err(e) => eprintln!("❌ Validation failed: {e}"),
                    Ok(_) => eprintln!("❌ Validation failed: flow has no start node"),
                }
                std::process::exit(1);
            }

            let order = execution_order(&graph.nodes, &graph.edges)?;
            println!("✅ Flow is runnable. Execution order: {order:?}");
        }
        Command::Nodes => {
            let registry = HandlerRegistry::with_builtins(&BuiltinOptions::default());
            for d in registry.descriptors() {
                println!("{:<10} {:<16} {:<16} {}", d.node_type, d.category, d.label, d.description);
            }
        }
        Command::Scaffold { out } => {
            let registry = HandlerRegistry::with_builtins(&BuiltinOptions::default());
            let ids = UuidIds;
            let mut graph = Graph::default();

            let mut previous: Option<String> = None;
            for node_type in ["start", "delay", "process"] {
                let Some(handler) = registry.get(node_type) else {
                    bail!("built-in node type {node_type:?} is not registered");
                };
                let id = graph.add_node(node_type, handler.descriptor().default_data, &ids);
                if let Some(source) = previous.take() {
                    graph.connect(source, id.clone(), &ids);
                }
                previous = Some(id);
            }

            let json = serde_json::to_string_pretty(&graph)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    info!("Sample flow written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
