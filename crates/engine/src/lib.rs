//! `engine` crate — graph model, reachability, scheduling, and the flow
//! execution loop.

pub mod dag;
pub mod error;
pub mod executor;
pub mod log;
pub mod models;
pub mod observer;
pub mod reachability;
pub mod runnable;

pub use dag::{compute_order, validate_structure};
pub use error::EngineError;
pub use executor::{ExecutorConfig, FlowExecutor};
pub use log::{LogEntry, LogStatus, RunResult, RunStatus};
pub use models::{Edge, Graph, IdGenerator, Node, SequentialIds, UuidIds, TRIGGER_NODE_TYPE};
pub use observer::{ExecutionEvent, ExecutionObserver, NoopObserver, RecordingObserver};
pub use reachability::{compute_reachable, ReachableSubgraph};
pub use runnable::{execution_order, is_runnable};
