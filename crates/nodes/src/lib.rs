//! `nodes` crate — the `NodeHandler` trait, the handler registry, the
//! expression resolver, and the built-in node implementations.
//!
//! Every node type, built-in or externally registered, implements
//! [`NodeHandler`]. The engine crate dispatches execution through the
//! [`HandlerRegistry`] by node type.

pub mod builtin;
pub mod error;
pub mod expression;
pub mod mock;
pub mod registry;
pub mod traits;

pub use error::NodeError;
pub use expression::resolve;
pub use registry::{BuiltinOptions, HandlerRegistry};
pub use traits::{HandlerOutput, NodeDescriptor, NodeHandler};
