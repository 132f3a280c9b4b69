//! Explicit registration table mapping node types to handlers.
//!
//! Handlers are registered at startup; lookups never construct module paths
//! or load anything dynamically. Each built-in module contributes itself via
//! its own `register` function, called from [`HandlerRegistry::with_builtins`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::builtin;
use crate::traits::{NodeDescriptor, NodeHandler};

/// Settings shared by the built-in handlers.
#[derive(Debug, Clone)]
pub struct BuiltinOptions {
    /// Request timeout for handlers that call out to remote webhooks.
    pub http_timeout: Duration,
}

impl Default for BuiltinOptions {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Maps node type tags to handler implementations.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the type tag from its descriptor.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, handler: impl NodeHandler + 'static) {
        self.register_arc(Arc::new(handler));
    }

    /// Register an already shared handler.
    pub fn register_arc(&mut self, handler: Arc<dyn NodeHandler>) {
        let node_type = handler.descriptor().node_type;
        debug!(node_type = %node_type, "registering node handler");
        self.handlers.insert(node_type, handler);
    }

    /// Look up the handler for a node type.
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeHandler>> {
        self.handlers.get(node_type).cloned()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Node library listing, sorted by category then label.
    pub fn descriptors(&self) -> Vec<NodeDescriptor> {
        let mut all: Vec<NodeDescriptor> =
            self.handlers.values().map(|h| h.descriptor()).collect();
        all.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.label.cmp(&b.label))
        });
        all
    }

    /// Create a registry with every built-in node type registered.
    pub fn with_builtins(options: &BuiltinOptions) -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry, options);
        registry
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("types", &types)
            .finish()
    }
}
