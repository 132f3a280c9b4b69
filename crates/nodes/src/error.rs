//! Node-level error type.

use thiserror::Error;

/// Errors returned by a handler's `execute` method.
///
/// Every variant is fatal to the run: the engine records the message in an
/// `error` log entry and stops scheduling further nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// The node's own configuration is missing a field or holds a bad value.
    #[error("{0}")]
    Config(String),

    /// Upstream data or a payload could not be interpreted.
    #[error("{0}")]
    InvalidInput(String),

    /// Transport failure or a non-success response from a remote service.
    #[error("{0}")]
    Http(String),

    /// Any other failure raised by the handler's logic.
    #[error("{0}")]
    Failed(String),
}

impl From<reqwest::Error> for NodeError {
    fn from(err: reqwest::Error) -> Self {
        NodeError::Http(err.to_string())
    }
}
