//! Server error types.

use std::io;

use menagerie_router::RouteError;
use thiserror::Error;

/// Errors raised while assembling or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address does not parse.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// Binding the listener failed.
    #[error("failed to bind to {addr}")]
    Bind {
        /// Address that could not be bound.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A route could not be registered.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// An action binds a different number of path fields than its pattern
    /// has placeholders.
    #[error(
        "operation {operation} binds {bound} path field(s) but {pattern} has {placeholders} placeholder(s)"
    )]
    PathBinding {
        /// Operation being registered.
        operation: String,
        /// Route pattern.
        pattern: String,
        /// Number of fields the action binds.
        bound: usize,
        /// Number of placeholders in the pattern.
        placeholders: usize,
    },

    /// The mount prefix is not a valid path prefix.
    #[error("invalid mount path '{0}'")]
    InvalidMountPath(String),
}
