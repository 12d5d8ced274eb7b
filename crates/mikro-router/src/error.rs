//! Error types for routing and dispatch.

use thiserror::Error;

/// Boxed error returned by user callbacks, actions and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A method token outside the recognized set was used.
    #[error("invalid HTTP method [{0}]")]
    InvalidMethod(String),

    /// No route pattern matched the request path.
    #[error("no route matched: {method} {path}")]
    NoRouteMatched { method: String, path: String },

    /// A route modifier was called before any route was registered.
    #[error("no route registered to modify")]
    NoRouteRegistered,

    /// A placeholder fragment could not be compiled.
    #[error("invalid pattern for token {token}: {message}")]
    InvalidPattern { token: String, message: String },

    /// A callback, action or hook failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// A structured body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RouterError {
    /// Wraps an arbitrary error raised from user code.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns true when the error means "nothing to route to".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoRouteMatched { .. })
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
