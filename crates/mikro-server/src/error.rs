//! Error types for the HTTP front end.

use std::path::PathBuf;

/// Errors raised while serving connections or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The connection failed at the HTTP layer.
    #[error("HTTP connection error: {0}")]
    Hyper(#[from] hyper::Error),

    /// A finished response could not be turned into a valid HTTP response.
    #[error("Invalid response: {0}")]
    Http(#[from] http::Error),

    /// IO error on the listener or the config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the router config.
    #[error("Failed to parse config file '{path}': {source}")]
    Config {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error.
        source: serde_json::Error,
    },

    /// Route registration failed.
    #[error("Router setup failed: {0}")]
    Router(#[from] mikro_router::RouterError),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
