//! Error types for the session runner.
//!
//! Uses `thiserror` for typed errors that surface through the runner:
//! WebSocket transport, configuration loading, JSON encoding and the
//! simulation itself.

use paprika_core::{ConfigError, CoreError};

/// Errors that can occur during runner operation.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to connect to or communicate with the planner.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration is invalid or unreadable.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The simulation could not be built or advanced.
    #[error("simulation error: {0}")]
    Core(#[from] CoreError),
}
