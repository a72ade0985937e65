//! Error types for the runner environment

use thiserror::Error;

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Runner error types
///
/// Gameplay operations never produce these; they cover the surfaces around
/// the simulation (protocol, configuration, trajectories, registration).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Agent not registered
    #[error("Agent not registered: {0}")]
    AgentNotRegistered(String),

    /// Action could not be interpreted
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Episode already terminated
    #[error("Episode terminated, call reset")]
    EpisodeTerminated,

    /// Too many agents
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Filesystem or stdio failure
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Protocol error
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        RunnerError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::Io(err.to_string())
    }
}

/// JSON-RPC error codes for the runner server
pub mod error_codes {
    pub const AGENT_NOT_REGISTERED: i32 = -32000;
    pub const INVALID_ACTION: i32 = -32001;
    pub const EPISODE_TERMINATED: i32 = -32002;
    pub const RESOURCE_EXHAUSTED: i32 = -32004;
    pub const INTERNAL_ERROR: i32 = -32603;
}
