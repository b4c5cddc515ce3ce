//! Error types for the deployd service

use thiserror::Error;

/// Main error type for the deployd service
#[derive(Error, Debug)]
pub enum DeploydError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Referenced deployment, file, container or image is absent
    #[error("{0}")]
    NotFound(String),

    /// Name collision on create
    #[error("{0}")]
    Conflict(String),

    /// Malformed request content, including invalid compose definitions
    #[error("{0}")]
    InvalidInput(String),

    /// An external process could not be launched or exited non-zero
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The container runtime daemon reported a failure
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Operation is illegal for the current state of the target
    #[error("{0}")]
    Forbidden(String),

    /// A persisted deployment is missing an artifact or holds unreadable data
    #[error("Corrupt deployment: {0}")]
    Corrupt(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for DeploydError {
    fn from(err: tokio::task::JoinError) -> Self {
        DeploydError::Internal(err.to_string())
    }
}
