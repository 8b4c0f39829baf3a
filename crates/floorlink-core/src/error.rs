//! Centralized error types for Floorlink.

use thiserror::Error;

/// Main error type for Floorlink operations.
#[derive(Error, Debug)]
pub enum FloorError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid mutation kind: {0}")]
    InvalidMutationKind(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid: {0}")]
    TokenInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for Floorlink operations.
pub type FloorResult<T> = Result<T, FloorError>;

impl FloorError {
    /// Create a malformed frame error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFrame(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
