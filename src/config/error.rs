//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Mailbox capacity must be greater than zero")]
    InvalidMailboxCapacity,

    #[error("Frame size limit must be greater than zero")]
    InvalidFrameLimit,

    #[error("Connection timeouts must be greater than zero")]
    InvalidTimeout,
}
