//! Core error types used across the client

use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A value from the backend or the farmer failed a domain rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Settings could not be loaded or are out of range
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
