//! HTTP client error types
//!
//! [`ApiError`] is the only error the layers above ever see. Its variants map
//! one-to-one onto what the user can do next: fix input, log in again, retry,
//! or read the server's reason.

use thiserror::Error;

/// Errors surfaced by the resilient API client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Bad local input; nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token refresh failed; the user must authenticate again
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Timeout, network failure, or transient server errors after all retries
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Well-formed rejection from the server, message carried verbatim
    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    /// The server answered with a body that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Durable credential storage failed
    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        ApiError::Connection {
            message: message.into(),
        }
    }

    /// Creates a ServerRejected error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::ServerRejected {
            status,
            message: message.into(),
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ApiError::InvalidResponse(message.into())
    }

    /// Returns true if repeating the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Connection { .. })
    }

    /// Returns true if the authenticated channel is gone
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

/// Failures below the HTTP status level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid request body: {0}")]
    Body(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::connection("request timed out"),
            TransportError::Connect(message) => ApiError::connection(message),
            TransportError::Body(message) => ApiError::Validation(message),
        }
    }
}

/// Durable token storage failures
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<TokenStoreError> for ApiError {
    fn from(err: TokenStoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}
