//! Claim workflow errors

use thiserror::Error;

use core_kernel::CoreError;
use infra_http::ApiError;

/// Errors surfaced by workflow commands
///
/// A failed command never changes the session; the caller may retry the
/// same command once the cause is addressed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} during {step}")]
    InvalidTransition {
        step: &'static str,
        action: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No claim has been created yet; {0} needs a claim identity")]
    MissingClaimIdentity(&'static str),

    #[error("Submission must be confirmed")]
    ConfirmationRequired,

    #[error("Claim session is closed")]
    SessionClosed,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation(message.into())
    }

    /// True when retrying the same command may succeed without user changes
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Api(err) if err.is_retryable())
    }

    /// True when the farmer must log in again
    pub fn is_session_expired(&self) -> bool {
        matches!(self, WorkflowError::Api(err) if err.is_session_expired())
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => WorkflowError::Validation(msg),
            other => WorkflowError::Validation(other.to_string()),
        }
    }
}
