//! Error taxonomy for payment notification processing.
//!
//! Verification and parse failures reject the notification before any side
//! effect. Storage failures abort before notification and must surface to
//! the caller as retryable so the gateway redelivers. Notification failures
//! are a separate type (`NotifyError` in the ports module) and never change
//! the processing outcome. Mapping these errors to HTTP status codes is the
//! HTTP adapter's concern, not the domain's.

use thiserror::Error;

use super::answer::ParseError;
use crate::domain::foundation::DomainError;

/// Errors that occur while processing a gateway notification.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// A required body field (`kr-answer`, `kr-hash`) is missing or not a string.
    #[error("missing or invalid field: {0}")]
    MissingField(&'static str),

    /// Signature verification failed. The message stays generic; the
    /// computed digest is never revealed.
    #[error("invalid signature")]
    InvalidSignature,

    /// The answer payload is malformed or structurally unexpected.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persisting the payment record failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl CallbackError {
    /// Returns true if the gateway should retry delivering this notification.
    ///
    /// Only storage failures are transient; a bad signature or malformed
    /// payload will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CallbackError::Storage(_))
    }
}

impl From<DomainError> for CallbackError {
    fn from(err: DomainError) -> Self {
        CallbackError::Storage(err.to_string())
    }
}
