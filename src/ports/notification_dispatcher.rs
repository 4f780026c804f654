//! NotificationDispatcher port - Interface for payment confirmation messages.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from dispatching a confirmation message.
///
/// Kept distinct from `CallbackError`: a dispatch failure never rolls back
/// an already-persisted payment record and never changes the HTTP outcome,
/// but it must be observable as something other than a verification failure.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The email provider rejected the request.
    #[error("provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Port for sending payment confirmation messages.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends a confirmation for `order_reference` to `recipient`.
    ///
    /// `amount_minor` is in minor currency units; implementations format it
    /// for display (divide by 100) without ever feeding the formatted value
    /// back into storage. `subject` and `sender_label` fall back to the
    /// implementation's defaults when `None`.
    async fn send_confirmation(
        &self,
        recipient: &str,
        order_reference: &str,
        amount_minor: i64,
        subject: Option<&str>,
        sender_label: Option<&str>,
    ) -> Result<(), NotifyError>;
}
