//! Request/response DTOs for payment endpoints.
//!
//! The gateway posts its notification as an urlencoded form whose fields
//! are hyphenated (`kr-answer`, `kr-hash`). Both are optional at the type
//! level so the handler can answer 400 with the missing field named instead
//! of a framework rejection.

use serde::{Deserialize, Serialize};

/// Form body the gateway posts to both the callback and IPN endpoints.
#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    /// Raw JSON answer, signed verbatim. Must never be re-serialized
    /// before verification.
    #[serde(rename = "kr-answer")]
    pub kr_answer: Option<String>,

    /// Hex HMAC-SHA256 digest of `kr-answer`.
    #[serde(rename = "kr-hash")]
    pub kr_hash: Option<String>,

    /// Digest algorithm label sent by the gateway; informational.
    #[serde(rename = "kr-hash-algorithm")]
    pub kr_hash_algorithm: Option<String>,
}

/// JSON acknowledgement for the browser callback channel.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub valid: bool,
    pub status: String,
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub message: String,
}

/// Request to manually re-send a confirmation email.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
}

/// Standard error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
