//! Axum router configuration for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{
    capture_transaction, generate_form_token, handle_ipn, handle_payment_callback,
    resend_confirmation, PaymentsAppState,
};

/// Create the payments API router.
///
/// # Routes
///
/// ## Gateway Notification Endpoints (no auth, signature verified)
/// - `POST /callback` - Browser-redirected callback, answers JSON
/// - `POST /ipn` - Server-to-server notification, answers plaintext
///
/// ## Checkout Support Endpoints
/// - `POST /formtoken` - Create a hosted payment form token
/// - `POST /capture/:uuid` - Capture an authorized transaction
/// - `POST /confirm` - Manually re-send a confirmation email
///
/// Intended to be mounted at `/api/payments`.
pub fn payment_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/callback", post(handle_payment_callback))
        .route("/ipn", post(handle_ipn))
        .route("/formtoken", post(generate_form_token))
        .route("/capture/:uuid", post(capture_transaction))
        .route("/confirm", post(resend_confirmation))
}
