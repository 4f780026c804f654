//! HTTP handlers for payment endpoints.
//!
//! The two notification handlers differ only in the processing channel and
//! the acknowledgement shape: the browser callback answers JSON, the IPN
//! answers the literal plaintext `OK! OrderStatus is <status>` the gateway
//! expects before it stops retrying.

use std::sync::Arc;

use axum::extract::{Form, Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::gateway::{FormTokenRequest, IzipayClient};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{CallbackChannel, CallbackError, CallbackOutcome, CallbackProcessor};
use crate::ports::{NotificationDispatcher, NotifyError};

use super::dto::{CallbackForm, CallbackResponse, ConfirmRequest, ErrorResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for payment handlers.
///
/// Cloned per request; dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub processor: Arc<CallbackProcessor>,
    pub gateway: Arc<IzipayClient>,
    pub mailer: Arc<dyn NotificationDispatcher>,
}

fn extract_notification(form: &CallbackForm) -> Result<(&str, &str), CallbackError> {
    let answer = form
        .kr_answer
        .as_deref()
        .ok_or(CallbackError::MissingField("kr-answer"))?;
    let hash = form
        .kr_hash
        .as_deref()
        .ok_or(CallbackError::MissingField("kr-hash"))?;
    Ok((answer, hash))
}

// ════════════════════════════════════════════════════════════════════════════════
// Notification Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/callback - Browser-redirected gateway callback
pub async fn handle_payment_callback(
    State(state): State<PaymentsAppState>,
    Form(form): Form<CallbackForm>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let (answer, hash) = extract_notification(&form)?;

    let outcome = state
        .processor
        .process(CallbackChannel::Checkout, answer, hash)
        .await?;

    Ok(Json(callback_response(outcome)))
}

/// POST /api/payments/ipn - Server-to-server instant payment notification
///
/// The gateway treats anything other than a 2xx with this exact body shape
/// as a failed delivery and retries.
pub async fn handle_ipn(
    State(state): State<PaymentsAppState>,
    Form(form): Form<CallbackForm>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let (answer, hash) = extract_notification(&form)?;

    let outcome = state
        .processor
        .process(CallbackChannel::Ipn, answer, hash)
        .await?;

    Ok((
        StatusCode::OK,
        format!("OK! OrderStatus is {}", outcome.status),
    ))
}

fn callback_response(outcome: CallbackOutcome) -> CallbackResponse {
    let message = if outcome.recorded {
        "payment recorded"
    } else {
        "notification acknowledged"
    };
    CallbackResponse {
        valid: true,
        status: outcome.status,
        order_id: outcome.order_reference,
        message: message.to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout Support Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/formtoken - Create a hosted payment form token
pub async fn generate_form_token(
    State(state): State<PaymentsAppState>,
    Json(request): Json<FormTokenRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    if request.email.is_empty() {
        return Err(PaymentsApiError::Gateway(DomainError::validation(
            "email",
            "email is required",
        )));
    }
    if request.amount <= 0 {
        return Err(PaymentsApiError::Gateway(DomainError::validation(
            "amount",
            "amount must be positive",
        )));
    }

    let token = state.gateway.create_form_token(&request).await?;
    Ok(Json(token))
}

/// POST /api/payments/capture/:uuid - Capture an authorized transaction
pub async fn capture_transaction(
    State(state): State<PaymentsAppState>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let answer = state.gateway.capture_transaction(&uuid).await?;
    Ok(Json(answer))
}

/// POST /api/payments/confirm - Manually re-send a confirmation email
pub async fn resend_confirmation(
    State(state): State<PaymentsAppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    state
        .mailer
        .send_confirmation(&request.email, &request.order_id, request.amount, None, None)
        .await?;
    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts processing errors to HTTP responses.
///
/// Response messages stay generic: a caller probing signatures learns only
/// that verification failed, never which byte differed.
#[derive(Debug)]
pub enum PaymentsApiError {
    Callback(CallbackError),
    Gateway(DomainError),
    Notify(NotifyError),
}

impl From<CallbackError> for PaymentsApiError {
    fn from(err: CallbackError) -> Self {
        Self::Callback(err)
    }
}

impl From<DomainError> for PaymentsApiError {
    fn from(err: DomainError) -> Self {
        Self::Gateway(err)
    }
}

impl From<NotifyError> for PaymentsApiError {
    fn from(err: NotifyError) -> Self {
        Self::Notify(err)
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match &self {
            PaymentsApiError::Callback(err) => {
                // 4xx marks the notification unprocessable; 5xx leaves it
                // unacknowledged so the gateway retries delivery.
                let (status, code) = match err {
                    CallbackError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
                    CallbackError::InvalidSignature => {
                        (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
                    }
                    CallbackError::Parse(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD"),
                    CallbackError::Storage(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
                    }
                };
                let message = match err {
                    // Internal detail stays in the logs.
                    CallbackError::Storage(_) => "failed to record payment".to_string(),
                    other => other.to_string(),
                };
                (status, code, message)
            }
            PaymentsApiError::Gateway(err) => {
                let (status, code) = match err.code {
                    ErrorCode::ValidationFailed | ErrorCode::InvalidFormat => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
                    }
                    ErrorCode::ExternalServiceError => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
                };
                (status, code, err.message.clone())
            }
            PaymentsApiError::Notify(err) => (
                StatusCode::BAD_GATEWAY,
                "EMAIL_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "payment endpoint error");
        }

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn extract_notification_requires_answer() {
        let form = CallbackForm {
            kr_answer: None,
            kr_hash: Some("abc".to_string()),
            kr_hash_algorithm: None,
        };
        let err = extract_notification(&form).unwrap_err();
        assert!(matches!(err, CallbackError::MissingField("kr-answer")));
    }

    #[test]
    fn extract_notification_requires_hash() {
        let form = CallbackForm {
            kr_answer: Some("{}".to_string()),
            kr_hash: None,
            kr_hash_algorithm: None,
        };
        let err = extract_notification(&form).unwrap_err();
        assert!(matches!(err, CallbackError::MissingField("kr-hash")));
    }

    #[tokio::test]
    async fn signature_failure_maps_to_unauthorized_with_generic_body() {
        let response =
            PaymentsApiError::Callback(CallbackError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "INVALID_SIGNATURE");
        assert_eq!(json["message"], "invalid signature");
    }

    #[tokio::test]
    async fn storage_failure_maps_to_5xx_without_internal_detail() {
        let err = CallbackError::Storage("connection to 10.0.0.5 refused".to_string());
        let response = PaymentsApiError::Callback(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "STORAGE_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn unparseable_and_incomplete_payloads_map_to_bad_request() {
        use crate::domain::payment::ParseError;

        let parse = PaymentsApiError::Callback(CallbackError::Parse(ParseError::UnexpectedShape))
            .into_response();
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let missing = PaymentsApiError::Callback(CallbackError::MissingField("kr-answer"))
            .into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_retryable_errors_map_to_server_errors() {
        let retryable = CallbackError::Storage("db down".to_string());
        assert!(retryable.is_retryable());
        let response = PaymentsApiError::Callback(retryable).into_response();
        assert!(response.status().is_server_error());

        let terminal = CallbackError::InvalidSignature;
        assert!(!terminal.is_retryable());
        let response = PaymentsApiError::Callback(terminal).into_response();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn external_service_error_maps_to_bad_gateway() {
        let err = DomainError::new(ErrorCode::ExternalServiceError, "gateway down");
        let response = PaymentsApiError::Gateway(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn callback_response_reflects_recorded_flag() {
        let recorded = callback_response(CallbackOutcome {
            status: "PAID".to_string(),
            order_reference: Some("ORD-1".to_string()),
            transaction_id: Some("T-1".to_string()),
            recorded: true,
        });
        assert_eq!(recorded.message, "payment recorded");

        let acknowledged = callback_response(CallbackOutcome {
            status: "REFUSED".to_string(),
            order_reference: None,
            transaction_id: None,
            recorded: false,
        });
        assert!(acknowledged.valid);
        assert_eq!(acknowledged.message, "notification acknowledged");
    }
}
