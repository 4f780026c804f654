//! Izipay REST client.
//!
//! Covers the two server-side calls the checkout flow needs before and
//! after the hosted payment form: creating a form token to embed the
//! payment form, and capturing an authorized transaction.
//!
//! Authentication differs per call: `CreatePayment` uses HTTP Basic with
//! the shop id and REST password, while `Capture` signs the request body
//! with HMAC-SHA256 and sends the base64 digest in a
//! `V2-HMAC-SHA256, Signature=<sig>` authorization header.

use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::GatewayConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::DEFAULT_CURRENCY;

type HmacSha256 = Hmac<Sha256>;

/// Izipay REST API client.
pub struct IzipayClient {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

/// Request for a hosted payment form token.
#[derive(Debug, Clone, Deserialize)]
pub struct FormTokenRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Merchant order reference.
    #[serde(rename = "orderId")]
    pub order_id: String,
    /// Payer email, required by the gateway.
    pub email: String,
}

/// Token the frontend embeds to render the payment form.
#[derive(Debug, Clone, Serialize)]
pub struct FormToken {
    #[serde(rename = "formToken")]
    pub form_token: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Serialize)]
struct CreatePaymentBody<'a> {
    amount: i64,
    currency: &'a str,
    #[serde(rename = "orderId")]
    order_id: &'a str,
    customer: CustomerBody<'a>,
}

#[derive(Serialize)]
struct CustomerBody<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct CreatePaymentResponse {
    status: String,
    answer: Option<CreatePaymentAnswer>,
}

#[derive(Deserialize)]
struct CreatePaymentAnswer {
    #[serde(rename = "formToken")]
    form_token: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

impl IzipayClient {
    /// Creates a client from the gateway configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn gateway_error(message: impl Into<String>) -> DomainError {
        DomainError::new(ErrorCode::ExternalServiceError, message)
    }

    fn create_payment_url(&self) -> String {
        format!("{}/V4/Charge/CreatePayment", self.config.base_url)
    }

    fn capture_url(&self) -> String {
        format!("{}/V4/Charge/Capture", self.config.base_url)
    }

    /// Requests a form token for a pending order.
    ///
    /// # Errors
    ///
    /// `ExternalServiceError` when the gateway is unreachable, answers a
    /// non-success status, or omits the token.
    pub async fn create_form_token(
        &self,
        request: &FormTokenRequest,
    ) -> Result<FormToken, DomainError> {
        let url = self.create_payment_url();
        let body = CreatePaymentBody {
            amount: request.amount,
            currency: DEFAULT_CURRENCY,
            order_id: &request.order_id,
            customer: CustomerBody {
                email: &request.email,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.config.username,
                Some(self.config.password.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::gateway_error(format!("CreatePayment request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "CreatePayment rejected");
            return Err(Self::gateway_error(format!(
                "CreatePayment returned HTTP {}",
                status
            )));
        }

        let parsed: CreatePaymentResponse = response
            .json()
            .await
            .map_err(|e| Self::gateway_error(format!("Invalid CreatePayment response: {}", e)))?;

        if parsed.status != "SUCCESS" {
            let detail = parsed
                .answer
                .and_then(|a| a.error_message)
                .unwrap_or_else(|| parsed.status.clone());
            return Err(Self::gateway_error(format!(
                "CreatePayment answered {}: {}",
                parsed.status, detail
            )));
        }

        let form_token = parsed
            .answer
            .and_then(|a| a.form_token)
            .ok_or_else(|| Self::gateway_error("CreatePayment answer missing formToken"))?;

        Ok(FormToken {
            form_token,
            public_key: self.config.public_key.clone(),
        })
    }

    /// Signs a capture body: base64 of HMAC-SHA256 over the exact JSON bytes.
    fn capture_signature(&self, body: &str) -> Result<String, DomainError> {
        let secret = self.config.capture_secret.as_ref().ok_or_else(|| {
            Self::gateway_error("capture secret not configured")
        })?;

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| Self::gateway_error("invalid capture secret"))?;
        mac.update(body.as_bytes());
        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Captures an authorized transaction by its gateway uuid.
    pub async fn capture_transaction(
        &self,
        transaction_uuid: &str,
    ) -> Result<serde_json::Value, DomainError> {
        let url = self.capture_url();
        // The signature covers the serialized body verbatim, so serialize
        // once and send those exact bytes.
        let body = serde_json::to_string(&serde_json::json!({ "uuid": transaction_uuid }))
            .map_err(|e| Self::gateway_error(format!("Failed to encode capture body: {}", e)))?;
        let signature = self.capture_signature(&body)?;

        let response = self
            .http_client
            .post(&url)
            .header(
                "Authorization",
                format!("V2-HMAC-SHA256, Signature={}", signature),
            )
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Self::gateway_error(format!("Capture request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "Capture rejected");
            return Err(Self::gateway_error(format!(
                "Capture returned HTTP {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Self::gateway_error(format!("Invalid capture response: {}", e)))
    }
}
