//! Brevo transactional email implementation of NotificationDispatcher.
//!
//! Sends payment confirmations through the Brevo (ex Sendinblue) SMTP API.
//! The API key travels in the `api-key` header and is held as a
//! `SecretString` so it never reaches logs.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::ports::{NotificationDispatcher, NotifyError};

const BREVO_SMTP_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";
const DEFAULT_SUBJECT: &str = "Payment confirmation";

/// Brevo implementation of the NotificationDispatcher port.
pub struct BrevoMailer {
    api_key: SecretString,
    from_email: String,
    from_name: String,
    endpoint: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct Party<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    sender: Party<'a>,
    to: Vec<Party<'a>>,
    subject: &'a str,
    html_content: String,
}

impl BrevoMailer {
    /// Creates a mailer from the email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.brevo_api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            endpoint: BREVO_SMTP_ENDPOINT.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Points the mailer at a different endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Formats a minor-unit amount for display, e.g. 15000 -> "S/ 150.00".
    fn display_amount(amount_minor: i64) -> String {
        format!("S/ {:.2}", amount_minor as f64 / 100.0)
    }

    fn confirmation_body(order_reference: &str, amount_minor: i64) -> String {
        format!(
            "<html><body>\
             <h2>Payment received</h2>\
             <p>Your payment for order <strong>{}</strong> was confirmed.</p>\
             <p>Amount: <strong>{}</strong></p>\
             <p>Thank you for your reservation.</p>\
             </body></html>",
            order_reference,
            Self::display_amount(amount_minor),
        )
    }
}

#[async_trait]
impl NotificationDispatcher for BrevoMailer {
    async fn send_confirmation(
        &self,
        recipient: &str,
        order_reference: &str,
        amount_minor: i64,
        subject: Option<&str>,
        sender_label: Option<&str>,
    ) -> Result<(), NotifyError> {
        let request = SendEmailRequest {
            sender: Party {
                email: &self.from_email,
                name: Some(sender_label.unwrap_or(&self.from_name)),
            },
            to: vec![Party {
                email: recipient,
                name: None,
            }],
            subject: subject.unwrap_or(DEFAULT_SUBJECT),
            html_content: Self::confirmation_body(order_reference, amount_minor),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Brevo rejected confirmation email");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(recipient = %recipient, order_reference = %order_reference, "confirmation email sent");
        Ok(())
    }
}
