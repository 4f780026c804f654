//! Email configuration (Brevo)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Brevo transactional API)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Brevo API key
    pub brevo_api_key: SecretString,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Operational mailbox that receives a copy of every payment confirmation
    pub operator_email: String,
}

impl EmailConfig {
    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.brevo_api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("BREVO_API_KEY"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if !self.operator_email.contains('@') {
            return Err(ValidationError::InvalidOperatorEmail);
        }
        Ok(())
    }
}

fn default_from_email() -> String {
    "noreply@condorbooking.pe".to_string()
}

fn default_from_name() -> String {
    "Condor Booking".to_string()
}
