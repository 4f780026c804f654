//! Payment gateway configuration (Izipay)
//!
//! The gateway uses two distinct signing keys for what is structurally the
//! same verification: the front HMAC key signs the browser-redirected
//! callback and the account password signs the server-to-server IPN. Both
//! are required at startup; the process must not run in a degraded mode.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration (Izipay)
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// REST API username (shop id)
    pub username: String,

    /// REST API password; also the signing key for the IPN channel
    pub password: SecretString,

    /// HMAC-SHA256 key for the front callback channel
    pub hmac_key: SecretString,

    /// Public key embedded in the checkout form
    pub public_key: String,

    /// Gateway REST API base URL
    pub base_url: String,

    /// Secret key for the capture endpoint (optional flow)
    pub capture_secret: Option<SecretString>,
}

impl GatewayConfig {
    /// Signing key for the front callback channel.
    pub fn callback_key(&self) -> &str {
        self.hmac_key.expose_secret()
    }

    /// Signing key for the IPN channel (the account password, per the
    /// gateway's documented convention).
    pub fn ipn_key(&self) -> &str {
        self.password.expose_secret()
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_USERNAME"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_PASSWORD"));
        }
        if self.hmac_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_HMAC_KEY"));
        }
        if self.public_key.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_PUBLIC_KEY"));
        }
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_BASE_URL"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        Ok(())
    }
}
