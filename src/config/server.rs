//! HTTP server configuration.
//!
//! The notification endpoints must be reachable by the gateway from the
//! public internet, so the bind address defaults to all interfaces. The
//! request timeout is bounded: an IPN the server cannot answer in time is
//! redelivered by the gateway, and a long timeout only delays that retry.

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;

/// Longest request timeout the service accepts, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind. Defaults to all interfaces so the gateway can
    /// deliver notifications.
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Tracing filter directive applied when `RUST_LOG` is unset.
    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    /// Per-request timeout in seconds.
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated list of origins the browser checkout page may call
    /// from. Unset means permissive CORS, which only development uses.
    pub cors_origins: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Resolves the bind address.
    ///
    /// # Errors
    ///
    /// `ValidationError::InvalidBindAddress` when host and port do not form
    /// a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Origins allowed by CORS, split from the configured list.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validates the server section.
    ///
    /// Production must name its CORS origins explicitly; falling back to
    /// permissive CORS is a development convenience only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.is_production() && self.allowed_origins().is_empty() {
            return Err(ValidationError::MissingRequired("SERVER_CORS_ORIGINS"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            environment: Environment::default(),
            log_level: defaults::log_level(),
            request_timeout_secs: defaults::request_timeout(),
            cors_origins: None,
        }
    }
}

mod defaults {
    pub fn host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn log_level() -> String {
        "info,condor_booking=debug,sqlx=warn".to_string()
    }

    pub fn request_timeout() -> u64 {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(
            config.socket_addr().unwrap().to_string(),
            "0.0.0.0:8080"
        );
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_host_is_rejected() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBindAddress)
        ));
    }

    #[test]
    fn zero_port_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPort)));
    }

    #[test]
    fn timeout_must_stay_within_the_retry_window() {
        for timeout in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: timeout,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidTimeout)
            ));
        }
    }

    #[test]
    fn allowed_origins_splits_and_trims() {
        let config = ServerConfig {
            cors_origins: Some(" https://condorbooking.pe ,https://www.condorbooking.pe,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.allowed_origins(),
            vec![
                "https://condorbooking.pe".to_string(),
                "https://www.condorbooking.pe".to_string(),
            ]
        );
    }

    #[test]
    fn production_requires_explicit_origins() {
        let bare = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(bare.validate().is_err());

        let configured = ServerConfig {
            environment: Environment::Production,
            cors_origins: Some("https://condorbooking.pe".to_string()),
            ..Default::default()
        };
        assert!(configured.validate().is_ok());
    }
}
