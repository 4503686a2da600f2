//! Environment-sourced application configuration.
//!
//! Configuration is read once at process start; any missing or malformed
//! value is a fatal startup error. Tests supply variables through
//! [`AppConfig::from_reader`] without mutating process-global state.

use crate::error::{Error, Result};
use secrecy::SecretString;
use validator::Validate;

/// Default post-batch poll interval (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Application configuration for the authentication bridge.
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    /// Directory server host.
    pub directory_server: String,

    /// Directory server port.
    #[validate(range(min = 1))]
    pub directory_port: u16,

    /// Domain suffix used to build UPN-style bind identities.
    pub directory_domain: String,

    /// Administrative bind username.
    pub bind_username: String,

    /// Administrative bind password.
    pub bind_password: SecretString,

    /// Base distinguished name for directory searches.
    pub base_dn: String,

    /// Gateway base URL.
    #[validate(url)]
    pub gateway_url: String,

    /// Gateway bearer token.
    pub gateway_token: SecretString,

    /// Seconds to sleep after each processed batch.
    pub poll_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for any missing or malformed value.
    pub fn from_env() -> Result<Self> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for any missing or malformed value.
    pub fn from_reader<F>(reader: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        let require = |key: &str| {
            reader(key)
                .map_err(|_| Error::ConfigError(format!("missing environment variable {key}")))
        };

        let directory_server = require("AD_SERVER")?;
        let directory_port = require("AD_PORT")?
            .parse::<u16>()
            .map_err(|err| Error::ConfigError(format!("invalid value for AD_PORT: {err}")))?;
        let directory_domain = require("AD_DOMAIN")?;
        let bind_username = require("AD_USERNAME")?;
        let bind_password = SecretString::from(require("AD_PASSWORD")?);
        let base_dn = require("AD_BASE_DN")?;
        let gateway_url = require("API_URL")?;
        let gateway_token = SecretString::from(require("API_TOKEN")?);

        let poll_interval_secs = match reader("POLL_INTERVAL_SECS") {
            Ok(value) => value.parse::<u64>().map_err(|err| {
                Error::ConfigError(format!("invalid value for POLL_INTERVAL_SECS: {err}"))
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let config = Self {
            directory_server,
            directory_port,
            directory_domain,
            bind_username,
            bind_password,
            base_dn,
            gateway_url,
            gateway_token,
            poll_interval_secs,
        };

        config
            .validate()
            .map_err(|err| Error::ConfigError(format!("invalid configuration: {err}")))?;

        Ok(config)
    }
}
