//! Configuration for the directory connection.

use crate::{dn::DistinguishedName, Result};
use adauth_core::services::DirectoryCredentials;
use std::time::Duration;
use url::Url;

/// Default connection timeout (seconds).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;

/// Configuration for connecting to the directory backend.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    url: String,
    domain: String,
    credentials: DirectoryCredentials,
    base_dn: DistinguishedName,
    connection_timeout_secs: u64,
}

impl DirectoryConfig {
    /// Creates a new directory configuration for `ldap://server:port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid.
    pub fn new(
        server: impl AsRef<str>,
        port: u16,
        domain: impl Into<String>,
        credentials: DirectoryCredentials,
        base_dn: DistinguishedName,
    ) -> Result<Self> {
        let url = format!("ldap://{}:{port}", server.as_ref());
        Url::parse(&url)?;

        Ok(Self {
            url,
            domain: domain.into(),
            credentials,
            base_dn,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
        })
    }

    /// Returns the directory endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the UPN domain suffix.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the administrative credentials.
    #[must_use]
    pub const fn credentials(&self) -> &DirectoryCredentials {
        &self.credentials
    }

    /// Returns the base distinguished name for searches.
    #[must_use]
    pub const fn base_dn(&self) -> &DistinguishedName {
        &self.base_dn
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Formats the UPN-style bind identity `username@domain`.
    #[must_use]
    pub fn bind_identity(&self, username: &str) -> String {
        format!("{username}@{}", self.domain)
    }

    /// Overrides the endpoint URL (e.g. to switch to `ldaps://`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Url::parse(&url)?;
        self.url = url;
        Ok(self)
    }

    /// Overrides the connection timeout in seconds.
    #[must_use]
    pub const fn with_connection_timeout_secs(mut self, seconds: u64) -> Self {
        self.connection_timeout_secs = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn sample_credentials() -> DirectoryCredentials {
        DirectoryCredentials::new(
            "svc.bridge".to_string(),
            SecretString::from("secret".to_string()),
        )
    }

    #[test]
    fn builds_url_from_server_and_port() {
        let base_dn = DistinguishedName::parse("DC=example,DC=com").unwrap();
        let config = DirectoryConfig::new(
            "ad.example.com",
            389,
            "example.com",
            sample_credentials(),
            base_dn.clone(),
        )
        .unwrap();

        assert_eq!(config.url(), "ldap://ad.example.com:389");
        assert_eq!(config.domain(), "example.com");
        assert_eq!(config.base_dn(), &base_dn);
        assert_eq!(
            config.connection_timeout(),
            Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS)
        );
    }

    #[test]
    fn formats_upn_bind_identity() {
        let base_dn = DistinguishedName::parse("DC=example,DC=com").unwrap();
        let config =
            DirectoryConfig::new("ad", 389, "example.com", sample_credentials(), base_dn).unwrap();

        assert_eq!(config.bind_identity("alice"), "alice@example.com");
    }

    #[test]
    fn overrides() {
        let base_dn = DistinguishedName::parse("DC=example,DC=com").unwrap();
        let config = DirectoryConfig::new("ad", 389, "example.com", sample_credentials(), base_dn)
            .unwrap()
            .with_url("ldaps://ad.example.com:636")
            .unwrap()
            .with_connection_timeout_secs(20);

        assert_eq!(config.url(), "ldaps://ad.example.com:636");
        assert_eq!(config.connection_timeout(), Duration::from_secs(20));
    }
}
