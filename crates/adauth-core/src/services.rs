//! Capability traits for the bridge's two collaborators.
//!
//! The orchestration loop talks to the directory and the request queue only
//! through these traits, keeping both backends swappable and mockable. The
//! directory trait takes `&mut self`: implementations own a single shared
//! connection whose bound identity changes per request.

use crate::error::Result;
use crate::types::{AuthResult, CredentialRequest, UserProfile};
use async_trait::async_trait;
use secrecy::SecretString;

/// Administrative credentials for the directory connection.
///
/// These identify the bridge itself; per-request credentials arrive from the
/// gateway and are never stored.
#[derive(Debug, Clone)]
pub struct DirectoryCredentials {
    /// Administrative bind username (short logon name, not a DN).
    pub username: String,

    /// Administrative bind password.
    pub password: SecretString,
}

impl DirectoryCredentials {
    /// Create new directory credentials.
    #[must_use]
    pub const fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Get the administrative bind username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get the administrative bind password.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Profile-level view of the enterprise directory.
///
/// Implemented by the directory service facade; consumed by the
/// orchestration loop.
#[async_trait]
pub trait DirectoryService: Send {
    /// Verifies the credentials by rebinding the shared connection.
    ///
    /// A rejected bind is an error, never `Ok(false)`; the boolean exists so
    /// callers can treat an unauthenticated outcome uniformly should an
    /// implementation produce one.
    async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<bool>;

    /// Looks up the profile for a login name.
    async fn lookup_user(&mut self, username: &str) -> Result<UserProfile>;

    /// Resolves the transitive membership of the named group.
    async fn lookup_group_members(&mut self, group: &str) -> Result<Vec<UserProfile>>;

    /// Returns the connection to its non-impersonated identity.
    async fn unbind(&mut self) -> Result<()>;

    /// Tears the directory connection down.
    async fn close(&mut self) -> Result<()>;
}

/// The request queue: pending credentials in, authentication results out.
#[async_trait]
pub trait RequestGateway: Send {
    /// Fetches the batch of pending credential-verification requests.
    async fn fetch_pending(&self) -> Result<Vec<CredentialRequest>>;

    /// Reports the outcome for one request.
    async fn send_result(&self, request_id: &str, result: &AuthResult) -> Result<()>;
}
