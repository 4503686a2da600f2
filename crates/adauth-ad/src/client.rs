//! Active Directory repository over a single long-lived LDAP connection.

use crate::{config::DirectoryConfig, user::DirectoryUser, DistinguishedName, Result};
use adauth_core::Error;
use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tracing::debug;

/// Attributes requested for user entries.
const USER_ATTRIBUTES: &[&str] = &[
    "cn",
    "mail",
    "sAMAccountName",
    "userPrincipalName",
    "uid",
    "distinguishedName",
];

/// Attributes requested when resolving a group.
const GROUP_ATTRIBUTES: &[&str] = &["cn", "distinguishedName", "member"];

/// Matching-rule OID for membership over the full nested-group closure.
const TRANSITIVE_MEMBERSHIP_RULE: &str = "1.2.840.113556.1.4.1941";

/// Represents the search scope for LDAP queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Base object only.
    Base,
    /// One level below the base.
    OneLevel,
    /// Entire subtree.
    Subtree,
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}

/// LDAP entry representation used by the repository.
#[derive(Debug, Clone)]
pub struct LdapEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map (values preserve server order).
    pub attributes: HashMap<String, Vec<String>>,
}

impl LdapEntry {
    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapSession: Send {
    async fn simple_bind(&mut self, identity: &str, password: &str) -> Result<()>;
    async fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<LdapEntry>>;
    async fn unbind(&mut self) -> Result<()>;
}

/// Directory repository owning one connection for its whole lifetime.
///
/// Bind and unbind calls mutate the connection's bound identity in place;
/// searches run under whatever identity the last successful bind established.
/// The repository must stay under single-flow ownership from construction to
/// [`AdRepository::close`].
pub struct AdRepository {
    config: DirectoryConfig,
    session: Box<dyn LdapSession>,
}

impl AdRepository {
    /// Dials the directory and performs the initial administrative bind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionError`] when the connection cannot be
    /// established or the administrative bind is rejected.
    pub async fn connect(config: DirectoryConfig) -> Result<Self> {
        let settings = LdapConnSettings::new().set_conn_timeout(config.connection_timeout());
        let (conn, ldap) = LdapConnAsync::with_settings(settings, config.url())
            .await
            .map_err(|err| Error::ConnectionError(err.to_string()))?;
        ldap3::drive!(conn);

        let mut repository = Self {
            config,
            session: Box::new(RealLdapSession { inner: ldap }),
        };
        repository
            .bind_service_identity()
            .await
            .map_err(|err| Error::ConnectionError(format!("administrative bind failed: {err}")))?;

        Ok(repository)
    }

    #[cfg(test)]
    pub(crate) fn with_session(config: DirectoryConfig, session: Box<dyn LdapSession>) -> Self {
        Self { config, session }
    }

    /// Rebinds the shared connection as `username@domain`.
    ///
    /// # Errors
    ///
    /// Forwards the backend error when the bind is rejected.
    pub async fn bind(&mut self, username: &str, password: &SecretString) -> Result<()> {
        let identity = self.config.bind_identity(username);
        debug!(%identity, "binding directory connection");
        self.session
            .simple_bind(&identity, password.expose_secret())
            .await
    }

    /// Verifies credentials by rebinding the shared connection as the user.
    ///
    /// Success leaves the connection bound under that identity. A rejected
    /// bind is always an error, never a soft `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationError`] when the bind fails.
    pub async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<bool> {
        self.bind(username, password)
            .await
            .map_err(|err| Error::AuthenticationError(err.to_string()))?;
        Ok(true)
    }

    /// Fetches the user entry whose `sAMAccountName` matches `username`.
    ///
    /// When several entries match, the first in server order wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no entry matches and
    /// [`Error::LookupError`] when the search itself fails.
    pub async fn fetch_user(&mut self, username: &str) -> Result<DirectoryUser> {
        let filter = format!(
            "(&(objectClass=user)(sAMAccountName={}))",
            escape_filter_value(username)
        );
        debug!(username, "searching directory for user");
        let entries = self.search_subtree(&filter, USER_ATTRIBUTES).await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("user `{username}` not found")))?;
        parse_user_entry(&entry)
    }

    /// Fetches all users whose transitive group membership includes `group`.
    ///
    /// The group's distinguished name is resolved first; an unknown group
    /// fails before any user search executes. A resolved group with no
    /// members yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the group does not exist and
    /// [`Error::LookupError`] when either search fails.
    pub async fn fetch_group_members(&mut self, group: &str) -> Result<Vec<DirectoryUser>> {
        let group_filter = format!(
            "(&(objectClass=group)(cn={}))",
            escape_filter_value(group)
        );
        debug!(group, "resolving group distinguished name");
        let groups = self.search_subtree(&group_filter, GROUP_ATTRIBUTES).await?;

        let group_dn = groups
            .into_iter()
            .next()
            .map(|entry| entry.dn)
            .ok_or_else(|| Error::NotFound(format!("group `{group}` not found")))?;

        let member_filter = format!(
            "(&(objectClass=user)(objectCategory=person)(memberOf:{TRANSITIVE_MEMBERSHIP_RULE}:={}))",
            escape_filter_value(&group_dn)
        );
        debug!(group, group_dn = %group_dn, "searching transitive group membership");
        let entries = self.search_subtree(&member_filter, USER_ATTRIBUTES).await?;

        entries
            .iter()
            .map(|entry| {
                parse_user_entry(entry)
                    .map(|user| user.with_resolved_membership(group.to_string()))
            })
            .collect()
    }

    /// Returns the connection to its non-impersonated state by rebinding
    /// with the administrative credentials.
    ///
    /// # Errors
    ///
    /// Forwards the backend error when the rebind fails.
    pub async fn unbind(&mut self) -> Result<()> {
        self.bind_service_identity().await
    }

    /// Unbinds and tears the directory connection down.
    ///
    /// # Errors
    ///
    /// Forwards the backend error when the teardown fails.
    pub async fn close(&mut self) -> Result<()> {
        self.session.unbind().await
    }

    async fn bind_service_identity(&mut self) -> Result<()> {
        let credentials = self.config.credentials().clone();
        self.bind(credentials.username(), credentials.password())
            .await
    }

    async fn search_subtree(
        &mut self,
        filter: &str,
        attributes: &'static [&'static str],
    ) -> Result<Vec<LdapEntry>> {
        self.session
            .search(
                self.config.base_dn().as_str(),
                SearchScope::Subtree,
                filter,
                attributes,
            )
            .await
            .map_err(|err| Error::LookupError(err.to_string()))
    }
}

impl DirectoryUser {
    fn with_resolved_membership(mut self, group: String) -> Self {
        self.groups = vec![group];
        self
    }
}

struct RealLdapSession {
    inner: ldap3::Ldap,
}

#[async_trait]
impl LdapSession for RealLdapSession {
    async fn simple_bind(&mut self, identity: &str, password: &str) -> Result<()> {
        let result = self
            .inner
            .simple_bind(identity, password)
            .await
            .map_err(|err| map_ldap_error("bind", &err))?;
        result
            .success()
            .map_err(|err| map_ldap_error("bind", &err))?;
        Ok(())
    }

    async fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<LdapEntry>> {
        let result = self
            .inner
            .search(base_dn, scope.into(), filter, attributes.to_vec())
            .await
            .map_err(|err| map_ldap_error("search", &err))?;
        let (entries, _) = result
            .success()
            .map_err(|err| map_ldap_error("search", &err))?;
        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| LdapEntry {
                dn: entry.dn,
                attributes: entry.attrs,
            })
            .collect())
    }

    async fn unbind(&mut self) -> Result<()> {
        self.inner
            .unbind()
            .await
            .map_err(|err| map_ldap_error("unbind", &err))
    }
}

fn map_ldap_error(operation: &str, err: &ldap3::LdapError) -> Error {
    Error::DirectoryError {
        operation: operation.to_string(),
        message: err.to_string(),
    }
}

fn parse_user_entry(entry: &LdapEntry) -> Result<DirectoryUser> {
    let dn = DistinguishedName::parse(&entry.dn)?;
    let sam_account_name = entry
        .first("sAMAccountName")
        .ok_or_else(|| missing_attribute("sAMAccountName"))?;

    let mut builder = DirectoryUser::builder(dn, sam_account_name);
    if let Some(uid) = entry.first("uid") {
        builder = builder.uid(uid);
    }
    if let Some(cn) = entry.first("cn") {
        builder = builder.cn(cn);
    }
    if let Some(upn) = entry.first("userPrincipalName") {
        builder = builder.user_principal_name(upn);
    }
    if let Some(mail) = entry.first("mail") {
        builder = builder.email(mail);
    }

    Ok(builder.build())
}

fn missing_attribute(attribute: &str) -> Error {
    Error::LookupError(format!("directory entry missing attribute `{attribute}`"))
}

/// Escapes a value for embedding in a search filter (RFC 4515).
fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
