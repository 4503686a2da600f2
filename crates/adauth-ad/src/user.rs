//! Directory user representation.

use serde::{Deserialize, Serialize};

use crate::dn::DistinguishedName;

/// A user entry as returned by a directory search.
///
/// The distinguished name is the directory's canonical identity key;
/// `groups` is populated only by the group-membership lookup path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Distinguished name of the entry.
    pub dn: DistinguishedName,
    /// Legacy short logon name (`sAMAccountName`).
    pub sam_account_name: String,
    /// Posix-style identifier (`uid`), when present.
    #[serde(default)]
    pub uid: Option<String>,
    /// Common name.
    #[serde(default)]
    pub cn: Option<String>,
    /// UPN-style login (`userPrincipalName`), when present.
    #[serde(default)]
    pub user_principal_name: Option<String>,
    /// Primary email address (`mail`), when present.
    #[serde(default)]
    pub email: Option<String>,
    /// Group names the user is known to belong to.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl DirectoryUser {
    /// Creates a builder for a new user instance.
    #[must_use]
    pub fn builder(dn: DistinguishedName, sam_account_name: impl Into<String>) -> Builder {
        Builder {
            dn,
            sam_account_name: sam_account_name.into(),
            uid: None,
            cn: None,
            user_principal_name: None,
            email: None,
            groups: Vec::new(),
        }
    }

    /// Returns true if the user is known to belong to the provided group
    /// (case-insensitive).
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case(group))
    }
}

/// Builder for [`DirectoryUser`].
#[derive(Debug)]
pub struct Builder {
    dn: DistinguishedName,
    sam_account_name: String,
    uid: Option<String>,
    cn: Option<String>,
    user_principal_name: Option<String>,
    email: Option<String>,
    groups: Vec<String>,
}

impl Builder {
    /// Sets the posix-style identifier.
    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the common name.
    #[must_use]
    pub fn cn(mut self, cn: impl Into<String>) -> Self {
        self.cn = Some(cn.into());
        self
    }

    /// Sets the UPN-style login.
    #[must_use]
    pub fn user_principal_name(mut self, upn: impl Into<String>) -> Self {
        self.user_principal_name = Some(upn.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Replaces the group list.
    #[must_use]
    pub fn groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Finalises the builder and returns the [`DirectoryUser`].
    #[must_use]
    pub fn build(self) -> DirectoryUser {
        DirectoryUser {
            dn: self.dn,
            sam_account_name: self.sam_account_name,
            uid: self.uid,
            cn: self.cn,
            user_principal_name: self.user_principal_name,
            email: self.email,
            groups: self.groups,
        }
    }
}
