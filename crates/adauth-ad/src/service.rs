//! Directory service facade.
//!
//! Narrows [`DirectoryUser`] entries to the [`UserProfile`] vocabulary the
//! orchestration loop reports, so the loop never sees the directory's native
//! attribute names.

use crate::{client::AdRepository, user::DirectoryUser, Result};
use adauth_core::services::DirectoryService;
use adauth_core::types::UserProfile;
use async_trait::async_trait;
use secrecy::SecretString;

/// Repository-level view of the directory.
///
/// [`AdRepository`] is the production implementation; the facade depends on
/// the trait so directory backends stay swappable and mockable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryRepository: Send {
    /// Verifies credentials by rebinding the shared connection.
    async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<bool>;
    /// Fetches the entry whose `sAMAccountName` matches `username`.
    async fn fetch_user(&mut self, username: &str) -> Result<DirectoryUser>;
    /// Fetches the users transitively belonging to `group`.
    async fn fetch_group_members(&mut self, group: &str) -> Result<Vec<DirectoryUser>>;
    /// Returns the connection to its non-impersonated identity.
    async fn unbind(&mut self) -> Result<()>;
    /// Tears the connection down.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl DirectoryRepository for AdRepository {
    async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<bool> {
        AdRepository::authenticate(self, username, password).await
    }

    async fn fetch_user(&mut self, username: &str) -> Result<DirectoryUser> {
        AdRepository::fetch_user(self, username).await
    }

    async fn fetch_group_members(&mut self, group: &str) -> Result<Vec<DirectoryUser>> {
        AdRepository::fetch_group_members(self, group).await
    }

    async fn unbind(&mut self) -> Result<()> {
        AdRepository::unbind(self).await
    }

    async fn close(&mut self) -> Result<()> {
        AdRepository::close(self).await
    }
}

/// Facade translating repository results into profile records.
pub struct AdDirectoryService {
    repository: Box<dyn DirectoryRepository>,
}

impl AdDirectoryService {
    /// Creates a facade over the given repository.
    #[must_use]
    pub fn new(repository: Box<dyn DirectoryRepository>) -> Self {
        Self { repository }
    }

    fn profile(user: &DirectoryUser) -> UserProfile {
        UserProfile {
            username: user.sam_account_name.clone(),
            email: user.email.clone().unwrap_or_default(),
            groups: user.groups.clone(),
        }
    }
}

#[async_trait]
impl DirectoryService for AdDirectoryService {
    async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<bool> {
        self.repository.authenticate(username, password).await
    }

    async fn lookup_user(&mut self, username: &str) -> Result<UserProfile> {
        let user = self.repository.fetch_user(username).await?;
        Ok(Self::profile(&user))
    }

    async fn lookup_group_members(&mut self, group: &str) -> Result<Vec<UserProfile>> {
        let users = self.repository.fetch_group_members(group).await?;
        Ok(users.iter().map(Self::profile).collect())
    }

    async fn unbind(&mut self) -> Result<()> {
        self.repository.unbind().await
    }

    async fn close(&mut self) -> Result<()> {
        self.repository.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::DistinguishedName;
    use adauth_core::Error;

    fn sample_user(sam: &str, email: Option<&str>, groups: Vec<String>) -> DirectoryUser {
        let dn =
            DistinguishedName::parse(format!("CN={sam},OU=People,DC=example,DC=com")).unwrap();
        let mut builder = DirectoryUser::builder(dn, sam);
        if let Some(email) = email {
            builder = builder.email(email);
        }
        builder.groups(groups).build()
    }

    #[tokio::test]
    async fn lookup_user_narrows_to_profile() {
        let mut repository = MockDirectoryRepository::new();
        repository
            .expect_fetch_user()
            .withf(|username| username == "alice")
            .returning(|_| Ok(sample_user("alice", Some("alice@co"), Vec::new())));

        let mut service = AdDirectoryService::new(Box::new(repository));
        let profile = service.lookup_user("alice").await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@co");
        assert!(profile.groups.is_empty());
    }

    #[tokio::test]
    async fn lookup_user_defaults_missing_email_to_empty() {
        let mut repository = MockDirectoryRepository::new();
        repository
            .expect_fetch_user()
            .returning(|_| Ok(sample_user("bob", None, Vec::new())));

        let mut service = AdDirectoryService::new(Box::new(repository));
        let profile = service.lookup_user("bob").await.unwrap();
        assert_eq!(profile.email, "");
    }

    #[tokio::test]
    async fn lookup_user_propagates_not_found() {
        let mut repository = MockDirectoryRepository::new();
        repository
            .expect_fetch_user()
            .returning(|username| Err(Error::NotFound(format!("user `{username}` not found"))));

        let mut service = AdDirectoryService::new(Box::new(repository));
        let err = service.lookup_user("ghost").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn lookup_group_members_narrows_each_member() {
        let mut repository = MockDirectoryRepository::new();
        repository
            .expect_fetch_group_members()
            .withf(|group| group == "Operators")
            .returning(|group| {
                Ok(vec![
                    sample_user("alice", Some("alice@co"), vec![group.to_string()]),
                    sample_user("bob", None, vec![group.to_string()]),
                ])
            });

        let mut service = AdDirectoryService::new(Box::new(repository));
        let profiles = service.lookup_group_members("Operators").await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].username, "alice");
        assert_eq!(profiles[0].groups, vec!["Operators".to_string()]);
        assert_eq!(profiles[1].email, "");
    }

    #[tokio::test]
    async fn unbind_and_close_delegate() {
        let mut repository = MockDirectoryRepository::new();
        repository.expect_unbind().times(1).returning(|| Ok(()));
        repository.expect_close().times(1).returning(|| Ok(()));

        let mut service = AdDirectoryService::new(Box::new(repository));
        service.unbind().await.unwrap();
        service.close().await.unwrap();
    }
}
