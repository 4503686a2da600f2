//! Active Directory client utilities for the AD authentication bridge.
//!
//! This crate owns all protocol-level interaction with the directory backend:
//! the single long-lived LDAP connection, bind-based credential verification,
//! attribute and group-membership searches, and the service facade that
//! narrows directory entries to the profiles the orchestration loop reports.

#![deny(missing_docs)]

mod client;
mod config;
mod dn;
mod service;
mod user;

pub use client::{AdRepository, LdapEntry, SearchScope};
pub use config::{DirectoryConfig, DEFAULT_CONNECTION_TIMEOUT_SECS};
pub use dn::{DistinguishedName, DistinguishedNameError};
pub use service::{AdDirectoryService, DirectoryRepository};
pub use user::DirectoryUser;

/// Convenient result alias that reuses the core error type.
pub type Result<T> = adauth_core::Result<T>;
