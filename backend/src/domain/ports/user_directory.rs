//! Driving port for registration, login and identity lookup.
//!
//! Transport adapters call this port to turn credentials into tokens and
//! tokens into identities without importing the persistence layer.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, UserIdentity, Username};

/// Domain use-case port for the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// `DuplicateUser` when the username is taken, including when a
    /// concurrent registration wins the race at the store.
    async fn register(&self, credentials: &LoginCredentials) -> Result<UserIdentity, Error>;

    /// Verify credentials and issue a bearer token.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown username, `InvalidCredentials` for a
    /// wrong password.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;

    /// Look up the identity behind a username.
    async fn resolve(&self, username: &Username) -> Result<UserIdentity, Error>;

    /// Validate a bearer token and resolve its subject.
    async fn resolve_bearer(&self, token: &str) -> Result<UserIdentity, Error>;
}
