//! User directory service: registration, login and identity resolution.
//!
//! Argon2 work runs on the blocking pool so a burst of logins cannot stall
//! the async workers that serve other requests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{UserDirectory, UserPersistenceError, UserRepository};
use crate::domain::{
    AuthToken, CredentialError, CredentialManager, Error, LoginCredentials, TokenService,
    UserAccount, UserId, UserIdentity, Username,
};

/// User directory implementing the [`UserDirectory`] driving port.
#[derive(Clone)]
pub struct UserDirectoryService<U> {
    users: Arc<U>,
    credentials: CredentialManager,
    tokens: TokenService,
}

impl<U> UserDirectoryService<U> {
    /// Create a directory over `users`, hashing with `credentials` and
    /// signing with `tokens`.
    pub fn new(users: Arc<U>, credentials: CredentialManager, tokens: TokenService) -> Self {
        Self {
            users,
            credentials,
            tokens,
        }
    }
}

impl<U> UserDirectoryService<U>
where
    U: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { username } => Error::duplicate_user(username),
        }
    }

    fn map_credential_error(error: CredentialError) -> Error {
        Error::internal(format!("credential processing failed: {error}"))
    }

    async fn run_blocking<T, F>(task: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        tokio::task::spawn_blocking(task)
            .await
            .map_err(|err| Error::internal(format!("credential task failed: {err}")))
    }

    async fn find_account(&self, username: &Username) -> Result<Option<UserAccount>, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn require_account(&self, username: &Username) -> Result<UserAccount, Error> {
        self.find_account(username).await?.ok_or_else(|| {
            debug!(%username, "no account for username");
            Error::user_not_found(username)
        })
    }
}

#[async_trait]
impl<U> UserDirectory for UserDirectoryService<U>
where
    U: UserRepository,
{
    async fn register(&self, credentials: &LoginCredentials) -> Result<UserIdentity, Error> {
        let username = credentials.username();
        if self.find_account(username).await?.is_some() {
            debug!(%username, "registration rejected: username taken");
            return Err(Error::duplicate_user(username));
        }

        let manager = self.credentials.clone();
        let password = credentials.clone();
        let hash = Self::run_blocking(move || manager.hash(password.password()))
            .await?
            .map_err(Self::map_credential_error)?;

        let identity = UserIdentity::new(UserId::random(), username.clone());
        let account = UserAccount::new(identity.clone(), hash);
        self.users.insert(&account).await.map_err(|err| {
            if matches!(err, UserPersistenceError::DuplicateUsername { .. }) {
                debug!(%username, "registration lost a uniqueness race");
            }
            Self::map_persistence_error(err)
        })?;

        info!(%username, user_id = %identity.id(), "registered user");
        Ok(identity)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let username = credentials.username();
        let account = self.require_account(username).await?;

        let manager = self.credentials.clone();
        let attempt = credentials.clone();
        let stored = account.password_hash().clone();
        let verified =
            Self::run_blocking(move || manager.verify(attempt.password(), &stored)).await?;
        if !verified {
            warn!(%username, "login rejected: wrong password");
            return Err(Error::invalid_credentials(username));
        }

        let token = self.tokens.issue(username)?;
        debug!(%username, expires_at = %token.expires_at(), "issued bearer token");
        Ok(token)
    }

    async fn resolve(&self, username: &Username) -> Result<UserIdentity, Error> {
        Ok(self.require_account(username).await?.into_identity())
    }

    async fn resolve_bearer(&self, token: &str) -> Result<UserIdentity, Error> {
        let subject = self.tokens.validate(token).map_err(|err| {
            debug!(reason = err.reason(), "bearer token rejected");
            Error::from(err)
        })?;
        self.resolve(&subject).await
    }
}

#[cfg(test)]
mod tests;
