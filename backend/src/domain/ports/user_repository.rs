//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{UserAccount, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The store's uniqueness constraint rejected the username.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// Storage for registered accounts.
///
/// Adapters must enforce username uniqueness themselves: two concurrent
/// inserts of the same username must not both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by its unique username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Insert a new account, failing with `DuplicateUsername` when taken.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;
}
