//! In-memory `UserRepository` adapter.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{UserAccount, Username};

/// Accounts keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<Username, UserAccount>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Username, UserAccount>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::connection("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.get(username).cloned())
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let username = account.identity().username();
        match self.lock()?.entry(username.clone()) {
            Entry::Occupied(_) => {
                debug!(%username, "rejected duplicate username insert");
                Err(UserPersistenceError::duplicate_username(username.as_ref()))
            }
            Entry::Vacant(slot) => {
                slot.insert(account.clone());
                Ok(())
            }
        }
    }
}
