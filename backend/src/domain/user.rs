//! User identity model.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use super::credentials::HashedPassword;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// No identifier was supplied.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier is not a bare UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The username was blank after trimming.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Fewer than `min` characters.
    #[error("username must be at least {min} characters")]
    UsernameTooShort { min: usize },
    /// More than `max` characters.
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    /// Characters outside letters, digits, `_`, `-` and `.`.
    #[error("username may only contain letters, numbers, underscores, hyphens, or dots")]
    UsernameInvalidCharacters,
}

/// Stable user identifier, assigned at registration.
///
/// Ownership checks compare this value, never the username. It serialises
/// as the hyphenated UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier read back from storage or a client.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Allocate a fresh identifier for a new account.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login name; also the subject asserted by bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_.-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

impl Username {
    /// Validate and construct a [`Username`], trimming surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use sns_backend::domain::Username;
    ///
    /// let name = Username::new("  alice ").expect("valid username");
    /// assert_eq!(name.as_ref(), "alice");
    /// assert!(Username::new("no spaces").is_err());
    /// ```
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.as_ref().trim().to_owned())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }

        if !username_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public view of a registered user.
///
/// ## Invariants
/// - `id` is assigned once at registration and never changes.
/// - `username` is unique across the directory and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UserIdentity {
    id: UserId,
    username: Username,
}

impl UserIdentity {
    /// Build an identity from validated components.
    pub fn new(id: UserId, username: Username) -> Self {
        Self { id, username }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// Stored account: an identity plus its one-way password hash.
///
/// Only the user directory and user repositories handle this type; callers
/// outside the core only ever see the [`UserIdentity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    identity: UserIdentity,
    password_hash: HashedPassword,
}

impl UserAccount {
    /// Pair an identity with its password hash.
    pub fn new(identity: UserIdentity, password_hash: HashedPassword) -> Self {
        Self {
            identity,
            password_hash,
        }
    }

    /// Public identity of the account.
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }

    /// Drop the hash and keep the public identity.
    pub fn into_identity(self) -> UserIdentity {
        self.identity
    }
}
