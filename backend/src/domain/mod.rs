//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed identity and post model, the services
//! that enforce credential, token and ownership rules, and the ports through
//! which adapters reach them. Nothing here performs I/O directly.
//!
//! Public surface:
//! - Error / ErrorCode: tagged failure values returned by every operation.
//! - UserDirectoryService: registration, login and identity resolution.
//! - PostLifecycleService: owner-checked post create, modify, delete, list.
//! - TokenService / CredentialManager: token signing and password hashing.

pub mod auth;
pub mod authorization;
pub mod credentials;
pub mod error;
pub mod ports;
pub mod post;
pub mod post_lifecycle;
pub mod token;
pub mod user;
pub mod user_directory;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authorization::{AuthorizationDecision, AuthorizationGuard};
pub use self::credentials::{CredentialError, CredentialManager, HashedPassword};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::post::{BODY_MAX, Post, PostContent, PostId, PostValidationError, TITLE_MAX};
pub use self::post_lifecycle::PostLifecycleService;
pub use self::token::{
    AuthToken, TokenError, TokenSecret, TokenService, TokenSettings, TokenSettingsError,
    bearer_token,
};
pub use self::user::{
    USERNAME_MAX, USERNAME_MIN, UserAccount, UserId, UserIdentity, UserValidationError, Username,
};
pub use self::user_directory::UserDirectoryService;

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use sns_backend::domain::{DomainResult, Error, Username};
///
/// fn lookup(name: &str) -> DomainResult<Username> {
///     Username::new(name).map_err(|err| Error::invalid_request(err.to_string()))
/// }
///
/// assert!(lookup("alice").is_ok());
/// ```
pub type DomainResult<T> = Result<T, Error>;
