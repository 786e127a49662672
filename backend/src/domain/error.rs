//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope; the core never decides
//! status codes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// No user is registered under the supplied username.
    UserNotFound,
    /// A user with the supplied username already exists.
    DuplicateUser,
    /// The password does not match the stored hash.
    InvalidCredentials,
    /// The bearer token is malformed, forged, or expired.
    InvalidToken,
    /// The addressed post does not exist.
    ResourceNotFound,
    /// The acting user does not own the addressed post.
    InvalidPermission,
    /// A backing store is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use sns_backend::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::ResourceNotFound, "post 7 not found");
/// assert_eq!(err.code(), ErrorCode::ResourceNotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// Only call this with literal or formatted messages known to be
    /// non-empty; use [`Error::try_new`] for caller-supplied text.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use sns_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::UserNotFound`] naming the missing username.
    pub fn user_not_found(username: impl AsRef<str>) -> Self {
        let username = username.as_ref();
        Self::new(ErrorCode::UserNotFound, format!("user {username} not found"))
            .with_details(json!({ "username": username }))
    }

    /// [`ErrorCode::DuplicateUser`] naming the contested username.
    pub fn duplicate_user(username: impl AsRef<str>) -> Self {
        let username = username.as_ref();
        Self::new(ErrorCode::DuplicateUser, format!("user {username} already exists"))
            .with_details(json!({ "username": username }))
    }

    /// [`ErrorCode::InvalidCredentials`] for a failed password check.
    ///
    /// The details name the account but never the attempted password.
    pub fn invalid_credentials(username: impl AsRef<str>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, "invalid credentials")
            .with_details(json!({ "username": username.as_ref() }))
    }

    /// [`ErrorCode::InvalidToken`] with a machine-readable reason.
    pub fn invalid_token(reason: &str) -> Self {
        Self::new(ErrorCode::InvalidToken, "invalid token")
            .with_details(json!({ "reason": reason }))
    }

    /// [`ErrorCode::ResourceNotFound`] naming the missing post.
    pub fn resource_not_found(post_id: impl std::fmt::Display) -> Self {
        let post_id = post_id.to_string();
        Self::new(ErrorCode::ResourceNotFound, format!("post {post_id} not found"))
            .with_details(json!({ "postId": post_id }))
    }

    /// [`ErrorCode::InvalidPermission`] naming the actor and the post.
    pub fn invalid_permission(username: impl AsRef<str>, post_id: impl std::fmt::Display) -> Self {
        let username = username.as_ref();
        let post_id = post_id.to_string();
        Self::new(
            ErrorCode::InvalidPermission,
            format!("{username} has no permission on post {post_id}"),
        )
        .with_details(json!({ "username": username, "postId": post_id }))
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}
