//! Posts: short owned text entries.
//!
//! A post's owner is fixed when it is created. Title and body may be
//! replaced by the owner; every replacement refreshes `updated_at`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Error, UserId};

/// Maximum title length in characters, after trimming.
pub const TITLE_MAX: usize = 200;
/// Maximum body length in characters.
pub const BODY_MAX: usize = 10_000;

/// Validation failures for [`PostContent`] and [`PostId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Title was blank after trimming.
    #[error("post title must not be empty")]
    EmptyTitle,
    #[error("post title must be at most {max} characters")]
    TitleTooLong { max: usize },
    /// Body held only whitespace.
    #[error("post body must not be empty")]
    EmptyBody,
    #[error("post body must be at most {max} characters")]
    BodyTooLong { max: usize },
    /// Identifier text was not a UUID.
    #[error("post id must be a valid UUID")]
    InvalidId,
}

impl From<PostValidationError> for Error {
    fn from(value: PostValidationError) -> Self {
        Error::invalid_request(value.to_string())
    }
}

/// Stable post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a new random [`PostId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PostId {
    type Err = PostValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }
}

/// Validated title and body supplied on create and modify.
///
/// # Examples
/// ```
/// use sns_backend::domain::PostContent;
///
/// let content = PostContent::new("  Hello  ", "first post").expect("valid content");
/// assert_eq!(content.title(), "Hello");
/// assert!(PostContent::new("   ", "body").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPostContent")]
pub struct PostContent {
    title: String,
    body: String,
}

#[derive(Deserialize)]
struct RawPostContent {
    title: String,
    body: String,
}

impl TryFrom<RawPostContent> for PostContent {
    type Error = PostValidationError;

    fn try_from(value: RawPostContent) -> Result<Self, Self::Error> {
        Self::new(value.title, value.body)
    }
}

impl PostContent {
    /// Validate a title and body. The title is trimmed; the body is kept
    /// verbatim but must contain something other than whitespace.
    pub fn new(
        title: impl AsRef<str>,
        body: impl Into<String>,
    ) -> Result<Self, PostValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }

        let body = body.into();
        if body.trim().is_empty() {
            return Err(PostValidationError::EmptyBody);
        }
        if body.chars().count() > BODY_MAX {
            return Err(PostValidationError::BodyTooLong { max: BODY_MAX });
        }

        Ok(Self {
            title: title.to_owned(),
            body,
        })
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Body exactly as submitted.
    pub fn body(&self) -> &str {
        self.body.as_str()
    }
}

/// A stored post.
///
/// ## Invariants
/// - `owner_id` never changes after creation.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: PostId,
    owner_id: UserId,
    #[serde(flatten)]
    content: PostContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a post owned by `owner_id`, stamped with `now`.
    pub fn new(id: PostId, owner_id: UserId, content: PostContent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title and body, keeping identity, owner and creation time.
    pub fn revised(self, content: PostContent, now: DateTime<Utc>) -> Self {
        Self {
            content,
            updated_at: now.max(self.created_at),
            ..self
        }
    }

    /// Identifier assigned at creation.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Owner fixed at creation.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Current title.
    pub fn title(&self) -> &str {
        self.content.title()
    }

    /// Current body.
    pub fn body(&self) -> &str {
        self.content.body()
    }

    /// Creation instant from the service clock.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant of the latest revision; equals `created_at` until edited.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests;
