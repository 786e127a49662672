//! Driving ports for post creation, mutation and listing.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Post, PostContent, PostId, Username};

/// Request to create a post owned by `actor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Authenticated username, as asserted by a validated token.
    pub actor: Username,
    pub content: PostContent,
}

/// Request to replace the title and body of an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyPostRequest {
    pub actor: Username,
    pub post_id: PostId,
    pub content: PostContent,
}

/// Request to delete an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub actor: Username,
    pub post_id: PostId,
}

/// Mutating post operations.
///
/// Every operation resolves the actor first (`UserNotFound`), then fetches
/// the post (`ResourceNotFound`), then checks ownership (`InvalidPermission`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsCommand: Send + Sync {
    /// Create a post owned by the actor.
    async fn create(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Replace a post's content. Only the owner may do this.
    async fn modify(&self, request: ModifyPostRequest) -> Result<Post, Error>;

    /// Delete a post. Only the owner may do this.
    async fn delete(&self, request: DeletePostRequest) -> Result<(), Error>;
}

/// Read-only post listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsQuery: Send + Sync {
    /// List every post. Requires no identity.
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, Error>;

    /// List the posts owned by `actor`.
    async fn list_mine(&self, actor: &Username, page: PageRequest) -> Result<Page<Post>, Error>;
}
