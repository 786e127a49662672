//! Port for post persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Post, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "post repository query failed: {message}",
        /// A conditional update or delete found no post with this id.
        Missing { post_id: String } =>
            "post {post_id} no longer exists",
    }
}

/// Port for storing and reading posts.
///
/// `update` and `delete` are conditional on the post still existing and must
/// be atomic with that check, so a post removed by a concurrent request is
/// never resurrected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by id.
    async fn find_by_id(&self, post_id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Persist a new post.
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Overwrite an existing post, or fail with `Missing`.
    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Remove an existing post, or fail with `Missing`.
    async fn delete(&self, post_id: &PostId) -> Result<(), PostRepositoryError>;

    /// Page through every post in store order.
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, PostRepositoryError>;

    /// Page through the posts owned by `owner_id` in store order.
    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Post>, PostRepositoryError>;
}
