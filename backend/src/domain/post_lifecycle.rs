//! Post lifecycle service.
//!
//! Every mutation walks the same steps: resolve the actor, fetch the post,
//! check ownership, then apply. The store's conditional update and delete
//! close the gap between the fetch and the write, so a post deleted by a
//! concurrent request surfaces as `ResourceNotFound` here too.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info};

use crate::domain::ports::{
    CreatePostRequest, DeletePostRequest, ModifyPostRequest, PostRepository, PostRepositoryError,
    PostsCommand, PostsQuery, UserDirectory,
};
use crate::domain::{AuthorizationGuard, Error, Post, PostId, UserIdentity, Username};

/// Post service implementing the [`PostsCommand`] and [`PostsQuery`] ports.
#[derive(Clone)]
pub struct PostLifecycleService<D, P> {
    directory: Arc<D>,
    posts: Arc<P>,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
}

impl<D, P> PostLifecycleService<D, P> {
    /// Create a service resolving actors through `directory` and storing
    /// posts in `posts`.
    pub fn new(directory: Arc<D>, posts: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            posts,
            guard: AuthorizationGuard,
            clock,
        }
    }
}

impl<D, P> PostLifecycleService<D, P>
where
    D: UserDirectory,
    P: PostRepository,
{
    fn map_repository_error(error: PostRepositoryError) -> Error {
        match error {
            PostRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("post repository unavailable: {message}"))
            }
            PostRepositoryError::Query { message } => {
                Error::internal(format!("post repository error: {message}"))
            }
            PostRepositoryError::Missing { post_id } => Error::resource_not_found(post_id),
        }
    }

    async fn fetch(&self, post_id: PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(&post_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| {
                debug!(%post_id, "post not found");
                Error::resource_not_found(post_id)
            })
    }

    /// Resolve the actor and load a post they own.
    async fn fetch_owned(
        &self,
        actor: &Username,
        post_id: PostId,
    ) -> Result<(UserIdentity, Post), Error> {
        let identity = self.directory.resolve(actor).await?;
        let post = self.fetch(post_id).await?;
        self.guard
            .authorize_owner_action(&identity, post.owner_id(), post.id())?;
        Ok((identity, post))
    }
}

#[async_trait]
impl<D, P> PostsCommand for PostLifecycleService<D, P>
where
    D: UserDirectory,
    P: PostRepository,
{
    async fn create(&self, request: CreatePostRequest) -> Result<Post, Error> {
        let CreatePostRequest { actor, content } = request;
        let identity = self.directory.resolve(&actor).await?;
        let post = Post::new(
            PostId::random(),
            identity.id().clone(),
            content,
            self.clock.utc(),
        );
        self.posts
            .insert(&post)
            .await
            .map_err(Self::map_repository_error)?;

        info!(post_id = %post.id(), owner = %actor, "created post");
        Ok(post)
    }

    async fn modify(&self, request: ModifyPostRequest) -> Result<Post, Error> {
        let ModifyPostRequest {
            actor,
            post_id,
            content,
        } = request;
        let (_, post) = self.fetch_owned(&actor, post_id).await?;
        let revised = post.revised(content, self.clock.utc());
        self.posts
            .update(&revised)
            .await
            .map_err(Self::map_repository_error)?;

        info!(%post_id, owner = %actor, "modified post");
        Ok(revised)
    }

    async fn delete(&self, request: DeletePostRequest) -> Result<(), Error> {
        let DeletePostRequest { actor, post_id } = request;
        self.fetch_owned(&actor, post_id).await?;
        self.posts
            .delete(&post_id)
            .await
            .map_err(Self::map_repository_error)?;

        info!(%post_id, owner = %actor, "deleted post");
        Ok(())
    }
}

#[async_trait]
impl<D, P> PostsQuery for PostLifecycleService<D, P>
where
    D: UserDirectory,
    P: PostRepository,
{
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, Error> {
        self.posts
            .list(page)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn list_mine(&self, actor: &Username, page: PageRequest) -> Result<Page<Post>, Error> {
        let identity = self.directory.resolve(actor).await?;
        self.posts
            .list_by_owner(identity.id(), page)
            .await
            .map_err(Self::map_repository_error)
    }
}
