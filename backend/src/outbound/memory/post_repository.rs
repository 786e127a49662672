//! In-memory `PostRepository` adapter.
//!
//! Posts are kept in insertion order, which is the order listings return.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{Post, PostId, UserId};

/// Post store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

impl InMemoryPostRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Post>>, PostRepositoryError> {
        self.posts
            .lock()
            .map_err(|_| PostRepositoryError::connection("post store lock poisoned"))
    }

    fn position(posts: &[Post], post_id: &PostId) -> Option<usize> {
        posts.iter().position(|post| post.id() == *post_id)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, post_id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let posts = self.lock()?;
        Ok(Self::position(&posts, post_id).and_then(|index| posts.get(index).cloned()))
    }

    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut posts = self.lock()?;
        if Self::position(&posts, &post.id()).is_some() {
            return Err(PostRepositoryError::query(format!(
                "post {} already exists",
                post.id()
            )));
        }
        posts.push(post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut posts = self.lock()?;
        let slot = Self::position(&posts, &post.id())
            .and_then(|index| posts.get_mut(index))
            .ok_or_else(|| PostRepositoryError::missing(post.id().to_string()))?;
        *slot = post.clone();
        Ok(())
    }

    async fn delete(&self, post_id: &PostId) -> Result<(), PostRepositoryError> {
        let mut posts = self.lock()?;
        let index = Self::position(&posts, post_id)
            .ok_or_else(|| PostRepositoryError::missing(post_id.to_string()))?;
        posts.remove(index);
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Post>, PostRepositoryError> {
        let posts = self.lock()?;
        Ok(Page::from_collection(posts.clone(), page))
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Post>, PostRepositoryError> {
        let owned: Vec<Post> = self
            .lock()?
            .iter()
            .filter(|post| post.owner_id() == owner_id)
            .cloned()
            .collect();
        Ok(Page::from_collection(owned, page))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::PostContent;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use tokio::task::JoinSet;

    fn post(owner: &UserId, title: &str) -> Post {
        let content = PostContent::new(title, "body").expect("valid content");
        Post::new(PostId::random(), owner.clone(), content, Utc::now())
    }

    #[fixture]
    fn owner() -> UserId {
        UserId::random()
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_existing_post(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        let original = post(&owner, "Original");
        repo.insert(&original).await.expect("insert succeeds");

        let content = PostContent::new("Edited", "new body").expect("valid content");
        let revised = original.clone().revised(content, Utc::now());
        repo.update(&revised).await.expect("update succeeds");

        let stored = repo.find_by_id(&original.id()).await.expect("lookup");
        assert_eq!(stored, Some(revised));
    }

    #[rstest]
    #[tokio::test]
    async fn update_and_delete_of_missing_post_report_missing(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        let ghost = post(&owner, "Ghost");
        let expected = PostRepositoryError::missing(ghost.id().to_string());

        assert_eq!(repo.update(&ghost).await, Err(expected.clone()));
        assert_eq!(repo.delete(&ghost.id()).await, Err(expected));
        assert_eq!(repo.find_by_id(&ghost.id()).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn update_after_delete_does_not_resurrect(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        let original = post(&owner, "Original");
        repo.insert(&original).await.expect("insert succeeds");
        repo.delete(&original.id()).await.expect("delete succeeds");

        assert!(repo.update(&original).await.is_err());
        assert_eq!(repo.find_by_id(&original.id()).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_ids_are_rejected(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        let original = post(&owner, "Original");
        repo.insert(&original).await.expect("insert succeeds");
        assert!(matches!(
            repo.insert(&original).await,
            Err(PostRepositoryError::Query { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn listings_keep_insertion_order_and_filter_by_owner(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        let other = UserId::random();
        for (author, title) in [(&owner, "one"), (&other, "two"), (&owner, "three")] {
            repo.insert(&post(author, title)).await.expect("insert");
        }

        let all = repo.list(PageRequest::first()).await.expect("list");
        let titles: Vec<&str> = all.items().iter().map(Post::title).collect();
        assert_eq!(titles, ["one", "two", "three"]);

        let mine = repo
            .list_by_owner(&owner, PageRequest::first())
            .await
            .expect("list mine");
        let titles: Vec<&str> = mine.items().iter().map(Post::title).collect();
        assert_eq!(titles, ["one", "three"]);
        assert_eq!(mine.total_items(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn listings_are_paginated(owner: UserId) {
        let repo = InMemoryPostRepository::new();
        for index in 0..5 {
            repo.insert(&post(&owner, &format!("post {index}")))
                .await
                .expect("insert");
        }

        let page = PageRequest::new(1, 2).expect("valid page");
        let listed = repo.list(page).await.expect("list");
        let titles: Vec<&str> = listed.items().iter().map(Post::title).collect();
        assert_eq!(titles, ["post 2", "post 3"]);
        assert_eq!(listed.total_pages(), 3);
        assert!(listed.has_next());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_succeed_once(owner: UserId) {
        let repo = Arc::new(InMemoryPostRepository::new());
        let target = post(&owner, "Contested");
        let post_id = target.id();
        repo.insert(&target).await.expect("insert succeeds");

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            tasks.spawn(async move { repo.delete(&post_id).await });
        }

        let mut deleted = 0;
        while let Some(outcome) = tasks.join_next().await {
            if outcome.expect("task completes").is_ok() {
                deleted += 1;
            }
        }
        assert_eq!(deleted, 1);
    }
}
