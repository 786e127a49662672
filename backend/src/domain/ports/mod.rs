//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `PostRepository`) describe what the core
//! needs from storage. Driving ports (`UserDirectory`, `PostsCommand`,
//! `PostsQuery`) are what transport adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod post_repository;
mod posts;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use posts::{MockPostsCommand, MockPostsQuery};
pub use posts::{
    CreatePostRequest, DeletePostRequest, ModifyPostRequest, PostsCommand, PostsQuery,
};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
