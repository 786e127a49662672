//! In-memory repositories.
//!
//! Each repository keeps its records behind one `std::sync::Mutex` and never
//! holds the guard across an `.await`. A poisoned lock is reported as a
//! connection failure, the same way a dropped database connection would be.

mod post_repository;
mod user_repository;

pub use post_repository::InMemoryPostRepository;
pub use user_repository::InMemoryUserRepository;
