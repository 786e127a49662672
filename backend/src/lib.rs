//! Identity and access core for a social-posting service.
//!
//! - [`domain`]: users, credentials, bearer tokens, posts and the services
//!   enforcing ownership over them.
//! - [`outbound`]: in-memory adapters for the storage ports.
//! - [`config`]: environment-driven token settings.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
