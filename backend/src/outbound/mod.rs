//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local repositories behind a mutex, honouring the
//!   same uniqueness and conditional-write guarantees a database adapter
//!   must provide.
//!
//! Adapters are thin translators between domain types and storage. They
//! contain no business logic.

pub mod memory;
