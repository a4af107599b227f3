//! Persistence layer for the pet groups backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - `PgStore` and `InMemoryStore`, the two implementations of `domain::store::Store`

pub mod db;
pub mod entities;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod repositories;
pub mod retry;
pub mod store;

pub use memory::InMemoryStore;
pub use store::PgStore;
