//! Domain layer for the pet groups backend.
//!
//! This crate contains:
//! - Domain models (Group, Membership, Invitation, roles and permissions)
//! - The permission evaluator and clock services
//! - Store traits implemented by the persistence layer
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{GroupError, StoreError};
