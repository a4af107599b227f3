//! Group collaboration and permission engine.
//!
//! [`GroupEngine`] answers "may this user do this in this group?" for the
//! content services, and owns the group, membership and invitation writes
//! behind those answers. Persistence is injected as a `domain::store::Store`.

pub mod config;
pub mod engine;
pub mod logging;
pub mod services;

pub use engine::GroupEngine;
