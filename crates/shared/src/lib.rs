//! Shared utilities for the pet groups backend.
//!
//! This crate provides functionality used across the other crates:
//! - Random identifier and invitation code generation

pub mod tokens;
