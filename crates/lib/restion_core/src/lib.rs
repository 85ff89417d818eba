//! # restion_core
//!
//! Core domain logic for the Restion backend.

pub mod auth;
pub mod cleanup;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
