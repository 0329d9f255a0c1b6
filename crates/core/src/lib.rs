//! Domain logic for the recipe service.
//!
//! Everything here is pure: payload validation and sanitization, list query
//! composition, and the shared error and id types. I/O lives in the `db`,
//! `events`, `storage` and `api` crates.

pub mod error;
pub mod query;
pub mod recipe;
pub mod truthy;
pub mod types;
