//! watchsync_core - shared domain types and traits for the watchsync project.
//!
//! This crate holds everything that is pure or boundary-shaped: the tracked
//! entry domain model, the error taxonomy, the repository/cache/verifier
//! traits, cache key canonicalization, and the retry policy. No I/O happens
//! here; the `watchsync` and `watchsync_client` crates provide the
//! implementations.

pub mod auth;
pub mod cache;
pub mod media;
pub mod retry;
pub mod storage;
