//! services/api/src/lib.rs
//!
//! Library crate backing the `api` and `openapi` binaries, and the surface
//! the integration tests drive.

pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod web;
