//! Core infrastructure shared by every command
//!
//! Configuration, repository discovery, terminal handling and progress
//! spinners live here; commands reach them through [`api`].

pub mod config;
pub mod discovery;
pub(crate) mod progress;
pub mod terminal;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
