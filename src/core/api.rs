//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Repository discovery
//! - Settings loading
//! - Terminal utilities

// Configuration
pub use super::config::{resolve_jobs, Settings};

// Discovery
pub use super::discovery::{find_repo_paths, init_command, DiscoveryError};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, SCANNING_MESSAGE};

// Terminal utilities
pub use super::terminal::{set_terminal_title, set_terminal_title_and_flush};

// Internal helpers for command modules
pub(crate) use super::progress::create_spinner;
