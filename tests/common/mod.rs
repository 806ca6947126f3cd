//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{system_context, TestRepo, TestRepoBuilder};
pub use self::git::{create_multiple_repos, git, is_git_available, setup_git_repo};
