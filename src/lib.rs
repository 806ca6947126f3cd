//! # autogit
//!
//! `autogit` keeps a machine full of personal git repositories in sync with
//! their remotes. It powers the `autogit` CLI tool.
//!
//! ## Core Features
//!
//! - **Fast Discovery**: Parallel repository scanning using `ignore`.
//! - **Concurrent Checks**: Every repository is inspected at once; the
//!   interactive commit/push pass then visits them one by one.
//! - **Connectivity Recovery**: Pushes that lose the network are retried once
//!   over the configured VPN.
//! - **Credential Injection**: https remotes get the operator's token before
//!   any pull or push.
//!
//! ## Example
//!
//! ```rust,no_run
//! use autogit::core::find_repo_paths;
//!
//! let roots = vec![std::path::PathBuf::from("/home/me/scripts")];
//! for path in find_repo_paths(&roots).expect("readable roots") {
//!     println!("{}", path.display());
//! }
//! ```

pub mod commands;
pub mod core;
pub mod error;
pub mod git;
pub mod hosting;
pub mod prompt;
pub mod repo;
pub mod sync;
pub mod vpn;

#[doc(hidden)]
pub mod testing;

pub use error::SyncError;
pub use repo::{Repo, RepoContext, RepoOutcome};
pub use sync::{SyncOrchestrator, SyncOutcome};
