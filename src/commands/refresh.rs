//! Interactive commit and push across every repository
//!
//! All repositories are checked concurrently first; the ones needing
//! attention are then walked through one at a time.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{discover_repos, finish};
use crate::repo::RepoContext;
use crate::sync::SyncOrchestrator;

/// Handles the refresh command
pub async fn handle_refresh_command(
    ctx: Arc<RepoContext>,
    roots: &[PathBuf],
    jobs: Option<usize>,
) -> Result<()> {
    let Some((start_time, repos)) = discover_repos(&ctx, roots, "Checking").await? else {
        return Ok(());
    };

    let mut sync = SyncOrchestrator::new(repos, jobs);
    let outcome = sync.refresh().await.context("checking repositories failed")?;

    if outcome.updated == 0 {
        println!("Everything clean.");
    } else {
        println!("{}", outcome.generate_summary(start_time.elapsed()));
    }
    finish(&outcome)
}
