//! Pull every repository and report what came in

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{discover_repos, finish};
use crate::repo::RepoContext;
use crate::sync::SyncOrchestrator;

const NO_REMOTE_CHANGES: &str = "No remote changes ✓";

/// Handles the pull command
pub async fn handle_pull_command(
    ctx: Arc<RepoContext>,
    roots: &[PathBuf],
    jobs: Option<usize>,
) -> Result<()> {
    let Some((_, repos)) = discover_repos(&ctx, roots, "Pulling").await? else {
        return Ok(());
    };

    let mut sync = SyncOrchestrator::new(repos, jobs);
    let outcome = sync.pull_all().await.context("pulling repositories failed")?;

    if outcome.pulled == 0 && !outcome.has_failures() {
        println!("{NO_REMOTE_CHANGES}");
    }
    finish(&outcome)
}
