//! Stage and run formatting hooks without committing

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{discover_repos, finish};
use crate::git::to_args;
use crate::repo::RepoContext;
use crate::sync::SyncOrchestrator;

const PRE_COMMIT: &str = "pre-commit";

/// Handles the hooks command
pub async fn handle_hooks_command(
    ctx: Arc<RepoContext>,
    roots: &[PathBuf],
    jobs: Option<usize>,
) -> Result<()> {
    let Some((_, repos)) = discover_repos(&ctx, roots, "Checking").await? else {
        return Ok(());
    };

    let mut sync = SyncOrchestrator::new(repos, jobs);
    let outcome = sync.run_hooks().await.context("checking repositories failed")?;

    if outcome.updated == 0 {
        println!("Everything clean.");
    }
    finish(&outcome)
}

/// Installs pre-commit's git hook into the working copy containing `dir`
pub async fn handle_hooks_install(ctx: &RepoContext, dir: &Path) -> Result<()> {
    let mut args = to_args(&["-C"]);
    args.push(dir.to_string_lossy().into_owned());
    args.extend(to_args(&["rev-parse", "--show-toplevel"]));
    let toplevel = ctx
        .runner
        .run("git", &args, None)
        .await
        .with_context(|| format!("{} is not inside a git repository", dir.display()))?;
    let toplevel = PathBuf::from(toplevel.trim());

    debug!(repo = %toplevel.display(), "installing pre-commit hook");
    ctx.runner
        .run(PRE_COMMIT, &to_args(&["install", "-f"]), Some(&toplevel))
        .await
        .context("failed to install the pre-commit hook")?;
    println!("✅ Installed pre-commit hook in {}", toplevel.display());
    Ok(())
}
