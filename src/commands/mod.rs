//! One handler per CLI verb

pub mod clone;
pub mod hooks;
pub mod install;
pub mod pull;
pub mod refresh;
pub mod vpn;

pub use clone::handle_clone_command;
pub use hooks::{handle_hooks_command, handle_hooks_install};
pub use install::handle_install_command;
pub use pull::handle_pull_command;
pub use refresh::handle_refresh_command;
pub use vpn::{handle_vpn_command, VpnAction};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::core::{init_command, NO_REPOS_MESSAGE, SCANNING_MESSAGE};
use crate::hosting::GitHubClient;
use crate::repo::{Repo, RepoContext};
use crate::sync::SyncOutcome;

/// Scans `roots` (the configured roots when empty) and announces what was found
///
/// Returns `None` after telling the operator when nothing was found.
pub(crate) async fn discover_repos(
    ctx: &Arc<RepoContext>,
    roots: &[PathBuf],
    verb: &str,
) -> Result<Option<(Instant, Vec<Repo>)>> {
    let roots = if roots.is_empty() {
        ctx.settings.roots.clone()
    } else {
        roots.to_vec()
    };
    let (start_time, repos) = init_command(SCANNING_MESSAGE, &roots, ctx).await?;

    if repos.is_empty() {
        println!("\r{NO_REPOS_MESSAGE}");
        return Ok(None);
    }

    let total_repos = repos.len();
    let repo_word = if total_repos == 1 {
        "repository"
    } else {
        "repositories"
    };
    print!("\r🚀 {verb} {total_repos} {repo_word}                    \n");
    Ok(Some((start_time, repos)))
}

/// Prints the failure tree and turns failures into an error for the exit status
pub(crate) fn finish(outcome: &SyncOutcome) -> Result<()> {
    if !outcome.has_failures() {
        return Ok(());
    }
    println!();
    println!("{}", outcome.generate_detailed_summary());
    anyhow::bail!(
        "{} of {} repositories failed",
        outcome.failures.len(),
        outcome.checked
    )
}

/// Account clone URLs are built from: configured, or asked of the hosting API
pub(crate) async fn resolve_user(ctx: &RepoContext) -> Result<String> {
    if let Some(user) = &ctx.settings.github_user {
        return Ok(user.clone());
    }
    hosting_client(ctx).await?.current_user().await
}

pub(crate) async fn hosting_client(ctx: &RepoContext) -> Result<GitHubClient> {
    let token = ctx
        .credentials
        .token()
        .await
        .context("an access token is needed to talk to GitHub")?;
    GitHubClient::new(token)
}
