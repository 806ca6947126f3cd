//! Clone the operator's repositories into the first root

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{hosting_client, resolve_user};
use crate::core::create_spinner;
use crate::git::{CredentialError, to_args};
use crate::hosting::clone_url;
use crate::repo::RepoContext;

/// Handles the clone command
///
/// Without names, the operator picks one of their repositories on GitHub.
/// Folders that already exist are left alone.
pub async fn handle_clone_command(ctx: &RepoContext, names: Vec<String>) -> Result<()> {
    let names = if names.is_empty() {
        match choose_repo(ctx).await? {
            Some(name) => vec![name],
            None => return Ok(()),
        }
    } else {
        names
    };

    let user = resolve_user(ctx).await?;
    let root = ctx.settings.clone_root();
    for name in names {
        let folder = root.join(&name);
        if folder.exists() {
            println!("⏭️  {name} already exists at {}", folder.display());
            continue;
        }
        clone_into(ctx, &clone_url(&user, &name), &folder)
            .await
            .with_context(|| format!("failed to clone {name}"))?;
        println!("✅ Cloned {name} into {}", folder.display());
    }
    Ok(())
}

async fn choose_repo(ctx: &RepoContext) -> Result<Option<String>> {
    let spinner = create_spinner("Fetching repo list");
    let listing = async { hosting_client(ctx).await?.own_repositories().await }.await;
    spinner.finish_and_clear();
    let repos = listing?;

    let prompt = Arc::clone(&ctx.prompt);
    let choice = tokio::task::spawn_blocking(move || prompt.choose("Choose repo", &repos)).await??;
    Ok(choice)
}

async fn clone_into(ctx: &RepoContext, url: &str, folder: &Path) -> Result<()> {
    let url = match ctx.credentials.inject(url).await {
        Ok(Some(authenticated)) => authenticated,
        Ok(None) => url.to_string(),
        Err(CredentialError::Missing { .. }) => {
            debug!("no access token, cloning anonymously");
            url.to_string()
        }
        Err(err) => return Err(err.into()),
    };
    let mut args = to_args(&["clone", &url]);
    args.push(folder.to_string_lossy().into_owned());
    ctx.runner.run("git", &args, None).await?;
    Ok(())
}
