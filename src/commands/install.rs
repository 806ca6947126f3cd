//! Install Python packages straight from the operator's repositories

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use super::resolve_user;
use crate::git::{is_ahead, to_args};
use crate::hosting::clone_url;
use crate::repo::RepoContext;

const PIP: &str = "pip";
const PIP_INSTALL: &[&str] = &["install", "--force-reinstall", "--no-deps"];

/// Handles the install command
///
/// Each named repository is installed from GitHub and its local clone under
/// the first root is removed afterwards, unless it holds uncommitted or
/// unpushed work. Without names the current directory is installed in
/// editable mode.
pub async fn handle_install_command(ctx: &RepoContext, names: Vec<String>) -> Result<()> {
    if names.is_empty() {
        let mut args = to_args(PIP_INSTALL);
        args.extend(to_args(&["-e", "."]));
        ctx.runner
            .run(PIP, &args, None)
            .await
            .context("failed to install the current directory")?;
        println!("✅ Installed current directory");
        return Ok(());
    }

    let user = resolve_user(ctx).await?;
    for name in &names {
        let mut args = to_args(PIP_INSTALL);
        args.push(format!("git+{}", clone_url(&user, name)));
        ctx.runner
            .run(PIP, &args, None)
            .await
            .with_context(|| format!("failed to install {name}"))?;
        println!("✅ Installed {name}");
    }

    let root = ctx.settings.clone_root();
    for name in &names {
        let folder = root.join(name);
        if !folder.is_dir() {
            continue;
        }
        if has_local_work(ctx, &folder).await? {
            warn!(folder = %folder.display(), "keeping clone with local work");
            println!("⚠️  Kept {} (local changes)", folder.display());
            continue;
        }
        std::fs::remove_dir_all(&folder)
            .with_context(|| format!("failed to remove {}", folder.display()))?;
    }
    Ok(())
}

/// True when the working copy has changes or commits not on its upstream
async fn has_local_work(ctx: &RepoContext, folder: &Path) -> Result<bool> {
    let mut args = to_args(&["-C"]);
    args.push(folder.to_string_lossy().into_owned());
    args.extend(to_args(&["status", "--porcelain", "-b"]));
    let status = ctx.runner.run("git", &args, None).await?;
    Ok(status
        .lines()
        .any(|line| !line.starts_with("##") || is_ahead(line)))
}
