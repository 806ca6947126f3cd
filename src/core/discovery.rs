//! Repository discovery and initialization utilities

use dashmap::DashSet;
use ignore::{WalkBuilder, WalkState};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{ESTIMATED_REPO_COUNT, MAX_WALK_THREADS};
use crate::repo::{Repo, RepoContext};

const GIT_DIR: &str = ".git";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read root {}: {source}", .root.display())]
    UnreadableRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("repository discovery was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Check if a .git file (for submodules/worktrees) contains gitdir reference
/// Only reads the first 5 lines for efficiency
fn is_git_file(path: &Path) -> bool {
    match fs::File::open(path) {
        Ok(file) => BufReader::new(file)
            .lines()
            .take(5)
            .map_while(Result::ok)
            .any(|line| line.trim_start().starts_with("gitdir:")),
        Err(_) => false,
    }
}

/// True when `dir` directly contains git metadata
fn is_working_copy(dir: &Path) -> bool {
    let marker = dir.join(GIT_DIR);
    match fs::symlink_metadata(&marker) {
        Ok(meta) if meta.is_dir() => true,
        Ok(meta) if meta.is_file() => is_git_file(&marker),
        _ => false,
    }
}

/// Finds every working copy under `roots`
///
/// Symbolic links are not followed and the walk stops at the first working
/// copy on each branch, so nested repositories are not reported. Every root
/// must be readable. The result is sorted by path.
pub fn find_repo_paths(roots: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
    for root in roots {
        fs::read_dir(root).map_err(|source| DiscoveryError::UnreadableRoot {
            root: root.clone(),
            source,
        })?;
    }
    let Some((first, rest)) = roots.split_first() else {
        return Ok(Vec::new());
    };

    let found = Arc::new(DashSet::with_capacity(ESTIMATED_REPO_COUNT));

    let mut builder = WalkBuilder::new(first);
    for root in rest {
        builder.add(root);
    }
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .threads(num_cpus::get().min(MAX_WALK_THREADS))
        .filter_entry(|entry| entry.file_name() != GIT_DIR);

    builder.build_parallel().run(|| {
        let found = Arc::clone(&found);
        Box::new(move |entry: Result<ignore::DirEntry, ignore::Error>| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    return WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return WalkState::Continue;
            }
            if is_working_copy(entry.path()) {
                found.insert(entry.path().to_path_buf());
                // Nested repositories belong to this one
                return WalkState::Skip;
            }
            WalkState::Continue
        })
    });

    let mut repos: Vec<PathBuf> = match Arc::try_unwrap(found) {
        Ok(set) => set.into_iter().collect(),
        Err(shared) => shared.iter().map(|path| path.key().clone()).collect(),
    };
    repos.sort();
    debug!(count = repos.len(), "discovered repositories");
    Ok(repos)
}

/// Common initialization for commands that scan repositories
///
/// Prints `scanning_msg` without a newline so the caller can overwrite it,
/// then walks `roots` on the blocking pool and wraps each working copy in a
/// [`Repo`] sharing `ctx`.
pub async fn init_command(
    scanning_msg: &str,
    roots: &[PathBuf],
    ctx: &Arc<RepoContext>,
) -> Result<(Instant, Vec<Repo>), DiscoveryError> {
    println!();
    print!("{scanning_msg}");
    // Flush stdout - ignore errors as this is non-critical
    let _ = std::io::stdout().flush();

    let start_time = Instant::now();
    let roots = roots.to_vec();
    let paths = tokio::task::spawn_blocking(move || find_repo_paths(&roots)).await??;
    let repos = paths
        .into_iter()
        .map(|path| Repo::new(path, Arc::clone(ctx)))
        .collect();

    Ok((start_time, repos))
}
