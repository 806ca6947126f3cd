//! Integration tests for the read-only check phase against real repositories

mod common;

use autogit::core::Settings;
use autogit::{Repo, SyncOrchestrator};
use common::{git, is_git_available, system_context, TestRepoBuilder};
use tempfile::TempDir;

#[tokio::test]
async fn test_clean_repo_needs_nothing() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("scripts");
    let repo = TestRepoBuilder::new("clean")
        .with_upstream()
        .build_in(&root)
        .expect("Failed to create repo");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");

    assert!(checked.changes().is_empty());
    assert!(checked.status().is_empty());
    assert!(checked.committed().is_empty());
    assert!(!checked.update());
}

#[tokio::test]
async fn test_modified_file_is_detected() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let repo = TestRepoBuilder::new("dirty")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");
    repo.write_file("README.md", "# Changed\n").expect("Failed to modify file");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");

    assert!(checked.changes().contains("README.md"));
    assert_eq!(checked.status(), [" M README.md".to_string()]);
    assert!(checked.committed().is_empty());
    assert!(checked.update());
    assert_eq!(
        checked.changed_files().get("README.md").map(String::as_str),
        Some("M")
    );
}

#[tokio::test]
async fn test_untracked_file_is_detected() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let repo = TestRepoBuilder::new("untracked")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");
    repo.write_file("notes.txt", "todo\n").expect("Failed to write file");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");

    assert_eq!(checked.changes(), "notes.txt");
    assert_eq!(checked.status(), ["?? notes.txt".to_string()]);
    assert!(checked.update());
}

#[tokio::test]
async fn test_unpushed_commit_is_detected() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("scripts");
    let repo = TestRepoBuilder::new("ahead")
        .with_upstream()
        .build_in(&root)
        .expect("Failed to create repo");
    repo.commit_file("later.txt", "later\n", "Local only")
        .expect("Failed to commit");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");

    assert!(checked.changes().is_empty());
    assert!(checked.status().is_empty());
    assert_eq!(checked.committed().len(), 1);
    assert!(checked.committed()[0].contains("ahead 1"));
    assert!(checked.update());
}

#[tokio::test]
async fn test_branch_named_ahead_in_sync_is_clean() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("scripts");
    let repo = TestRepoBuilder::new("branchy")
        .with_upstream()
        .build_in(&root)
        .expect("Failed to create repo");
    git(repo.path(), &["checkout", "-q", "-b", "go-ahead"]).expect("Failed to create branch");
    git(repo.path(), &["push", "-q", "-u", "origin", "go-ahead"]).expect("Failed to push branch");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");

    assert!(checked.committed().is_empty(), "{:?}", checked.committed());
    assert!(!checked.update());
}

#[tokio::test]
async fn test_skip_listed_repo_ignores_changes() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let repo = TestRepoBuilder::new("vault")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");
    repo.write_file("README.md", "# Changed\n").expect("Failed to modify file");
    let settings = Settings::parse("no_auto_add = [\"vault\"]").expect("valid settings");

    let mut checked = Repo::new(repo.path(), system_context(settings));
    checked.check_updates().await.expect("check");

    assert!(checked.changes().is_empty());
    assert!(checked.status().is_empty());
    assert!(!checked.update());
}

#[tokio::test]
async fn test_add_stages_everything() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let repo = TestRepoBuilder::new("staging")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");
    repo.write_file("README.md", "# Changed\n").expect("Failed to modify file");
    repo.write_file("new.txt", "new\n").expect("Failed to write file");

    let mut checked = Repo::new(repo.path(), system_context(Settings::default()));
    checked.check_updates().await.expect("check");
    checked.add().await.expect("add");

    assert_eq!(
        checked.status(),
        ["M  README.md".to_string(), "A  new.txt".to_string()]
    );
}

#[tokio::test]
async fn test_orchestrator_checks_every_repo() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("scripts");
    let clean = TestRepoBuilder::new("clean")
        .with_upstream()
        .build_in(&root)
        .expect("Failed to create repo");
    let dirty = TestRepoBuilder::new("dirty")
        .with_upstream()
        .build_in(&root)
        .expect("Failed to create repo");
    dirty.write_file("README.md", "# Changed\n").expect("Failed to modify file");

    let ctx = system_context(Settings::default());
    let repos = vec![
        Repo::new(clean.path(), ctx.clone()),
        Repo::new(dirty.path(), ctx.clone()),
    ];
    let mut sync = SyncOrchestrator::new(repos, Some(1));
    sync.check_all().await.expect("check");

    let needing: Vec<_> = sync
        .repos()
        .iter()
        .filter(|repo| repo.update())
        .map(|repo| repo.path().to_path_buf())
        .collect();
    assert_eq!(needing, vec![dirty.path().to_path_buf()]);
}
