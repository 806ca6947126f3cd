//! Integration tests for repository discovery functionality

mod common;

use autogit::core::{find_repo_paths, DiscoveryError};
use common::{create_multiple_repos, is_git_available, setup_git_repo, TestRepoBuilder};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_find_multiple_repos() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    create_multiple_repos(temp_dir.path(), 5).expect("Failed to create repos");

    let found = find_repo_paths(&[temp_dir.path().to_path_buf()]).expect("readable root");

    assert_eq!(found.len(), 5, "Should find all 5 repositories");
    for i in 1..=5 {
        assert!(found.contains(&temp_dir.path().join(format!("test-repo-{i}"))));
    }
}

#[test]
fn test_nested_repo_is_not_enumerated() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let outer = TestRepoBuilder::new("outer")
        .build_in(temp_dir.path())
        .expect("Failed to create outer repo");
    let inner = outer.path().join("libs").join("inner");
    fs::create_dir_all(&inner).expect("Failed to create inner dir");
    setup_git_repo(&inner).expect("Failed to init inner repo");

    let found = find_repo_paths(&[temp_dir.path().to_path_buf()]).expect("readable root");

    assert_eq!(found, vec![outer.path().to_path_buf()]);
}

#[test]
fn test_repos_in_nested_folders() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let group = temp_dir.path().join("work").join("clients");
    fs::create_dir_all(&group).expect("Failed to create group dir");
    let repo = TestRepoBuilder::new("site")
        .build_in(&group)
        .expect("Failed to create repo");

    let found = find_repo_paths(&[temp_dir.path().to_path_buf()]).expect("readable root");

    assert_eq!(found, vec![repo.path().to_path_buf()]);
}

#[test]
fn test_repo_named_like_build_output_is_found() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let target = TestRepoBuilder::new("target")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");
    let venv = TestRepoBuilder::new("venv")
        .build_in(temp_dir.path())
        .expect("Failed to create repo");

    let found = find_repo_paths(&[temp_dir.path().to_path_buf()]).expect("readable root");

    assert_eq!(found, vec![target.path().to_path_buf(), venv.path().to_path_buf()]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_repo_is_not_followed() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let elsewhere = TempDir::new().expect("Failed to create temp directory");
    let repo = TestRepoBuilder::new("linked")
        .build_in(elsewhere.path())
        .expect("Failed to create repo");

    let root = TempDir::new().expect("Failed to create temp directory");
    std::os::unix::fs::symlink(repo.path(), root.path().join("linked"))
        .expect("Failed to create symlink");

    let found = find_repo_paths(&[root.path().to_path_buf()]).expect("readable root");

    assert!(found.is_empty(), "symlinks must not be followed: {found:?}");
}

#[test]
fn test_multiple_roots() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let first = TempDir::new().expect("Failed to create temp directory");
    let second = TempDir::new().expect("Failed to create temp directory");
    let a = TestRepoBuilder::new("a")
        .build_in(first.path())
        .expect("Failed to create repo");
    let b = TestRepoBuilder::new("b")
        .build_in(second.path())
        .expect("Failed to create repo");

    let found = find_repo_paths(&[first.path().to_path_buf(), second.path().to_path_buf()])
        .expect("readable roots");

    assert_eq!(found.len(), 2);
    assert!(found.contains(&a.path().to_path_buf()));
    assert!(found.contains(&b.path().to_path_buf()));
}

#[test]
fn test_missing_root_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let missing = temp_dir.path().join("does-not-exist");

    let err = find_repo_paths(&[missing.clone()]).expect_err("missing root must fail");

    assert!(matches!(err, DiscoveryError::UnreadableRoot { ref root, .. } if *root == missing));
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn test_empty_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let found = find_repo_paths(&[temp_dir.path().to_path_buf()]).expect("readable root");
    assert!(found.is_empty());
}
