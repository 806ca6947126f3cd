//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autogit::core::Settings;
use autogit::git::{CommandRunner, CredentialInjector, SystemRunner};
use autogit::prompt::Prompt;
use autogit::testing::ScriptedPrompt;
use autogit::RepoContext;

use super::git::{add_bare_upstream, create_test_commit, setup_git_repo};

/// Context running real git, with a fixed token and no operator
pub fn system_context(settings: Settings) -> Arc<RepoContext> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let prompt: Arc<dyn Prompt> = Arc::new(ScriptedPrompt::new());
    Arc::new(RepoContext::new(
        runner,
        CredentialInjector::with_token("test-token"),
        prompt,
        settings,
    ))
}

/// A working copy created inside a caller-owned directory
pub struct TestRepo {
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or overwrite a file in the repository
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path.join(name);
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Result<()> {
        create_test_commit(&self.path, name, content, message)
    }
}

/// Builder for creating test repositories
pub struct TestRepoBuilder {
    name: String,
    with_upstream: bool,
    with_commits: usize,
}

impl TestRepoBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            with_upstream: false,
            with_commits: 1,
        }
    }

    /// Track a bare repository created next to `parent` as `origin`
    pub fn with_upstream(mut self) -> Self {
        self.with_upstream = true;
        self
    }

    pub fn with_commits(mut self, count: usize) -> Self {
        self.with_commits = count;
        self
    }

    /// Creates the repository at `parent/<name>`
    ///
    /// The bare upstream, when requested, lives at `parent/../remotes/<name>.git`
    /// so discovery under `parent` never sees it.
    pub fn build_in(self, parent: &Path) -> Result<TestRepo> {
        let path = parent.join(&self.name);
        std::fs::create_dir_all(&path)?;
        setup_git_repo(&path)?;

        create_test_commit(&path, "README.md", "# Test Repo\n", "Initial commit")?;
        for i in 2..=self.with_commits {
            create_test_commit(
                &path,
                &format!("file{i}.txt"),
                &format!("Content {i}\n"),
                &format!("Commit {i}"),
            )?;
        }

        if self.with_upstream {
            let remotes = parent
                .parent()
                .unwrap_or(parent)
                .join("remotes")
                .join(format!("{}.git", self.name));
            add_bare_upstream(&path, &remotes)?;
        }

        Ok(TestRepo { path })
    }
}
