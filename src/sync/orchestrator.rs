//! Fan-out of repository checks and the passes built on top of them
//!
//! Checks and bulk pulls run concurrently, bounded by the configured number
//! of jobs. Anything that prompts the operator runs one repository at a time.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use super::outcome::SyncOutcome;
use crate::core::progress::create_spinner;
use crate::error::SyncError;
use crate::repo::Repo;

pub struct SyncOrchestrator {
    repos: Vec<Repo>,
    jobs: Option<usize>,
}

impl SyncOrchestrator {
    /// `jobs` caps concurrent workers; `None` runs one per repository
    pub fn new(repos: Vec<Repo>, jobs: Option<usize>) -> Self {
        Self { repos, jobs }
    }

    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    fn limit(&self) -> usize {
        self.jobs.unwrap_or(self.repos.len()).max(1)
    }

    /// Runs `check_updates` on every repository concurrently
    ///
    /// The first failure aborts the whole check phase.
    pub async fn check_all(&mut self) -> Result<(), SyncError> {
        let limit = self.limit();
        debug!(repos = self.repos.len(), limit, "checking repositories");
        stream::iter(self.repos.iter_mut().map(|repo| repo.check_updates()))
            .buffer_unordered(limit)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    /// Checks everything, then processes the repositories needing attention in order
    ///
    /// A failure in one repository is recorded and the pass moves on.
    pub async fn refresh(&mut self) -> Result<SyncOutcome, SyncError> {
        self.check_all().await?;

        let mut outcome = SyncOutcome::new(self.repos.len());
        for repo in self.repos.iter_mut().filter(|repo| repo.update()) {
            outcome.updated += 1;
            info!(repo = %repo.title(), "processing");
            match repo.process_updates().await {
                Ok(result) => outcome.record(result),
                Err(err) => {
                    warn!(repo = %repo.title(), error = %err, "processing failed");
                    outcome.record_failure(repo, &err);
                }
            }
        }
        Ok(outcome)
    }

    /// Pulls every repository concurrently, then reports the ones that changed
    pub async fn pull_all(&mut self) -> Result<SyncOutcome, SyncError> {
        let limit = self.limit();
        let spinner = create_spinner(format!("Pulling {} repositories", self.repos.len()));
        let failures: Vec<(usize, SyncError)> = stream::iter(self.repos.iter_mut().enumerate())
            .map(|(index, repo)| async move { repo.pull().await.err().map(|err| (index, err)) })
            .buffer_unordered(limit)
            .filter_map(futures::future::ready)
            .collect()
            .await;
        spinner.finish_and_clear();

        let mut outcome = SyncOutcome::new(self.repos.len());
        for repo in &self.repos {
            if repo.show_pull() {
                outcome.pulled += 1;
            }
        }
        for (index, err) in failures {
            warn!(repo = %self.repos[index].title(), error = %err, "pull failed");
            outcome.record_failure(&self.repos[index], &err);
        }
        Ok(outcome)
    }

    /// Stages and runs hooks in every repository with changes, without committing
    pub async fn run_hooks(&mut self) -> Result<SyncOutcome, SyncError> {
        self.check_all().await?;

        let mut outcome = SyncOutcome::new(self.repos.len());
        for repo in self.repos.iter_mut().filter(|repo| !repo.changes().is_empty()) {
            outcome.updated += 1;
            let pass = async {
                repo.add().await?;
                repo.run_hooks().await
            };
            match pass.await {
                Ok(rewrote) => println!(
                    "{} {}",
                    repo.title(),
                    if rewrote { "hooks rewrote files" } else { "hooks passed" }
                ),
                Err(err) => outcome.record_failure(repo, &err),
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Settings;
    use crate::git::{CommandRunner, CredentialInjector};
    use crate::prompt::Prompt;
    use crate::repo::RepoContext;
    use crate::testing::{MockRunner, Reply, ScriptedPrompt};
    use std::sync::Arc;

    fn orchestrator(
        runner: &Arc<MockRunner>,
        prompt: ScriptedPrompt,
        names: &[&str],
    ) -> SyncOrchestrator {
        let dyn_runner: Arc<dyn CommandRunner> = runner.clone();
        let prompt: Arc<dyn Prompt> = Arc::new(prompt);
        let ctx = Arc::new(RepoContext::new(
            dyn_runner,
            CredentialInjector::with_token("tok"),
            prompt,
            Settings::default(),
        ));
        let repos = names
            .iter()
            .map(|name| Repo::new(format!("/work/{name}"), Arc::clone(&ctx)))
            .collect();
        SyncOrchestrator::new(repos, None)
    }

    #[tokio::test]
    async fn test_check_all_sets_update_consistently() {
        let runner = Arc::new(MockRunner::new());
        runner
            .on("git diff", Reply::ok("diff --git a/a b/a"))
            .on("git diff", Reply::ok(""));
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one", "two"]);

        sync.check_all().await.expect("check");

        for repo in sync.repos() {
            let expected = !repo.changes().is_empty()
                || !repo.status().is_empty()
                || !repo.committed().is_empty();
            assert_eq!(repo.update(), expected);
            if !repo.committed().is_empty() {
                assert!(repo.changes().is_empty() && repo.status().is_empty());
            }
        }
        assert_eq!(sync.repos().iter().filter(|repo| repo.update()).count(), 1);
    }

    #[tokio::test]
    async fn test_check_failure_aborts_run() {
        let runner = Arc::new(MockRunner::new());
        runner.on("git diff", Reply::fail("fatal: not a git repository"));
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one", "two"]);

        assert!(sync.refresh().await.is_err());
        assert_eq!(runner.count("git add"), 0);
    }

    #[tokio::test]
    async fn test_refresh_clean_repositories_prompt_nothing() {
        let runner = Arc::new(MockRunner::new());
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one", "two"]);

        let outcome = sync.refresh().await.expect("refresh");

        assert_eq!(outcome.checked, 2);
        assert_eq!(outcome.updated, 0);
        assert_eq!(runner.count("git add"), 0);
        assert_eq!(runner.count("git push"), 0);
    }

    #[tokio::test]
    async fn test_refresh_continues_after_repository_failure() {
        let runner = Arc::new(MockRunner::new());
        runner
            .on(
                "git status --porcelain -b",
                Reply::ok("## main...origin/main [ahead 1]"),
            )
            .on("git push", Reply::fail("! [rejected] main -> main (fetch first)"))
            .on("git push", Reply::ok(""));
        let prompt = ScriptedPrompt::new().confirm_with(true).confirm_with(true);
        let mut sync = orchestrator(&runner, prompt, &["one", "two"]);

        let outcome = sync.refresh().await.expect("refresh");

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.pushed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(runner.count("git push"), 2);
    }

    #[tokio::test]
    async fn test_pull_all_reports_changed_repositories() {
        let runner = Arc::new(MockRunner::new());
        runner
            .on("git pull", Reply::ok("Updating 1a..2b\n a.txt | 2 +-"))
            .on("git pull", Reply::offline());
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one", "two"]);

        let outcome = sync.pull_all().await.expect("pull");

        assert_eq!(outcome.pulled, 1);
        assert!(!outcome.has_failures());
        assert_eq!(runner.count("git pull"), 2);
    }

    #[tokio::test]
    async fn test_pull_all_records_failures() {
        let runner = Arc::new(MockRunner::new());
        runner.on("git pull", Reply::fail("fatal: refusing to merge unrelated histories"));
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one"]);

        let outcome = sync.pull_all().await.expect("pull");

        assert_eq!(outcome.pulled, 0);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].name, "One");
    }

    #[tokio::test]
    async fn test_run_hooks_stages_without_committing() {
        let runner = Arc::new(MockRunner::new());
        runner
            .on("git diff", Reply::ok("diff --git a/a b/a"))
            .on("git status --porcelain", Reply::ok(" M a"));
        let mut sync = orchestrator(&runner, ScriptedPrompt::new(), &["one"]);

        let outcome = sync.run_hooks().await.expect("hooks");

        assert_eq!(outcome.updated, 1);
        assert_eq!(runner.count("git add ."), 1);
        assert_eq!(runner.count("git commit"), 0);
    }
}
