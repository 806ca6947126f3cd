//! A single working copy and its commit/push cycle
//!
//! [`Repo::check_updates`] is read-only and safe to run concurrently across
//! repositories. [`Repo::process_updates`] talks to the operator and must run
//! one repository at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::config::{Settings, ALREADY_UP_TO_DATE, PRE_COMMIT_CONFIG, SHOW_ANSWER};
use crate::core::progress::create_spinner;
use crate::core::terminal;
use crate::error::SyncError;
use crate::git::status::render_verbose_status;
use crate::git::{
    changed_files, is_ahead, to_args, CommandError, CommandRunner, CredentialInjector,
};
use crate::prompt::Prompt;
use crate::vpn::{VpnController, VpnError};

const COMMIT_PROMPT: &str = "Commit message";
const RETRY_PUSH_PROMPT: &str = "Retry push?";
const CANCEL_ANSWERS: &[&str] = &["n", "no", "cancel"];

/// Collaborators shared by every repository in a run
pub struct RepoContext {
    pub runner: Arc<dyn CommandRunner>,
    pub vpn: VpnController,
    pub credentials: CredentialInjector,
    pub prompt: Arc<dyn Prompt>,
    pub settings: Settings,
}

impl RepoContext {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        credentials: CredentialInjector,
        prompt: Arc<dyn Prompt>,
        settings: Settings,
    ) -> Self {
        Self {
            vpn: VpnController::new(Arc::clone(&runner)),
            runner,
            credentials,
            prompt,
            settings,
        }
    }
}

/// What processing a repository ended with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoOutcome {
    /// A new commit was created and pushed
    Committed,
    /// Previously committed work was pushed
    Pushed,
    /// The operator declined to commit or push
    Skipped,
    /// Nothing was left to do after staging and hooks
    Cleaned,
}

/// Remote operations that get credentials and connectivity handling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Remote {
    Pull,
    Push,
}

impl Remote {
    fn of(args: &[&str]) -> Option<Self> {
        match args.first() {
            Some(&"pull") => Some(Remote::Pull),
            Some(&"push") => Some(Remote::Push),
            _ => None,
        }
    }
}

pub struct Repo {
    path: PathBuf,
    ctx: Arc<RepoContext>,
    changes: String,
    status: Vec<String>,
    committed: Vec<String>,
    pull_output: Option<String>,
    vpn_activated: bool,
    changed_files: OnceLock<BTreeMap<String, String>>,
}

impl Repo {
    pub fn new(path: impl Into<PathBuf>, ctx: Arc<RepoContext>) -> Self {
        Self {
            path: path.into(),
            ctx,
            changes: String::new(),
            status: Vec::new(),
            committed: Vec::new(),
            pull_output: None,
            vpn_activated: false,
            changed_files: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name with its first letter capitalised
    pub fn title(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => name,
        }
    }

    pub fn changes(&self) -> &str {
        &self.changes
    }

    pub fn status(&self) -> &[String] {
        &self.status
    }

    pub fn committed(&self) -> &[String] {
        &self.committed
    }

    pub fn pull_output(&self) -> Option<&str> {
        self.pull_output.as_deref()
    }

    pub fn vpn_activated(&self) -> bool {
        self.vpn_activated
    }

    /// Whether the repository needs the operator's attention
    pub fn update(&self) -> bool {
        !self.changes.is_empty() || !self.status.is_empty() || !self.committed.is_empty()
    }

    /// Filename → status symbol, captured the first time it is needed
    pub fn changed_files(&self) -> &BTreeMap<String, String> {
        self.changed_files.get_or_init(|| changed_files(&self.status))
    }

    async fn git(&self, args: &[&str]) -> Result<String, CommandError> {
        let mut full = Vec::with_capacity(args.len() + 2);
        full.push("-C".to_string());
        full.push(self.path.to_string_lossy().into_owned());
        full.extend(to_args(args));
        self.ctx.runner.run("git", &full, None).await
    }

    async fn git_lines(&self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        Ok(self
            .git(args)
            .await?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn read_status(&self) -> Result<Vec<String>, CommandError> {
        self.git_lines(&["status", "--porcelain"]).await
    }

    /// Inspects the working copy without modifying it
    pub async fn check_updates(&mut self) -> Result<(), SyncError> {
        if self.ctx.settings.auto_add_enabled(&self.path) {
            let mut changes = self.git(&["diff"]).await?;
            if changes.is_empty() {
                changes = self
                    .git(&["ls-files", "--others", "--exclude-standard"])
                    .await?;
            }
            self.changes = changes;
            self.status = self.read_status().await?;
        } else {
            self.changes.clear();
            self.status.clear();
        }

        self.committed = if self.changes.is_empty() && self.status.is_empty() {
            self.git_lines(&["status", "--porcelain", "-b"])
                .await?
                .into_iter()
                .filter(|line| is_ahead(line))
                .collect()
        } else {
            Vec::new()
        };

        debug!(
            repo = %self.title(),
            changes = !self.changes.is_empty(),
            staged = self.status.len(),
            ahead = !self.committed.is_empty(),
            "checked"
        );
        Ok(())
    }

    /// Stages everything and refreshes the status lines
    pub async fn add(&mut self) -> Result<(), SyncError> {
        self.git(&["add", "."]).await?;
        self.status = self.read_status().await?;
        Ok(())
    }

    /// Runs pre-commit hooks when the repository configures them
    ///
    /// Returns true when the hooks failed or rewrote files, in which case the
    /// result has been staged again.
    pub async fn run_hooks(&mut self) -> Result<bool, SyncError> {
        if !self.path.join(PRE_COMMIT_CONFIG).is_file() {
            return Ok(false);
        }
        let hooks = self
            .ctx
            .runner
            .run("pre-commit", &to_args(&["run"]), Some(&self.path))
            .await;
        match hooks {
            Ok(_) => Ok(false),
            Err(CommandError::Spawn { source, .. }) => {
                warn!(repo = %self.title(), error = %source, "pre-commit could not be started");
                Ok(false)
            }
            Err(err) => {
                debug!(repo = %self.title(), error = %err, "hooks changed files");
                self.add().await?;
                Ok(true)
            }
        }
    }

    /// Pulls and records the output
    pub async fn pull(&mut self) -> Result<&str, SyncError> {
        let output = self.run(&["pull"]).await?;
        Ok(self.pull_output.insert(output).as_str())
    }

    /// Whether the last pull brought anything in
    pub fn has_remote_changes(&self) -> bool {
        self.pull_output
            .as_deref()
            .is_some_and(|output| !output.contains(ALREADY_UP_TO_DATE))
    }

    /// Prints the pull output under a banner if it brought anything in
    pub fn show_pull(&self) -> bool {
        match self.pull_output.as_deref() {
            Some(output) if self.has_remote_changes() => {
                terminal::print_rule(&self.title());
                println!("{output}");
                true
            }
            _ => false,
        }
    }

    /// Pulls on a separate task while the operator is busy
    ///
    /// Failures are logged and yield `None`.
    fn spawn_pull(&self) -> JoinHandle<Option<String>> {
        let mut background = Repo::new(self.path.clone(), Arc::clone(&self.ctx));
        tokio::spawn(async move {
            match background.run(&["pull"]).await {
                Ok(output) => Some(output),
                Err(err) => {
                    warn!(repo = %background.title(), error = %err, "background pull failed");
                    None
                }
            }
        })
    }

    /// Runs a git command with credential and connectivity handling
    ///
    /// Pushes that lose connectivity are retried once over the VPN; pulls that
    /// lose connectivity report no remote changes. A VPN brought up here is
    /// always taken down again before returning.
    pub async fn run(&mut self, args: &[&str]) -> Result<String, SyncError> {
        let remote = Remote::of(args);
        if remote.is_some() {
            self.ensure_credentials().await?;
        }

        let first = self.git(args).await;
        let outcome = match first {
            Ok(output) => Ok(output),
            Err(err) if err.is_connectivity() => match remote {
                Some(Remote::Push) => self.retry_over_vpn(args, err).await,
                Some(Remote::Pull) => {
                    warn!(repo = %self.title(), error = %err, "pull lost connectivity");
                    Ok(ALREADY_UP_TO_DATE.to_string())
                }
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        };
        self.release_vpn(outcome).await
    }

    async fn retry_over_vpn(
        &mut self,
        args: &[&str],
        failure: CommandError,
    ) -> Result<String, SyncError> {
        match self.ctx.vpn.is_connected().await {
            Ok(true) => {}
            Ok(false) => {
                info!(repo = %self.title(), "push lost connectivity, connecting vpn");
                if let Err(err) = self.ctx.vpn.connect().await {
                    warn!(repo = %self.title(), error = %err, "vpn failed to connect");
                    return Err(failure.into());
                }
                self.vpn_activated = true;
            }
            Err(VpnError::NotFound { .. }) => {
                warn!(repo = %self.title(), "push lost connectivity and no vpn is configured");
                return Err(failure.into());
            }
            Err(err) => {
                warn!(
                    repo = %self.title(),
                    error = %err,
                    "push lost connectivity and the vpn is unavailable"
                );
                return Err(failure.into());
            }
        }
        Ok(self.git(args).await?)
    }

    async fn release_vpn(
        &mut self,
        outcome: Result<String, SyncError>,
    ) -> Result<String, SyncError> {
        if !self.vpn_activated {
            return outcome;
        }
        self.vpn_activated = false;
        let released = self.ctx.vpn.disconnect().await;
        match (outcome, released) {
            (Ok(output), Ok(())) => Ok(output),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release)) => {
                warn!(repo = %self.title(), error = %release, "failed to disconnect vpn");
                Err(err)
            }
        }
    }

    /// Embeds the access token into an https origin lacking credentials
    async fn ensure_credentials(&self) -> Result<(), SyncError> {
        let url = match self.git(&["config", "--get", "remote.origin.url"]).await {
            Ok(url) => url,
            // git exits 1 when the key is unset
            Err(err) if err.status() == Some(1) => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        if let Some(rewritten) = self.ctx.credentials.inject(url.trim()).await? {
            debug!(repo = %self.title(), "embedding access token in origin url");
            self.git(&["config", "remote.origin.url", &rewritten]).await?;
        }
        Ok(())
    }

    /// Walks the operator through committing and pushing this repository
    ///
    /// The screen is cleared when processing ends, whether or not it succeeded.
    pub async fn process_updates(&mut self) -> Result<RepoOutcome, SyncError> {
        terminal::clear_screen();
        terminal::print_rule(&self.title());
        let outcome = self.stage_and_publish().await;
        terminal::clear_screen();
        outcome
    }

    async fn stage_and_publish(&mut self) -> Result<RepoOutcome, SyncError> {
        if !self.changes.is_empty() {
            let spinner = create_spinner("Adding changes");
            let added = self.add().await;
            spinner.finish_and_clear();
            added?;
        }
        if !self.status.is_empty() {
            self.run_hooks().await?;
        }

        let outcome = if !self.status.is_empty() {
            self.commit_and_push().await?
        } else if !self.committed.is_empty() {
            for line in &self.committed {
                println!("{line}");
            }
            if self.confirm(RETRY_PUSH_PROMPT, true).await? {
                self.run(&["push"]).await?;
                RepoOutcome::Pushed
            } else {
                RepoOutcome::Skipped
            }
        } else {
            println!("cleaned");
            RepoOutcome::Cleaned
        };
        Ok(outcome)
    }

    async fn commit_and_push(&mut self) -> Result<RepoOutcome, SyncError> {
        self.show_status().await?;
        let pull = self.spawn_pull();

        let message = loop {
            match self.ask_commit_message().await? {
                Some(answer) if answer == SHOW_ANSWER => self.show_verbose_status(true).await?,
                answer => break answer,
            }
        };

        // Commit on top of whatever the pull brought in
        self.pull_output = pull.await?;

        match message {
            Some(message) if self.accepts_message(&message) => {
                self.run(&["commit", "-m", &message]).await?;
                self.run(&["push"]).await?;
                Ok(RepoOutcome::Committed)
            }
            Some(_) => {
                println!("Commit message too short, nothing committed");
                Ok(RepoOutcome::Skipped)
            }
            None => Ok(RepoOutcome::Skipped),
        }
    }

    fn accepts_message(&self, message: &str) -> bool {
        message.chars().count() > self.ctx.settings.min_message_len
    }

    async fn ask_commit_message(&self) -> Result<Option<String>, SyncError> {
        let prompt = Arc::clone(&self.ctx.prompt);
        let answer = tokio::task::spawn_blocking(move || prompt.ask(COMMIT_PROMPT)).await??;
        Ok(answer
            .map(|answer| answer.trim().to_string())
            .filter(|answer| {
                !answer.is_empty() && !CANCEL_ANSWERS.contains(&answer.to_lowercase().as_str())
            }))
    }

    async fn confirm(&self, question: &'static str, default: bool) -> Result<bool, SyncError> {
        let prompt = Arc::clone(&self.ctx.prompt);
        Ok(tokio::task::spawn_blocking(move || prompt.confirm(question, default)).await??)
    }

    /// Shows the staged changes, truncated to the terminal height
    pub async fn show_status(&self) -> Result<(), SyncError> {
        self.changed_files();
        self.show_verbose_status(false).await
    }

    /// Renders `git status -v` file by file
    ///
    /// With `force` the screen is cleared and every section is shown.
    pub async fn show_verbose_status(&self, force: bool) -> Result<(), SyncError> {
        let output = self
            .git(&["-c", "color.ui=always", "status", "-v"])
            .await?;
        let lines: Vec<String> = output.lines().map(str::to_string).collect();

        if force {
            terminal::clear_screen();
            terminal::print_rule(&self.title());
        }
        let budget = (!force).then(terminal::diff_budget);
        for line in render_verbose_status(&lines, self.changed_files(), budget) {
            println!("{line}");
        }
        Ok(())
    }
}
