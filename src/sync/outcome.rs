//! Aggregated results of one orchestrator pass

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::{ERROR_MESSAGE_MAX_LENGTH, PATH_DISPLAY_WIDTH};
use crate::repo::{Repo, RepoOutcome};

/// A repository whose processing failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoFailure {
    pub name: String,
    pub path: PathBuf,
    pub message: String,
}

/// What a pass over the discovered repositories did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Repositories inspected
    pub checked: usize,
    /// Repositories that needed the operator's attention
    pub updated: usize,
    /// Repositories whose pull brought in remote changes
    pub pulled: usize,
    pub committed: usize,
    pub pushed: usize,
    pub skipped: usize,
    pub failures: Vec<RepoFailure>,
}

impl SyncOutcome {
    pub fn new(checked: usize) -> Self {
        Self {
            checked,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: RepoOutcome) {
        match outcome {
            RepoOutcome::Committed => self.committed += 1,
            RepoOutcome::Pushed => self.pushed += 1,
            RepoOutcome::Skipped => self.skipped += 1,
            RepoOutcome::Cleaned => {}
        }
    }

    pub fn record_failure(&mut self, repo: &Repo, error: &impl std::fmt::Display) {
        self.failures.push(RepoFailure {
            name: repo.title(),
            path: repo.path().to_path_buf(),
            message: clean_error_message(&error.to_string()),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary of an interactive pass
    pub fn generate_summary(&self, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();
        let mut summary = format!(
            "✅ Completed in {:.1}s • {} checked • {} committed • {} pushed",
            duration_secs, self.checked, self.committed, self.pushed
        );
        if self.skipped > 0 {
            summary.push_str(&format!(" • {} skipped", self.skipped));
        }
        if self.has_failures() {
            summary.push_str(&format!(" • {} failed", self.failures.len()));
        }
        summary
    }

    /// Tree of failed repositories, empty when everything succeeded
    pub fn generate_detailed_summary(&self) -> String {
        if self.failures.is_empty() {
            return String::new();
        }
        let mut lines = vec![format!("🔴 FAILED REPOS ({})", self.failures.len())];
        for (i, failure) in self.failures.iter().enumerate() {
            let tree_char = if i == self.failures.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            let short_path = shorten_path(&failure.path, PATH_DISPLAY_WIDTH);
            lines.push(format!(
                "   {} {:20} {:30} # {}",
                tree_char, failure.name, short_path, failure.message
            ));
        }
        lines.join("\n")
    }
}

/// Collapses whitespace and truncates long command errors
pub(crate) fn clean_error_message(error: &str) -> String {
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("Authentication failed") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("CONFLICT") || cleaned.contains("diverged") {
        "merge conflict".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_MAX_LENGTH - 3).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

/// Keeps the last two components of long paths
fn shorten_path(path: &Path, max_length: usize) -> String {
    let display = path.display().to_string();
    if display.chars().count() <= max_length {
        return display;
    }

    let components: Vec<&str> = display.split('/').filter(|s| !s.is_empty()).collect();
    if components.len() <= 2 {
        return display;
    }
    format!(
        ".../{}/{}",
        components[components.len() - 2],
        components[components.len() - 1]
    )
}
