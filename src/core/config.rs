//! Configuration constants and settings

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// Environment
pub const CONFIG_ENV: &str = "AUTOGIT_CONFIG";
pub const LOG_ENV: &str = "AUTOGIT_LOG";
pub const DEFAULT_TOKEN_ENV: &str = "GITTOKEN";
const CONFIG_DIR_NAME: &str = "autogit";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_ROOT_NAME: &str = "scripts";

// Prompting
pub const DEFAULT_MIN_MESSAGE_LEN: usize = 5;
pub const SHOW_ANSWER: &str = "show";

// Git output markers
pub const ALREADY_UP_TO_DATE: &str = "Already up to date.";
pub const PRE_COMMIT_CONFIG: &str = ".pre-commit-config.yaml";

// Hosting
pub const GITHUB_HOST: &str = "https://github.com";
pub const GITHUB_API: &str = "https://api.github.com";

// Network manager
pub const VPN_CONNECTION_TYPE: &str = "vpn";

// UI Constants
pub const SCANNING_MESSAGE: &str = "🔍 Scanning for git repositories...";
pub const NO_REPOS_MESSAGE: &str = "No git repositories found under the configured roots.";
pub const SPINNER_TEMPLATE: &str = "{spinner} {msg}";
pub const TERMINAL_RESERVED_LINES: u16 = 6;
pub const FALLBACK_TERMINAL_HEIGHT: u16 = 24;
pub const PATH_DISPLAY_WIDTH: usize = 30;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 60;

// Repository discovery configuration
pub const ESTIMATED_REPO_COUNT: usize = 50; // Pre-allocation hint for collections
pub const MAX_WALK_THREADS: usize = 8;

/// Operator settings, read from `config.toml`
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directories searched for working copies
    pub roots: Vec<PathBuf>,
    /// Repository directory names excluded from automatic staging
    pub no_auto_add: BTreeSet<String>,
    /// Environment variable holding the access token
    pub token_env: String,
    /// Credential store command printing the access token
    pub token_command: Option<Vec<String>>,
    /// Hosting account used to build clone URLs
    pub github_user: Option<String>,
    /// Cap on concurrent check and pull workers
    pub jobs: Option<usize>,
    /// Commit messages must be longer than this many characters
    pub min_message_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roots: vec![default_root()],
            no_auto_add: BTreeSet::new(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            token_command: None,
            github_user: None,
            jobs: None,
            min_message_len: DEFAULT_MIN_MESSAGE_LEN,
        }
    }
}

impl Settings {
    /// Loads settings from `explicit`, `$AUTOGIT_CONFIG`, or the user config directory
    ///
    /// A missing default file yields the defaults; an explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.roots = settings.roots.iter().map(|root| expand_home(root)).collect();
        Ok(settings)
    }

    /// Whether changes in the repository at `path` are staged automatically
    pub fn auto_add_enabled(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(true, |name| !self.no_auto_add.contains(name))
    }

    /// Directory new clones land in
    pub fn clone_root(&self) -> PathBuf {
        self.roots.first().cloned().unwrap_or_else(default_root)
    }
}

/// Determines the worker cap for the check and pull phases
///
/// Priority order:
/// 1. --jobs N flag → N
/// 2. `jobs` in config.toml → N
/// 3. Default → None (one worker per repository)
pub fn resolve_jobs(cli_jobs: Option<usize>, settings: &Settings) -> Option<usize> {
    cli_jobs.or(settings.jobs).map(|n| n.max(1))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_ROOT_NAME)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
