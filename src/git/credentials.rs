//! Access-token injection into remote URLs

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use super::runner::CommandRunner;
use crate::core::config::Settings;

const HTTPS_SCHEME: &str = "https://";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no access token available (set {env} or configure token_command)")]
    Missing { env: String },
    #[error("credential store lookup failed: {0}")]
    Lookup(#[from] super::error::CommandError),
}

/// Where the access token comes from, in lookup order
enum TokenSource {
    Fixed(SecretString),
    Lookup {
        runner: Arc<dyn CommandRunner>,
        command: Option<Vec<String>>,
        env_vars: Vec<String>,
    },
}

/// Rewrites remote URLs so pushes and pulls authenticate with the operator's token
///
/// The token is resolved lazily, at most once, the first time a URL actually
/// needs rewriting.
pub struct CredentialInjector {
    source: TokenSource,
    token: OnceCell<SecretString>,
}

impl CredentialInjector {
    /// Resolves the token from the configured credential store command, then the environment
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &Settings) -> Self {
        let mut env_vars = vec![settings.token_env.clone()];
        let lowercase = settings.token_env.to_lowercase();
        if lowercase != settings.token_env {
            env_vars.push(lowercase);
        }
        Self {
            source: TokenSource::Lookup {
                runner,
                command: settings.token_command.clone(),
                env_vars,
            },
            token: OnceCell::new(),
        }
    }

    /// Uses a known token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Fixed(SecretString::from(token.into())),
            token: OnceCell::new(),
        }
    }

    /// Returns the access token, looking it up on first use
    pub async fn token(&self) -> Result<&SecretString, CredentialError> {
        self.token.get_or_try_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> Result<SecretString, CredentialError> {
        match &self.source {
            TokenSource::Fixed(token) => Ok(SecretString::from(token.expose_secret().to_string())),
            TokenSource::Lookup {
                runner,
                command,
                env_vars,
            } => {
                if let Some((program, args)) = command.as_deref().and_then(<[String]>::split_first) {
                    debug!(program = %program, "looking up token in credential store");
                    let token = runner.run(program, args, None).await?;
                    let token = token.trim();
                    if !token.is_empty() {
                        return Ok(SecretString::from(token.to_string()));
                    }
                }
                env_vars
                    .iter()
                    .filter_map(|name| std::env::var(name).ok())
                    .map(|value| value.trim().to_string())
                    .find(|value| !value.is_empty())
                    .map(SecretString::from)
                    .ok_or_else(|| CredentialError::Missing {
                        env: env_vars.first().cloned().unwrap_or_default(),
                    })
            }
        }
    }

    /// Returns the rewritten URL, or `None` when `url` needs no credential
    pub async fn inject(&self, url: &str) -> Result<Option<String>, CredentialError> {
        if !needs_credential(url) {
            return Ok(None);
        }
        let token = self.token().await?;
        Ok(embed_token(url, token.expose_secret()))
    }
}

/// True for https remotes whose authority carries no user information
pub fn needs_credential(url: &str) -> bool {
    url.strip_prefix(HTTPS_SCHEME)
        .map(|rest| {
            let authority = rest.split('/').next().unwrap_or_default();
            !authority.contains('@')
        })
        .unwrap_or(false)
}

/// Embeds `token` as the user information of an https URL
pub fn embed_token(url: &str, token: &str) -> Option<String> {
    url.strip_prefix(HTTPS_SCHEME)
        .map(|rest| format!("{HTTPS_SCHEME}{token}@{rest}"))
}
