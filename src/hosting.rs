//! Minimal GitHub REST client used to find the operator's repositories

use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::{GITHUB_API, GITHUB_HOST};

const USER_AGENT: &str = concat!("autogit/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

/// Repository as listed by `GET /user/repos`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct HostedRepo {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub owner: RepoOwner,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RepoOwner {
    pub login: String,
}

pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: SecretString,
}

impl GitHubClient {
    pub fn new(token: &SecretString) -> Result<Self> {
        Self::with_api_url(GITHUB_API, token)
    }

    pub fn with_api_url(api_url: impl Into<String>, token: &SecretString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            token: SecretString::from(token.expose_secret().to_string()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.api_url);
        debug!(%url, "hosting api request");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", ACCEPT)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        if !resp.status().is_success() {
            bail!("{url} returned {}", resp.status());
        }
        resp.json()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }

    /// Login of the account owning the token
    pub async fn current_user(&self) -> Result<String> {
        let account: Account = self.get_json("/user").await?;
        Ok(account.login)
    }

    /// Names of the account's own repositories that are not archived
    pub async fn own_repositories(&self) -> Result<Vec<String>> {
        let login = self.current_user().await?;
        let mut repos = Vec::new();
        for page in 1.. {
            let batch: Vec<HostedRepo> = self
                .get_json(&format!(
                    "/user/repos?affiliation=owner&per_page={PAGE_SIZE}&page={page}"
                ))
                .await?;
            let done = batch.len() < PAGE_SIZE;
            repos.extend(batch);
            if done {
                break;
            }
        }
        Ok(active_repo_names(&repos, &login))
    }
}

/// Sorted names of `login`'s repositories that are still active
pub fn active_repo_names(repos: &[HostedRepo], login: &str) -> Vec<String> {
    let mut names: Vec<String> = repos
        .iter()
        .filter(|repo| !repo.archived && repo.owner.login == login)
        .map(|repo| repo.name.clone())
        .collect();
    names.sort_by_key(|name| name.to_lowercase());
    names
}

pub fn clone_url(user: &str, name: &str) -> String {
    format!("{GITHUB_HOST}/{user}/{name}")
}
