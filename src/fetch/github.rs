use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;

use crate::config::dashboard::DashboardConfig;
use crate::fetch::types::{ApiRepository, RepoId, RepoSource, RepositorySnapshot};

const USER_AGENT: &str = concat!("repo-dashboard/", env!("CARGO_PKG_VERSION"));
const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Reads repository metadata from the GitHub REST API (or anything speaking its shape).
pub struct GithubSource {
    client: reqwest::Client,
    api_base_url: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(api_base_url: &str, token: Option<String>) -> Result<Self> {
        Self::build(api_base_url, token, None)
    }

    pub fn from_config(cfg: &DashboardConfig) -> Result<Self> {
        Self::build(
            &cfg.api_base_url,
            cfg.token.clone(),
            cfg.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn build(api_base_url: &str, token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("building http client")?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn repo_url(&self, id: &RepoId) -> String {
        format!("{}/repos/{}/{}", self.api_base_url, id.owner(), id.name())
    }
}

#[async_trait]
impl RepoSource for GithubSource {
    async fn fetch_repo(&self, id: &RepoId) -> Result<RepositorySnapshot> {
        let mut req = self.client.get(self.repo_url(id)).header(ACCEPT, GITHUB_V3_JSON);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.context("github http get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("github responded with {status}");
        }

        let api: ApiRepository = resp.json().await.context("decoding repository payload")?;
        RepositorySnapshot::try_from(api)
    }

    fn name(&self) -> &'static str {
        "GitHub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_without_double_slash() {
        let src = GithubSource::new("http://127.0.0.1:9/", None).unwrap();
        let id: RepoId = "facebook/react".parse().unwrap();
        assert_eq!(src.repo_url(&id), "http://127.0.0.1:9/repos/facebook/react");
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let src = GithubSource::new("http://127.0.0.1:9", Some("  ".into())).unwrap();
        assert!(src.token.is_none());
    }
}
