// src/fetch/types.rs
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used when the remote service reports no primary language.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A validated `owner/name` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn new(owner: &str, name: &str) -> Result<Self> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() {
            bail!("repository id needs a non-empty owner and name");
        }
        if owner.contains('/') || name.contains('/') {
            bail!("repository id must contain exactly one '/'");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (owner, name) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("repository id {s:?} is not in owner/name form"))?;
        Self::new(owner, name).map_err(|e| anyhow!("repository id {s:?}: {e}"))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One fetched repository. Timestamps are kept as the service sent them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub star_count: u64,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Wire shape of `GET /repos/{owner}/{name}`; only the fields we read.
#[derive(Debug, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    pub full_name: String,
    pub owner: ApiOwner,
    pub stargazers_count: u64,
    pub language: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiOwner {
    pub login: String,
}

impl TryFrom<ApiRepository> for RepositorySnapshot {
    type Error = anyhow::Error;

    fn try_from(api: ApiRepository) -> Result<Self> {
        // Reject payloads whose full_name breaks the owner/name shape.
        let id: RepoId = api.full_name.parse()?;

        let language = api
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

        Ok(Self {
            name: api.name,
            full_name: id.to_string(),
            owner: api.owner.login,
            star_count: api.stargazers_count,
            language,
            created_at: api.created_at,
            updated_at: api.updated_at,
        })
    }
}

#[async_trait::async_trait]
pub trait RepoSource {
    /// One metadata request for one repository. No retries.
    async fn fetch_repo(&self, id: &RepoId) -> Result<RepositorySnapshot>;
    fn name(&self) -> &'static str;
}
