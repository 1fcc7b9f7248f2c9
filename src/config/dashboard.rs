// src/config/dashboard.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{read_toml, resolve_config_path};

pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

/// Repositories tracked when no config file overrides the list.
pub const DEFAULT_REPOSITORIES: [&str; 8] = [
    "facebook/react",
    "microsoft/vscode",
    "google/tensorflow",
    "apple/swift",
    "netflix/zuul",
    "amazon/aws-sdk-js",
    "stripe/stripe-js",
    "twilio/twilio-python",
];

/// How many entries each rendered view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub summary_top: usize,
    pub page_top: usize,
    pub chart_top_repos: usize,
    pub chart_top_languages: usize,
    pub chart_top_owners: usize,
    pub histogram_bins: usize,
    /// Max characters of a repository name on chart axes before "..." is appended.
    pub name_budget: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            summary_top: 5,
            page_top: 10,
            chart_top_repos: 10,
            chart_top_languages: 8,
            chart_top_owners: 8,
            histogram_bins: 20,
            name_budget: 15,
        }
    }
}

impl Limits {
    /// Zero means "unset": fall back to the default for that field.
    fn sanitize(&mut self) {
        let d = Limits::default();
        let fix = |v: &mut usize, dv: usize| {
            if *v == 0 {
                *v = dv;
            }
        };
        fix(&mut self.summary_top, d.summary_top);
        fix(&mut self.page_top, d.page_top);
        fix(&mut self.chart_top_repos, d.chart_top_repos);
        fix(&mut self.chart_top_languages, d.chart_top_languages);
        fix(&mut self.chart_top_owners, d.chart_top_owners);
        fix(&mut self.histogram_bins, d.histogram_bins);
        fix(&mut self.name_budget, d.name_budget);
    }
}

/// Image format of the two chart files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    /// Base for the repository links in the documents.
    pub web_base_url: String,
    /// Only ever read from `GITHUB_TOKEN`.
    #[serde(skip)]
    pub token: Option<String>,
    pub repositories: Vec<String>,
    pub charts_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub readme_path: PathBuf,
    pub title: String,
    pub subtitle: String,
    pub update_note: String,
    pub request_timeout_secs: Option<u64>,
    pub chart_format: ChartFormat,
    /// TrueType face for chart text; common system locations are tried when unset.
    pub chart_font: Option<PathBuf>,
    pub limits: Limits,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            web_base_url: "https://github.com".to_string(),
            token: None,
            repositories: DEFAULT_REPOSITORIES.iter().map(|s| s.to_string()).collect(),
            charts_dir: PathBuf::from("charts"),
            docs_dir: PathBuf::from("docs"),
            readme_path: PathBuf::from("README.md"),
            title: "repo-dashboard".to_string(),
            subtitle: "GitHub Repositories Market Dashboard".to_string(),
            update_note: "Dashboard updates automatically every 6 hours.".to_string(),
            request_timeout_secs: None,
            chart_format: ChartFormat::Png,
            chart_font: None,
            limits: Limits::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit TOML file, then apply the token from the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let cfg: DashboardConfig = read_toml(path)?;
        Ok(cfg.finish())
    }

    /// Load using env var + fallbacks:
    /// 1) $DASHBOARD_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        match resolve_config_path(ENV_CONFIG_PATH, DEFAULT_CONFIG_PATH)? {
            Some(p) => Self::load_from(&p),
            None => Ok(Self::default().finish()),
        }
    }

    fn finish(mut self) -> Self {
        self.token = std::env::var(ENV_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.repositories = self
            .repositories
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.web_base_url = self.web_base_url.trim_end_matches('/').to_string();
        self.limits.sanitize();
        self
    }

    pub fn overview_chart_stem(&self) -> PathBuf {
        self.charts_dir.join("overview")
    }

    pub fn languages_chart_stem(&self) -> PathBuf {
        self.charts_dir.join("languages")
    }

    pub fn html_path(&self) -> PathBuf {
        self.docs_dir.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("dashboard.toml");
        fs::write(
            &p,
            r#"
repositories = [" rust-lang/rust ", "", "tokio-rs/tokio"]
api_base_url = "http://localhost:8080/"

[limits]
summary_top = 3
histogram_bins = 0
"#,
        )
        .unwrap();
        let cfg = DashboardConfig::load_from(&p).unwrap();
        assert_eq!(cfg.repositories, vec!["rust-lang/rust", "tokio-rs/tokio"]);
        assert_eq!(cfg.api_base_url, "http://localhost:8080");
        assert_eq!(cfg.limits.summary_top, 3);
        assert_eq!(cfg.limits.histogram_bins, 20);
        assert_eq!(cfg.limits.page_top, 10);
        assert_eq!(cfg.charts_dir, PathBuf::from("charts"));
        assert_eq!(cfg.chart_format, ChartFormat::Png);
    }

    #[test]
    fn chart_format_is_lowercase_in_toml() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("dashboard.toml");
        fs::write(&p, "chart_format = \"svg\"\nchart_font = \"fonts/Inter.ttf\"\n").unwrap();
        let cfg = DashboardConfig::load_from(&p).unwrap();
        assert_eq!(cfg.chart_format, ChartFormat::Svg);
        assert_eq!(cfg.chart_font, Some(PathBuf::from("fonts/Inter.ttf")));

        fs::write(&p, "chart_format = \"gif\"\n").unwrap();
        assert!(DashboardConfig::load_from(&p).is_err());
    }

    #[test]
    fn default_tracks_eight_repositories() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.repositories.len(), 8);
        assert_eq!(cfg.html_path(), PathBuf::from("docs/index.html"));
    }
}
