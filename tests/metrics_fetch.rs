// tests/metrics_fetch.rs
#![cfg(feature = "strict-metrics")]
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusBuilder;
use repo_dashboard::fetch::fetch_all;
use repo_dashboard::{RepoId, RepoSource, RepositorySnapshot};

struct HalfBroken;

#[async_trait]
impl RepoSource for HalfBroken {
    async fn fetch_repo(&self, id: &RepoId) -> Result<RepositorySnapshot> {
        if id.owner() == "down" {
            return Err(anyhow!("github responded with 500 Internal Server Error"));
        }
        Ok(RepositorySnapshot {
            name: id.name().into(),
            full_name: id.to_string(),
            owner: id.owner().into(),
            star_count: 3,
            language: "Rust".into(),
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    fn name(&self) -> &'static str {
        "half-broken"
    }
}

#[tokio::test]
async fn fetch_counters_are_exposed() {
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let ids: Vec<String> = vec!["up/a".into(), "down/b".into(), "up/c".into()];
    let (snaps, skipped) = fetch_all(&HalfBroken, &ids).await;
    assert_eq!(snaps.len(), 2);
    assert_eq!(skipped, 1);

    let out = handle.render();
    assert!(out.contains("dashboard_fetch_ok_total 2"));
    assert!(out.contains("dashboard_fetch_errors_total 1"));
    assert!(out.contains("dashboard_fetch_ms"));
}
