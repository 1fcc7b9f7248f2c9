//! pipeline.rs: one dashboard run: fetch → aggregate → render, strictly in that order.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate::aggregate;
use crate::config::dashboard::DashboardConfig;
use crate::fetch::{fetch_all, types::RepoSource};
use crate::render::{chart::ChartBackend, render_all, writer::ArtifactWriter, RenderReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub skipped: usize,
    pub total_stars: u64,
    pub report: RenderReport,
}

/// Runs once. Fails without writing anything when no repository could be fetched.
pub async fn run_dashboard<S, B, W>(
    cfg: &DashboardConfig,
    source: &S,
    backend: &B,
    writer: &W,
    now: DateTime<Utc>,
) -> Result<RunSummary>
where
    S: RepoSource + ?Sized,
    B: ChartBackend + ?Sized,
    W: ArtifactWriter + ?Sized,
{
    info!(
        repositories = cfg.repositories.len(),
        source = source.name(),
        authenticated = cfg.token.is_some(),
        "getting repository data"
    );
    let (snapshots, skipped) = fetch_all(source, &cfg.repositories).await;

    if snapshots.is_empty() {
        bail!(
            "failed to get data: none of the {} tracked repositories could be fetched",
            cfg.repositories.len()
        );
    }
    info!(fetched = snapshots.len(), skipped, "got repository data");

    let agg = aggregate(&snapshots, cfg.limits.histogram_bins);
    info!(
        total_stars = agg.total_stars,
        average_stars = agg.average_stars,
        languages = agg.language_counts.len(),
        owners = agg.owner_counts.len(),
        "aggregated"
    );

    let report = render_all(&agg, cfg, backend, writer, now)?;
    info!(files = report.written.len(), "dashboard updated");

    Ok(RunSummary {
        fetched: snapshots.len(),
        skipped,
        total_stars: agg.total_stars,
        report,
    })
}
