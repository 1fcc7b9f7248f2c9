//! repo-dashboard — Binary Entrypoint
//! Fetches the tracked repositories once, then rewrites the charts, README and HTML page.

use anyhow::{Context, Result};
use chrono::Utc;

use repo_dashboard::config::dashboard::DashboardConfig;
use repo_dashboard::fetch::github::GithubSource;
use repo_dashboard::render::{chart_backend, writer::FsWriter};
use repo_dashboard::{init_tracing, run_dashboard};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in CI where the token comes from the environment.
    let _ = dotenvy::dotenv();
    init_tracing("repo_dashboard=info,warn");

    tracing::info!("🚀 starting dashboard generation");

    let cfg = DashboardConfig::load_default().context("loading dashboard config")?;
    if cfg.token.is_none() {
        tracing::warn!("GITHUB_TOKEN is not set; requests go out unauthenticated");
    }

    let source = GithubSource::from_config(&cfg)?;
    let backend = chart_backend(&cfg);
    let writer = FsWriter::new(".");

    let summary = match run_dashboard(&cfg, &source, backend.as_ref(), &writer, Utc::now()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = ?e, "❌ dashboard run failed");
            return Err(e);
        }
    };

    tracing::info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        files = summary.report.written.len(),
        "🎉 dashboard updated successfully"
    );
    Ok(())
}
