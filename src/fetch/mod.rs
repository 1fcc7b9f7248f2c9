// src/fetch/mod.rs
pub mod github;
pub mod types;

use crate::fetch::types::{RepoId, RepoSource, RepositorySnapshot};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up in any installed recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "dashboard_fetch_ok_total",
            "Repositories fetched successfully."
        );
        describe_counter!(
            "dashboard_fetch_errors_total",
            "Repositories skipped because the fetch failed."
        );
        describe_histogram!("dashboard_fetch_ms", "Per-repository fetch time in milliseconds.");
    });
}

/// Fetch one identifier, turning every failure into `None` after logging it.
async fn fetch_or_skip<S>(source: &S, raw_id: &str) -> Option<RepositorySnapshot>
where
    S: RepoSource + ?Sized,
{
    let id: RepoId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(repo = raw_id, error = %e, "skipping malformed repository id");
            counter!("dashboard_fetch_errors_total").increment(1);
            return None;
        }
    };

    let t0 = std::time::Instant::now();
    let res = source.fetch_repo(&id).await;
    histogram!("dashboard_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(snap) => {
            counter!("dashboard_fetch_ok_total").increment(1);
            Some(snap)
        }
        Err(e) => {
            tracing::warn!(
                repo = %id,
                source = source.name(),
                error = ?e,
                "failed to get repository data"
            );
            counter!("dashboard_fetch_errors_total").increment(1);
            None
        }
    }
}

/// Fetch every identifier in order, one request at a time.
/// Returns (snapshots in input order, number of skipped identifiers).
pub async fn fetch_all<S>(source: &S, ids: &[String]) -> (Vec<RepositorySnapshot>, usize)
where
    S: RepoSource + ?Sized,
{
    ensure_metrics_described();

    let mut out = Vec::with_capacity(ids.len());
    let mut skipped = 0usize;
    for raw in ids {
        match fetch_or_skip(source, raw).await {
            Some(snap) => out.push(snap),
            None => skipped += 1,
        }
    }

    tracing::debug!(fetched = out.len(), skipped, "fetch batch finished");
    (out, skipped)
}
