// src/lib.rs
// Public library surface for both binaries and the integration tests.

pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod health;
pub mod pipeline;
pub mod render;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AggregateResult};
pub use crate::fetch::types::{RepoId, RepoSource, RepositorySnapshot};
pub use crate::pipeline::{run_dashboard, RunSummary};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact console logs. `RUST_LOG` wins over `default_filter`.
/// Safe to call more than once (later calls are no-ops).
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .try_init();
}
