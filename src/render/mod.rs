// src/render/mod.rs
pub mod chart;
pub mod format;
pub mod html;
pub mod markdown;
pub mod png;
pub mod svg;
pub mod writer;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};

use crate::aggregate::AggregateResult;
use crate::config::dashboard::{ChartFormat, DashboardConfig};
use crate::render::chart::{languages_figure, overview_figure, ChartBackend};
use crate::render::{png::PngBackend, svg::SvgBackend};
use crate::render::writer::ArtifactWriter;

/// Where the two chart files were written, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub overview: PathBuf,
    pub languages: PathBuf,
}

/// Everything the two documents interpolate.
pub struct DocumentContext<'a> {
    pub cfg: &'a DashboardConfig,
    pub agg: &'a AggregateResult,
    /// `None` when charts were skipped for an empty aggregate.
    pub charts: Option<ChartPaths>,
    pub stamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    pub charts_skipped: bool,
}

/// Link from the document at `from_file` to `target`; both relative to the output root.
pub fn relative_link(from_file: &Path, target: &Path) -> String {
    fn normal(p: &Path) -> Vec<String> {
        p.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    let from_dir = from_file.parent().map(normal).unwrap_or_default();
    let target = normal(target);

    // Never treat the target's file name as a shared directory.
    let shared = from_dir
        .iter()
        .zip(target.iter().take(target.len().saturating_sub(1)))
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from_dir.len() - shared];
    parts.extend(target[shared..].iter().cloned());
    parts.join("/")
}

/// The chart backend for the configured format.
pub fn chart_backend(cfg: &DashboardConfig) -> Box<dyn ChartBackend> {
    match cfg.chart_format {
        ChartFormat::Png => Box::new(PngBackend::new(cfg.chart_font.as_deref())),
        ChartFormat::Svg => Box::new(SvgBackend),
    }
}

/// Render both charts (unless the aggregate is empty), the Markdown summary and the HTML page.
pub fn render_all<B, W>(
    agg: &AggregateResult,
    cfg: &DashboardConfig,
    backend: &B,
    writer: &W,
    now: DateTime<Utc>,
) -> Result<RenderReport>
where
    B: ChartBackend + ?Sized,
    W: ArtifactWriter + ?Sized,
{
    let mut report = RenderReport::default();

    let charts = if agg.is_empty() {
        tracing::warn!("empty aggregate, skipping chart generation");
        report.charts_skipped = true;
        None
    } else {
        let paths = ChartPaths {
            overview: cfg.overview_chart_stem().with_extension(backend.extension()),
            languages: cfg.languages_chart_stem().with_extension(backend.extension()),
        };

        let overview = backend
            .render(&overview_figure(agg, &cfg.limits))
            .context("rendering overview chart")?;
        writer.write(&paths.overview, &overview)?;
        report.written.push(paths.overview.clone());

        let languages = backend
            .render(&languages_figure(agg))
            .context("rendering languages chart")?;
        writer.write(&paths.languages, &languages)?;
        report.written.push(paths.languages.clone());

        tracing::info!(overview = %paths.overview.display(), languages = %paths.languages.display(), "charts written");
        Some(paths)
    };

    let ctx = DocumentContext {
        cfg,
        agg,
        charts,
        stamp: format::stamp(now),
    };

    let md = markdown::render_markdown(&ctx);
    writer.write(&cfg.readme_path, md.as_bytes())?;
    report.written.push(cfg.readme_path.clone());

    let page = html::render_html(&ctx);
    let html_path = cfg.html_path();
    writer.write(&html_path, page.as_bytes())?;
    report.written.push(html_path);

    Ok(report)
}
