// tests/pipeline_e2e.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};

use repo_dashboard::config::dashboard::DashboardConfig;
use repo_dashboard::render::png::{PngBackend, PNG_SIGNATURE};
use repo_dashboard::render::{writer::FsWriter, writer::MemoryWriter};
use repo_dashboard::{run_dashboard, RepoId, RepoSource, RepositorySnapshot};

/// Serves a fixed table; anything else is a 404.
struct TableSource(Vec<(&'static str, u64, Option<&'static str>)>);

#[async_trait]
impl RepoSource for TableSource {
    async fn fetch_repo(&self, id: &RepoId) -> Result<RepositorySnapshot> {
        let full = id.to_string();
        let (_, stars, lang) = self
            .0
            .iter()
            .find(|(f, _, _)| *f == full)
            .ok_or_else(|| anyhow!("github responded with 404 Not Found"))?;
        Ok(RepositorySnapshot {
            name: id.name().to_string(),
            full_name: full,
            owner: id.owner().to_string(),
            star_count: *stars,
            language: lang.unwrap_or("Unknown").to_string(),
            created_at: "2013-05-24T16:15:54Z".into(),
            updated_at: "2024-06-01T00:00:00Z".into(),
        })
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

fn table() -> TableSource {
    TableSource(vec![
        ("facebook/react", 229_000, Some("JavaScript")),
        ("microsoft/vscode", 164_000, Some("TypeScript")),
        ("apple/swift", 67_000, Some("C++")),
        ("stripe/stripe-js", 600, Some("TypeScript")),
        ("netflix/zuul", 13_500, Some("Java")),
        ("amazon/aws-sdk-js", 7_600, Some("JavaScript")),
    ])
}

#[tokio::test]
async fn full_run_writes_all_four_artifacts() {
    let cfg = DashboardConfig::default();
    let writer = MemoryWriter::new();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let summary = run_dashboard(&cfg, &table(), &PngBackend::new(None), &writer, now)
        .await
        .unwrap();

    // google/tensorflow and twilio/twilio-python are not in the table
    assert_eq!(summary.fetched, 6);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.total_stars, 481_700);
    assert!(!summary.report.charts_skipped);
    assert_eq!(
        writer.paths(),
        vec![
            PathBuf::from("charts/overview.png"),
            PathBuf::from("charts/languages.png"),
            PathBuf::from("README.md"),
            PathBuf::from("docs/index.html"),
        ]
    );

    for chart in ["charts/overview.png", "charts/languages.png"] {
        let bytes = writer.get_bytes(chart).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE, "{chart} is not a PNG");
    }
    // 1200x800 overview, read from the IHDR chunk
    let overview = writer.get_bytes("charts/overview.png").unwrap();
    assert_eq!(overview[16..24], [0, 0, 4, 176, 0, 0, 3, 32]);

    let readme = writer.get("README.md").unwrap();
    assert!(readme.contains("![Market Overview](charts/overview.png)"));
    assert!(readme.contains("- **Total Stars**: 481,700"));
    assert!(readme.contains("- **Average Stars**: 80,283"));
    assert!(readme.contains("| [react](https://github.com/facebook/react) | facebook | ⭐ 229,000 | JavaScript |"));
    assert!(readme.contains("Last update: 2024-06-01 12:00 UTC"));

    let html = writer.get("docs/index.html").unwrap();
    assert!(html.contains("<h3>6</h3>"));
    assert!(html.contains("<h3>481,700</h3>"));
    assert_eq!(html.matches("target=\"_blank\"").count(), 6);
}

#[tokio::test]
async fn nothing_fetched_aborts_before_rendering() {
    let cfg = DashboardConfig::default();
    let writer = MemoryWriter::new();
    let err = run_dashboard(&cfg, &TableSource(vec![]), &PngBackend::new(None), &writer, Utc::now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to get data"));
    assert!(writer.paths().is_empty());
}

#[tokio::test]
async fn fs_writer_creates_output_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DashboardConfig {
        repositories: vec!["facebook/react".into(), "apple/swift".into()],
        ..DashboardConfig::default()
    };
    let writer = FsWriter::new(tmp.path());

    run_dashboard(&cfg, &table(), &PngBackend::new(None), &writer, Utc::now())
        .await
        .unwrap();

    for rel in [
        "charts/overview.png",
        "charts/languages.png",
        "README.md",
        "docs/index.html",
    ] {
        let p = tmp.path().join(Path::new(rel));
        assert!(p.is_file(), "missing {rel}");
        let content = std::fs::read(&p).unwrap();
        assert!(!content.is_empty(), "empty {rel}");
    }
    let chart = std::fs::read(tmp.path().join("charts/overview.png")).unwrap();
    assert_eq!(chart[..8], PNG_SIGNATURE);

    // a second run overwrites rather than appends
    let before = std::fs::read_to_string(tmp.path().join("README.md")).unwrap();
    run_dashboard(&cfg, &table(), &PngBackend::new(None), &writer, Utc::now())
        .await
        .unwrap();
    let after = std::fs::read_to_string(tmp.path().join("README.md")).unwrap();
    assert_eq!(before.len(), after.len());
}
