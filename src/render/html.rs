// src/render/html.rs
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::format::{repo_link, thousands};
use super::{relative_link, DocumentContext};

const STYLE: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }
        .container {
            background: white;
            border-radius: 10px;
            padding: 30px;
            margin: 20px 0;
            box-shadow: 0 10px 30px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
        }
        .stats {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin: 30px 0;
        }
        .stat-card {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
            text-align: center;
            border-left: 4px solid #667eea;
        }
        .chart-container {
            margin: 30px 0;
            text-align: center;
        }
        .chart-container img {
            max-width: 100%;
            height: auto;
            border-radius: 8px;
            box-shadow: 0 5px 15px rgba(0,0,0,0.1);
        }
        .repos-table {
            width: 100%;
            border-collapse: collapse;
            margin: 30px 0;
        }
        .repos-table th, .repos-table td {
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid #ddd;
        }
        .repos-table th {
            background: #f8f9fa;
            font-weight: 600;
        }
        .update-time {
            text-align: center;
            color: #666;
            font-size: 14px;
            margin-top: 30px;
        }
"#;

fn stat_card(value: &str, label: &str) -> String {
    format!(
        r#"            <div class="stat-card">
                <h3>{}</h3>
                <p>{}</p>
            </div>
"#,
        text(value),
        text(label)
    )
}

fn chart_block(heading: &str, src: &str, alt: &str) -> String {
    format!(
        r#"        <div class="chart-container">
            <h2>{}</h2>
            <img src="{}" alt="{}">
        </div>
"#,
        text(heading),
        attr(src),
        attr(alt)
    )
}

pub fn render_html(ctx: &DocumentContext<'_>) -> String {
    let cfg = ctx.cfg;
    let agg = ctx.agg;
    let here = cfg.html_path();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "    <title>{} - {}</title>\n",
        text(&cfg.title),
        text(&cfg.subtitle)
    ));
    html.push_str("    <style>\n");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n    <div class=\"container\">\n");

    html.push_str(&format!(
        "        <div class=\"header\">\n            <h1>🚀 {}</h1>\n            <p>{}</p>\n        </div>\n\n",
        text(&cfg.title),
        text(&cfg.subtitle)
    ));

    html.push_str("        <div class=\"stats\">\n");
    html.push_str(&stat_card(&thousands(agg.total_count as u64), "Tracked Repositories"));
    html.push_str(&stat_card(&thousands(agg.total_stars), "Total Stars"));
    html.push_str(&stat_card(&thousands(agg.average_stars), "Average Stars"));
    html.push_str("        </div>\n\n");

    match &ctx.charts {
        Some(charts) => {
            html.push_str(&chart_block(
                "📊 Market Overview",
                &relative_link(&here, &charts.overview),
                "Market Overview Chart",
            ));
            html.push('\n');
            html.push_str(&chart_block(
                "🏷️ Popular Languages",
                &relative_link(&here, &charts.languages),
                "Languages Chart",
            ));
        }
        None => {
            html.push_str(
                "        <div class=\"chart-container\">\n            <p>No repository data was available, charts were not generated.</p>\n        </div>\n",
            );
        }
    }

    html.push_str("\n        <h2>🔝 Top Repositories</h2>\n");
    html.push_str("        <table class=\"repos-table\">\n            <thead>\n                <tr>\n");
    for h in ["Repository", "Owner", "Stars", "Language"] {
        html.push_str(&format!("                    <th>{h}</th>\n"));
    }
    html.push_str("                </tr>\n            </thead>\n            <tbody>");

    let top = agg.top_by_stars(cfg.limits.page_top);
    if top.is_empty() {
        html.push_str(
            "\n                <tr>\n                    <td colspan=\"4\">No data</td>\n                </tr>",
        );
    }
    for repo in top {
        html.push_str(&format!(
            r#"
                <tr>
                    <td><a href="{}" target="_blank">{}</a></td>
                    <td>{}</td>
                    <td>⭐ {}</td>
                    <td>{}</td>
                </tr>"#,
            attr(&repo_link(&cfg.web_base_url, &repo.full_name)),
            text(&repo.name),
            text(&repo.owner),
            thousands(repo.star_count),
            text(&repo.language)
        ));
    }

    html.push_str("\n            </tbody>\n        </table>\n\n");
    html.push_str(&format!(
        "        <div class=\"update-time\">\n            📅 Last update: {}\n        </div>\n",
        text(&ctx.stamp)
    ));
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::config::dashboard::DashboardConfig;
    use crate::fetch::types::RepositorySnapshot;
    use crate::render::ChartPaths;
    use std::path::PathBuf;

    fn snap(name: &str, owner: &str, stars: u64) -> RepositorySnapshot {
        RepositorySnapshot {
            name: name.into(),
            full_name: format!("{owner}/{name}"),
            owner: owner.into(),
            star_count: stars,
            language: "C++".into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn page_lists_top_ten_and_links_charts_from_docs_dir() {
        let cfg = DashboardConfig::default();
        let snaps: Vec<RepositorySnapshot> =
            (1..=12).map(|i| snap(&format!("repo{i}"), "acme", i * 100)).collect();
        let agg = aggregate(&snaps, 20);
        let ctx = DocumentContext {
            cfg: &cfg,
            agg: &agg,
            charts: Some(ChartPaths {
                overview: PathBuf::from("charts/overview.png"),
                languages: PathBuf::from("charts/languages.png"),
            }),
            stamp: "2024-01-01 00:00 UTC".into(),
        };
        let html = render_html(&ctx);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("target=\"_blank\"").count(), 10);
        assert!(html.contains(r#"<img src="../charts/overview.png""#));
        assert!(html.contains("<h3>7,800</h3>"));
        assert!(html.contains("<h3>650</h3>"));
        assert!(html.contains("<td>⭐ 1,200</td>"));
        assert!(!html.contains(">repo2<"));
        assert!(html.contains("Last update: 2024-01-01 00:00 UTC"));
    }

    #[test]
    fn untrusted_text_is_escaped() {
        let cfg = DashboardConfig::default();
        let mut s = snap("<img onerror=x>", "evil\"owner", 1);
        s.language = "<b>".into();
        let agg = aggregate(&[s], 20);
        let ctx = DocumentContext {
            cfg: &cfg,
            agg: &agg,
            charts: None,
            stamp: "now".into(),
        };
        let html = render_html(&ctx);
        assert!(!html.contains("<img onerror"));
        assert!(html.contains("&lt;img onerror=x&gt;"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("No repository data was available"));
    }
}
