// src/render/markdown.rs
use std::fmt::Write;

use super::format::{md_cell, repo_link, thousands};
use super::{relative_link, DocumentContext};

pub fn render_markdown(ctx: &DocumentContext<'_>) -> String {
    let cfg = ctx.cfg;
    let agg = ctx.agg;
    let here = cfg.readme_path.as_path();
    let mut md = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(md, "# {}\n", cfg.title);
    let _ = writeln!(md, "## 📊 {}\n", cfg.subtitle);
    let _ = writeln!(
        md,
        "Monitoring GitHub repository market - tracking popular projects and technologies.\n"
    );

    let _ = writeln!(md, "### 📈 Current Statistics");
    let _ = writeln!(md, "- **Tracked Repositories**: {}", thousands(agg.total_count as u64));
    let _ = writeln!(md, "- **Total Stars**: {}", thousands(agg.total_stars));
    let _ = writeln!(md, "- **Average Stars**: {}\n", thousands(agg.average_stars));

    match &ctx.charts {
        Some(charts) => {
            let _ = writeln!(md, "### 📊 Market Overview");
            let _ = writeln!(
                md,
                "![Market Overview]({})\n",
                relative_link(here, &charts.overview)
            );
            let _ = writeln!(md, "### 🏷️ Popular Languages");
            let _ = writeln!(md, "![Languages]({})\n", relative_link(here, &charts.languages));
        }
        None => {
            let _ = writeln!(md, "### 📊 Market Overview");
            let _ = writeln!(md, "_No repository data was available, charts were not generated._\n");
        }
    }

    let _ = writeln!(md, "### 🔝 Top {} Repositories", cfg.limits.summary_top);
    let _ = writeln!(md, "| Repository | Owner | Stars | Language |");
    let _ = writeln!(md, "|------------|-------|-------|----------|");
    let top = agg.top_by_stars(cfg.limits.summary_top);
    if top.is_empty() {
        let _ = writeln!(md, "| _no data_ | - | ⭐ 0 | - |");
    }
    for repo in top {
        let _ = writeln!(
            md,
            "| [{}]({}) | {} | ⭐ {} | {} |",
            md_cell(&repo.name),
            repo_link(&cfg.web_base_url, &repo.full_name),
            md_cell(&repo.owner),
            thousands(repo.star_count),
            md_cell(&repo.language)
        );
    }

    let _ = write!(md, "\n*{} Last update: {}*", cfg.update_note, ctx.stamp);
    md
}
