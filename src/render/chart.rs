//! Backend-neutral chart model and the two dashboard figures built from an aggregate.

use anyhow::Result;

use crate::aggregate::{AggregateResult, HistogramBin};
use crate::config::dashboard::Limits;
use crate::render::format::truncate_label;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    /// First bar is drawn on top.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Bars {
        bars: Vec<Bar>,
        orientation: Orientation,
        rotate_labels: bool,
    },
    Histogram {
        bins: Vec<HistogramBin>,
    },
}

impl Series {
    pub fn is_empty(&self) -> bool {
        match self {
            Series::Bars { bars, .. } => bars.is_empty(),
            Series::Histogram { bins } => bins.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub color: &'static str,
    pub series: Series,
}

/// A grid of panels under an optional title. Panels fill rows left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
}

pub trait ChartBackend {
    /// File extension (without the dot) of what `render` produces.
    fn extension(&self) -> &'static str;
    fn render(&self, figure: &Figure) -> Result<Vec<u8>>;
}

fn bars_from_counts(entries: Vec<(String, usize)>) -> Vec<Bar> {
    entries
        .into_iter()
        .map(|(label, count)| Bar {
            label,
            value: count as f64,
        })
        .collect()
}

/// 2×2 overview: stars histogram, top languages, top repositories, top owners.
pub fn overview_figure(agg: &AggregateResult, limits: &Limits) -> Figure {
    let histogram = Panel {
        title: "Stars Distribution".to_string(),
        x_label: Some("Stars Count".to_string()),
        y_label: Some("Number of Repositories".to_string()),
        color: "#1f77b4",
        series: Series::Histogram {
            bins: agg
                .stars_histogram
                .as_ref()
                .map(|h| h.bins.clone())
                .unwrap_or_default(),
        },
    };

    let languages = Panel {
        title: "Popular Languages".to_string(),
        x_label: None,
        y_label: None,
        color: "#ff7f0e",
        series: Series::Bars {
            bars: bars_from_counts(agg.language_counts.top(limits.chart_top_languages)),
            orientation: Orientation::Vertical,
            rotate_labels: true,
        },
    };

    let top_repos = Panel {
        title: "Top Repositories by Stars".to_string(),
        x_label: None,
        y_label: None,
        color: "#2ca02c",
        series: Series::Bars {
            bars: agg
                .top_by_stars(limits.chart_top_repos)
                .iter()
                .map(|r| Bar {
                    label: truncate_label(&r.name, limits.name_budget),
                    value: r.star_count as f64,
                })
                .collect(),
            orientation: Orientation::Horizontal,
            rotate_labels: false,
        },
    };

    let owners = Panel {
        title: "Repository Owners".to_string(),
        x_label: None,
        y_label: None,
        color: "#9467bd",
        series: Series::Bars {
            bars: bars_from_counts(agg.owner_counts.top(limits.chart_top_owners)),
            orientation: Orientation::Vertical,
            rotate_labels: true,
        },
    };

    Figure {
        title: Some("GitHub Repositories Market Overview".to_string()),
        width: 1200,
        height: 800,
        rows: 2,
        cols: 2,
        panels: vec![histogram, languages, top_repos, owners],
    }
}

/// Every language, most frequent first.
pub fn languages_figure(agg: &AggregateResult) -> Figure {
    Figure {
        title: None,
        width: 1000,
        height: 600,
        rows: 1,
        cols: 1,
        panels: vec![Panel {
            title: "Programming Languages in Tracked Repositories".to_string(),
            x_label: None,
            y_label: Some("Number of Repositories".to_string()),
            color: "#e74c3c",
            series: Series::Bars {
                bars: bars_from_counts(agg.language_counts.sorted()),
                orientation: Orientation::Vertical,
                rotate_labels: true,
            },
        }],
    }
}
