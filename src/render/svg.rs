// src/render/svg.rs
use anyhow::Result;
use std::fmt::Write;

use crate::render::chart::{Bar, ChartBackend, Figure, Orientation, Panel, Series};
use crate::render::format::axis_number;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const FIGURE_TITLE_H: f64 = 40.0;
const PANEL_TITLE_H: f64 = 28.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_LEFT_HBAR: f64 = 130.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const FONT: &str = "-apple-system, 'Segoe UI', Roboto, sans-serif";

/// Plain SVG 1.1 output; no scripts, no external resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgBackend;

impl ChartBackend for SvgBackend {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, figure: &Figure) -> Result<Vec<u8>> {
        let mut out = String::new();
        write_figure(&mut out, figure)?;
        Ok(out.into_bytes())
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

fn write_figure(out: &mut String, fig: &Figure) -> std::fmt::Result {
    let (w, h) = (fig.width as f64, fig.height as f64);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{}">"#,
        attr(FONT)
    )?;
    writeln!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;

    let mut top = 0.0;
    if let Some(title) = &fig.title {
        writeln!(
            out,
            r#"<text x="{}" y="28" font-size="20" text-anchor="middle">{}</text>"#,
            w / 2.0,
            text(title)
        )?;
        top = FIGURE_TITLE_H;
    }

    let rows = fig.rows.max(1);
    let cols = fig.cols.max(1);
    let cell_w = w / cols as f64;
    let cell_h = (h - top) / rows as f64;

    for (i, panel) in fig.panels.iter().enumerate().take(rows * cols) {
        let cell = Rect {
            x: (i % cols) as f64 * cell_w,
            y: top + (i / cols) as f64 * cell_h,
            w: cell_w,
            h: cell_h,
        };
        write_panel(out, panel, cell)?;
    }

    writeln!(out, "</svg>")
}

fn write_panel(out: &mut String, panel: &Panel, cell: Rect) -> std::fmt::Result {
    writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="15" text-anchor="middle">{}</text>"#,
        cell.x + cell.w / 2.0,
        cell.y + 20.0,
        text(&panel.title)
    )?;

    let left = match &panel.series {
        Series::Bars {
            orientation: Orientation::Horizontal,
            ..
        } => MARGIN_LEFT_HBAR,
        _ => MARGIN_LEFT,
    };
    let plot = Rect {
        x: cell.x + left,
        y: cell.y + PANEL_TITLE_H + 8.0,
        w: (cell.w - left - MARGIN_RIGHT).max(1.0),
        h: (cell.h - PANEL_TITLE_H - 8.0 - MARGIN_BOTTOM).max(1.0),
    };

    if panel.series.is_empty() {
        return writeln!(
            out,
            r##"<text x="{}" y="{}" font-size="13" fill="#888888" text-anchor="middle">no data</text>"##,
            plot.x + plot.w / 2.0,
            plot.y + plot.h / 2.0
        );
    }

    match &panel.series {
        Series::Bars {
            bars,
            orientation: Orientation::Vertical,
            rotate_labels,
        } => write_vbars(out, bars, *rotate_labels, panel.color, plot)?,
        Series::Bars {
            bars,
            orientation: Orientation::Horizontal,
            ..
        } => write_hbars(out, bars, panel.color, plot)?,
        Series::Histogram { bins } => {
            let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
            let lo = bins.first().map(|b| b.lower).unwrap_or(0.0);
            let hi = bins.last().map(|b| b.upper).unwrap_or(1.0);
            let span = (hi - lo).max(f64::EPSILON);
            let y_top = write_y_axis(out, max_count, plot)?;
            for b in bins {
                let x0 = plot.x + (b.lower - lo) / span * plot.w;
                let x1 = plot.x + (b.upper - lo) / span * plot.w;
                let bh = b.count as f64 / y_top * plot.h;
                writeln!(
                    out,
                    r#"<rect x="{x0:.2}" y="{:.2}" width="{:.2}" height="{bh:.2}" fill="{}" fill-opacity="0.7" stroke="{}"/>"#,
                    plot.y + plot.h - bh,
                    (x1 - x0).max(0.0),
                    attr(panel.color),
                    attr(panel.color)
                )?;
            }
            for (v, anchor, x) in [
                (lo, "start", plot.x),
                ((lo + hi) / 2.0, "middle", plot.x + plot.w / 2.0),
                (hi, "end", plot.x + plot.w),
            ] {
                writeln!(
                    out,
                    r#"<text x="{x:.2}" y="{:.2}" font-size="11" text-anchor="{anchor}">{}</text>"#,
                    plot.y + plot.h + 16.0,
                    axis_number(v)
                )?;
            }
        }
    }

    write_axis_labels(out, panel, plot)
}

/// Draws gridlines and tick labels; returns the value mapped to the top of the plot.
fn write_y_axis(out: &mut String, max_value: f64, plot: Rect) -> Result<f64, std::fmt::Error> {
    let step = nice_step(max_value / Y_TICKS as f64);
    let y_top = ((max_value / step).ceil() * step).max(step);
    let ticks = (y_top / step).round() as usize;
    for i in 0..=ticks {
        let v = step * i as f64;
        let y = plot.y + plot.h - v / y_top * plot.h;
        writeln!(
            out,
            r##"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#e5e5e5"/>"##,
            plot.x,
            plot.x + plot.w
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-size="11" text-anchor="end">{}</text>"#,
            plot.x - 6.0,
            y + 4.0,
            axis_number(v)
        )?;
    }
    writeln!(
        out,
        r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#333333"/>"##,
        plot.x,
        plot.y + plot.h,
        plot.x + plot.w,
        plot.y + plot.h
    )?;
    Ok(y_top)
}

fn write_vbars(
    out: &mut String,
    bars: &[Bar],
    rotate_labels: bool,
    color: &str,
    plot: Rect,
) -> std::fmt::Result {
    let max_value = bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let y_top = write_y_axis(out, max_value, plot)?;
    let band = plot.w / bars.len() as f64;
    for (i, b) in bars.iter().enumerate() {
        let bh = b.value / y_top * plot.h;
        let x = plot.x + band * i as f64 + band * 0.1;
        writeln!(
            out,
            r#"<rect x="{x:.2}" y="{:.2}" width="{:.2}" height="{bh:.2}" fill="{}"/>"#,
            plot.y + plot.h - bh,
            band * 0.8,
            attr(color)
        )?;
        let lx = plot.x + band * (i as f64 + 0.5);
        let ly = plot.y + plot.h + 14.0;
        if rotate_labels {
            writeln!(
                out,
                r#"<text x="{lx:.2}" y="{ly:.2}" font-size="11" text-anchor="end" transform="rotate(-45 {lx:.2} {ly:.2})">{}</text>"#,
                text(&b.label)
            )?;
        } else {
            writeln!(
                out,
                r#"<text x="{lx:.2}" y="{ly:.2}" font-size="11" text-anchor="middle">{}</text>"#,
                text(&b.label)
            )?;
        }
    }
    Ok(())
}

fn write_hbars(out: &mut String, bars: &[Bar], color: &str, plot: Rect) -> std::fmt::Result {
    let max_value = bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let step = nice_step(max_value / Y_TICKS as f64);
    let x_top = ((max_value / step).ceil() * step).max(step);
    let band = plot.h / bars.len() as f64;

    let ticks = (x_top / step).round() as usize;
    for i in 0..=ticks {
        let v = step * i as f64;
        let x = plot.x + v / x_top * plot.w;
        writeln!(
            out,
            r##"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="#e5e5e5"/>"##,
            plot.y,
            plot.y + plot.h
        )?;
        writeln!(
            out,
            r#"<text x="{x:.2}" y="{:.2}" font-size="11" text-anchor="middle">{}</text>"#,
            plot.y + plot.h + 16.0,
            axis_number(v)
        )?;
    }

    for (i, b) in bars.iter().enumerate() {
        let bw = b.value / x_top * plot.w;
        let y = plot.y + band * i as f64 + band * 0.1;
        writeln!(
            out,
            r#"<rect x="{:.2}" y="{y:.2}" width="{bw:.2}" height="{:.2}" fill="{}"/>"#,
            plot.x,
            band * 0.8,
            attr(color)
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-size="11" text-anchor="end">{}</text>"#,
            plot.x - 6.0,
            plot.y + band * (i as f64 + 0.5) + 4.0,
            text(&b.label)
        )?;
    }
    Ok(())
}

fn write_axis_labels(out: &mut String, panel: &Panel, plot: Rect) -> std::fmt::Result {
    if let Some(x_label) = &panel.x_label {
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-size="12" text-anchor="middle">{}</text>"#,
            plot.x + plot.w / 2.0,
            plot.y + plot.h + 38.0,
            text(x_label)
        )?;
    }
    if let Some(y_label) = &panel.y_label {
        let x = plot.x - 48.0;
        let y = plot.y + plot.h / 2.0;
        writeln!(
            out,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="12" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"#,
            text(y_label)
        )?;
    }
    Ok(())
}

/// Round a raw step up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let n = raw / mag;
    let m = if n <= 1.0 {
        1.0
    } else if n <= 2.0 {
        2.0
    } else if n <= 5.0 {
        5.0
    } else {
        10.0
    };
    m * mag
}
