// src/render/png.rs
//! Raster charts: plotters draws into an RGB buffer, which is then PNG-encoded.
//!
//! Text needs a TrueType font registered with plotters. Without one the charts
//! still render, just without titles and tick labels.

use anyhow::{anyhow, Context, Result};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use once_cell::sync::OnceCell;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};

use crate::aggregate::HistogramBin;
use crate::render::chart::{Bar, ChartBackend, Figure, Orientation, Panel, Series};
use crate::render::format::axis_number;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT_FAMILY: &str = "sans-serif";

/// Regular sans-serif faces found on common CI images.
pub const FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// PNG magic bytes.
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

/// Registered once per process; the first readable, parseable face wins.
static FONT_READY: OnceCell<bool> = OnceCell::new();

fn ensure_font(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // plotters keeps registered faces for the life of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    tracing::debug!(font = %path.display(), "chart font registered");
                    return true;
                }
                Err(_) => {
                    // plotters' InvalidFont is opaque (no Debug/Display impl).
                    tracing::warn!(font = %path.display(), "unusable chart font")
                }
            }
        }
        tracing::warn!("no chart font found, charts are drawn without text");
        false
    })
}

fn plot_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("chart drawing failed: {e}")
}

/// `#rrggbb` to an RGB color; anything else falls back to a neutral blue.
fn parse_hex(color: &str) -> RGBColor {
    let hex = color.trim_start_matches('#');
    let channel = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());
    match (hex.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => RGBColor(31, 119, 180),
    }
}

/// Upper bound of a value axis with a little room above the tallest bar.
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Category label for the tick at `v`, where slot `i` is centered on `i`.
/// `reversed` counts slots from the top of the axis.
fn slot_label(bars: &[Bar], v: f64, reversed: bool) -> String {
    let r = v.round();
    if (v - r).abs() > 1e-6 || r < 0.0 || r as usize >= bars.len() {
        return String::new();
    }
    let slot = r as usize;
    let idx = if reversed { bars.len() - 1 - slot } else { slot };
    bars[idx].label.clone()
}

/// Raster chart backend on plotters' bitmap drawing area.
#[derive(Debug, Clone, Copy)]
pub struct PngBackend {
    text: bool,
}

impl PngBackend {
    /// Registers `preferred` (or the first of [`FONT_CANDIDATES`] that loads) for chart text.
    pub fn new(preferred: Option<&Path>) -> Self {
        Self {
            text: ensure_font(preferred),
        }
    }

    /// Shapes only, no font lookup.
    pub fn without_text() -> Self {
        Self { text: false }
    }

    pub fn draws_text(&self) -> bool {
        self.text
    }

    fn draw_figure(&self, root: &Area<'_>, figure: &Figure) -> Result<()> {
        root.fill(&WHITE).map_err(plot_err)?;

        let body = match (&figure.title, self.text) {
            (Some(title), true) => root.titled(title, (FONT_FAMILY, 26)).map_err(plot_err)?,
            _ => root.clone(),
        };

        let cells = body.split_evenly((figure.rows.max(1), figure.cols.max(1)));
        for (cell, panel) in cells.iter().zip(&figure.panels) {
            self.draw_panel(cell, panel)?;
        }
        Ok(())
    }

    fn draw_panel(&self, area: &Area<'_>, panel: &Panel) -> Result<()> {
        let color = parse_hex(panel.color);
        match &panel.series {
            s if s.is_empty() => self.draw_placeholder(area, &panel.title),
            Series::Histogram { bins } => self.draw_histogram(area, panel, bins, color),
            Series::Bars {
                bars,
                orientation: Orientation::Vertical,
                ..
            } => self.draw_columns(area, panel, bars, color),
            Series::Bars {
                bars,
                orientation: Orientation::Horizontal,
                ..
            } => self.draw_rows(area, panel, bars, color),
        }
    }

    fn builder<'a, 'b>(
        &self,
        area: &'a Area<'b>,
        panel: &Panel,
        y_area: u32,
    ) -> ChartBuilder<'a, 'static, BitMapBackend<'b>> {
        let mut builder = ChartBuilder::on(area);
        builder.margin(12);
        if self.text {
            builder
                .caption(&panel.title, (FONT_FAMILY, 18))
                .x_label_area_size(if panel.x_label.is_some() { 48 } else { 32 })
                .y_label_area_size(y_area);
        }
        builder
    }

    fn draw_placeholder(&self, area: &Area<'_>, title: &str) -> Result<()> {
        if !self.text {
            return Ok(());
        }
        let (w, h) = area.dim_in_pixel();
        let centered = Pos::new(HPos::Center, VPos::Center);
        area.draw(&Text::new(
            title.to_string(),
            (w as i32 / 2, 24),
            TextStyle::from((FONT_FAMILY, 18)).pos(centered),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(
            "No data".to_string(),
            (w as i32 / 2, h as i32 / 2),
            TextStyle::from((FONT_FAMILY, 16))
                .color(&RGBColor(136, 136, 136))
                .pos(centered),
        ))
        .map_err(plot_err)?;
        Ok(())
    }

    fn draw_histogram(
        &self,
        area: &Area<'_>,
        panel: &Panel,
        bins: &[HistogramBin],
        color: RGBColor,
    ) -> Result<()> {
        let lo = bins.first().map(|b| b.lower).unwrap_or(0.0);
        let mut hi = bins.last().map(|b| b.upper).unwrap_or(1.0);
        if hi <= lo {
            hi = lo + 1.0;
        }
        let top = headroom(bins.iter().map(|b| b.count).max().unwrap_or(0) as f64);

        let mut chart = self
            .builder(area, panel, 48)
            .build_cartesian_2d(lo..hi, 0f64..top)
            .map_err(plot_err)?;

        if self.text {
            let fmt = |v: &f64| axis_number(*v);
            let mut mesh = chart.configure_mesh();
            mesh.disable_x_mesh()
                .x_labels(6)
                .x_label_formatter(&fmt)
                .y_label_formatter(&fmt)
                .label_style((FONT_FAMILY, 12));
            if let Some(x) = &panel.x_label {
                mesh.x_desc(x.as_str());
            }
            if let Some(y) = &panel.y_label {
                mesh.y_desc(y.as_str());
            }
            mesh.draw().map_err(plot_err)?;
        }

        chart
            .draw_series(bins.iter().map(|b| {
                Rectangle::new(
                    [(b.lower, 0.0), (b.upper, b.count as f64)],
                    color.mix(0.85).filled(),
                )
            }))
            .map_err(plot_err)?;
        chart
            .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
                Rectangle::new(
                    [(b.lower, 0.0), (b.upper, b.count as f64)],
                    BLACK.stroke_width(1),
                )
            }))
            .map_err(plot_err)?;
        Ok(())
    }

    fn draw_columns(
        &self,
        area: &Area<'_>,
        panel: &Panel,
        bars: &[Bar],
        color: RGBColor,
    ) -> Result<()> {
        let n = bars.len();
        let top = headroom(bars.iter().map(|b| b.value).fold(0.0, f64::max));

        let mut chart = self
            .builder(area, panel, 56)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..top)
            .map_err(plot_err)?;

        if self.text {
            let x_fmt = |v: &f64| slot_label(bars, *v, false);
            let y_fmt = |v: &f64| axis_number(*v);
            let mut mesh = chart.configure_mesh();
            mesh.disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style((FONT_FAMILY, 12));
            if let Some(x) = &panel.x_label {
                mesh.x_desc(x.as_str());
            }
            if let Some(y) = &panel.y_label {
                mesh.y_desc(y.as_str());
            }
            mesh.draw().map_err(plot_err)?;
        }

        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.value)], color.filled())
            }))
            .map_err(plot_err)?;
        Ok(())
    }

    /// First bar on top.
    fn draw_rows(
        &self,
        area: &Area<'_>,
        panel: &Panel,
        bars: &[Bar],
        color: RGBColor,
    ) -> Result<()> {
        let n = bars.len();
        let right = headroom(bars.iter().map(|b| b.value).fold(0.0, f64::max));

        let mut chart = self
            .builder(area, panel, 130)
            .build_cartesian_2d(0f64..right, -0.5f64..(n as f64 - 0.5))
            .map_err(plot_err)?;

        if self.text {
            let x_fmt = |v: &f64| axis_number(*v);
            let y_fmt = |v: &f64| slot_label(bars, *v, true);
            let mut mesh = chart.configure_mesh();
            mesh.disable_y_mesh()
                .y_labels(n)
                .x_labels(5)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style((FONT_FAMILY, 12));
            if let Some(x) = &panel.x_label {
                mesh.x_desc(x.as_str());
            }
            mesh.draw().map_err(plot_err)?;
        }

        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                let y = (n - 1 - i) as f64;
                Rectangle::new([(0.0, y - 0.4), (b.value, y + 0.4)], color.filled())
            }))
            .map_err(plot_err)?;
        Ok(())
    }
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(pixels, width, height, ColorType::Rgb8)
        .context("encoding png")?;
    Ok(out)
}

impl ChartBackend for PngBackend {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn render(&self, figure: &Figure) -> Result<Vec<u8>> {
        let (width, height) = (figure.width.max(1), figure.height.max(1));
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            self.draw_figure(&root, figure)?;
            root.present().map_err(plot_err)?;
        }
        encode_png(&pixels, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(values: &[(&str, f64)]) -> Vec<Bar> {
        values
            .iter()
            .map(|(l, v)| Bar {
                label: l.to_string(),
                value: *v,
            })
            .collect()
    }

    fn figure(series: Series) -> Figure {
        Figure {
            title: Some("Overview".into()),
            width: 400,
            height: 300,
            rows: 1,
            cols: 1,
            panels: vec![Panel {
                title: "Panel".into(),
                x_label: Some("Stars Count".into()),
                y_label: Some("Number of Repositories".into()),
                color: "#2ca02c",
                series,
            }],
        }
    }

    /// Width and height from the IHDR chunk.
    fn png_dims(bytes: &[u8]) -> (u32, u32) {
        let w = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let h = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (w, h)
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex("#e74c3c"), RGBColor(0xe7, 0x4c, 0x3c));
        assert_eq!(parse_hex("9467bd"), RGBColor(0x94, 0x67, 0xbd));
        assert_eq!(parse_hex("#fff"), RGBColor(31, 119, 180));
        assert_eq!(parse_hex("#zzzzzz"), RGBColor(31, 119, 180));
    }

    #[test]
    fn slot_labels_map_ticks_to_bars() {
        let b = bars(&[("react", 3.0), ("vscode", 2.0), ("zuul", 1.0)]);
        assert_eq!(slot_label(&b, 0.0, false), "react");
        assert_eq!(slot_label(&b, 2.0, false), "zuul");
        // horizontal: slot 2 is the top row, i.e. the first bar
        assert_eq!(slot_label(&b, 2.0, true), "react");
        assert_eq!(slot_label(&b, 0.0, true), "zuul");
        assert_eq!(slot_label(&b, 0.5, false), "");
        assert_eq!(slot_label(&b, -1.0, false), "");
        assert_eq!(slot_label(&b, 3.0, false), "");
    }

    #[test]
    fn every_series_kind_encodes_to_png() {
        let kinds = vec![
            Series::Bars {
                bars: bars(&[("Rust", 4.0), ("Go", 2.0)]),
                orientation: Orientation::Vertical,
                rotate_labels: true,
            },
            Series::Bars {
                bars: bars(&[("react", 229_000.0), ("zuul", 13_500.0)]),
                orientation: Orientation::Horizontal,
                rotate_labels: false,
            },
            Series::Histogram {
                bins: vec![
                    HistogramBin { lower: 0.0, upper: 5.0, count: 2 },
                    HistogramBin { lower: 5.0, upper: 10.0, count: 0 },
                    HistogramBin { lower: 10.0, upper: 15.0, count: 1 },
                ],
            },
            Series::Bars {
                bars: vec![],
                orientation: Orientation::Vertical,
                rotate_labels: false,
            },
        ];

        for backend in [PngBackend::without_text(), PngBackend::new(None)] {
            for series in &kinds {
                let bytes = backend.render(&figure(series.clone())).unwrap();
                assert_eq!(bytes[..8], PNG_SIGNATURE);
                assert_eq!(png_dims(&bytes), (400, 300));
            }
        }
    }

    #[test]
    fn single_bar_does_not_collapse_the_axis() {
        let fig = figure(Series::Bars {
            bars: bars(&[("only", 7.0)]),
            orientation: Orientation::Vertical,
            rotate_labels: false,
        });
        let bytes = PngBackend::without_text().render(&fig).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);
    }
}
