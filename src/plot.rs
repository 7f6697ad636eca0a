//! Rendering of histograms as SVG images

use crate::{histogram::Hist1D, output::HistogramFile};
use eyre::{Result, WrapErr};
use log::info;
use std::{
    fmt::{self, Write as _},
    fs,
    path::{Path, PathBuf},
};

// Figure geometry, in pixels
const WIDTH: f64 = 640.;
const HEIGHT: f64 = 480.;
const LEFT: f64 = 70.;
const RIGHT: f64 = 20.;
const TOP: f64 = 40.;
const BOTTOM: f64 = 55.;
const TICK: f64 = 6.;

/// Axis with "nice number" ticks
#[derive(Clone, Debug, PartialEq)]
struct Axis {
    min: f64,
    max: f64,
    ticks: Vec<f64>,
    step: f64,
}
//
impl Axis {
    /// Axis covering exactly [min, max], with ticks where they fall inside
    fn fixed(min: f64, max: f64, target_ticks: usize) -> Self {
        let step = nice_step((max - min) / (target_ticks.max(2) - 1) as f64);
        let mut ticks = Vec::new();
        let mut tick = (min / step).ceil() * step;
        while tick <= max + step * 1e-6 {
            ticks.push(tick);
            tick += step;
        }
        Self {
            min,
            max,
            ticks,
            step,
        }
    }

    /// Axis starting at zero and extended to a round number above max
    fn from_zero(max: f64, target_ticks: usize) -> Self {
        let max = if max > 0. { max } else { 1. };
        let step = nice_step(max / (target_ticks.max(2) - 1) as f64);
        let nice_max = (max / step).ceil() * step;
        Self::fixed(0., nice_max, target_ticks)
    }

    /// Map a data value to a pixel coordinate
    fn to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        px_min + (value - self.min) / (self.max - self.min) * (px_max - px_min)
    }

    fn label(&self, value: f64) -> String {
        let decimals = if self.step >= 1. {
            0
        } else {
            (-self.step.log10().floor()) as usize
        };
        // Avoid "-0"
        let value = if value.abs() < self.step * 1e-6 { 0. } else { value };
        format!("{value:.decimals$}")
    }
}

/// Round a tick spacing to 1, 2 or 5 times a power of ten
fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.
    } else if frac <= 3.5 {
        2.
    } else if frac <= 7.5 {
        5.
    } else {
        10.
    };
    nice_frac * 10f64.powf(exp)
}

/// Turn the ROOT-style markup of histogram titles into plain text
fn plain_text(label: &str) -> String {
    let label = label
        .replace("#sqrt", "√")
        .replace("#pi", "π")
        .replace("#gamma", "γ")
        .replace("#mu", "μ")
        .replace("^{0}", "⁰")
        .replace(['{', '}'], "");
    label
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render a histogram as an SVG document
pub fn render_svg(hist: &Hist1D) -> Result<String> {
    let mut svg = String::new();
    write_svg(&mut svg, hist)?;
    Ok(svg)
}

fn write_svg(out: &mut impl fmt::Write, hist: &Hist1D) -> fmt::Result {
    let binning = hist.binning();
    let contents = hist.in_range();
    let y_max = contents.iter().fold(0., |max: f64, &c| max.max(c as f64));
    let x_axis = Axis::fixed(binning.low as f64, binning.high as f64, 6);
    let y_axis = Axis::from_zero(y_max * 1.1, 5);
    let (left, right) = (LEFT, WIDTH - RIGHT);
    let (top, bottom) = (TOP, HEIGHT - BOTTOM);
    let x = |value: f64| x_axis.to_pixel(value, left, right);
    let y = |value: f64| y_axis.to_pixel(value, bottom, top);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    // Histogram outline, as a step line closed on the x axis
    let mut path = format!("M{:.2},{:.2}", x(binning.low as f64), y(0.));
    for (idx, &content) in contents.iter().enumerate() {
        let low_edge = hist.bin_low_edge(idx + 1) as f64;
        let high_edge = low_edge + binning.width() as f64;
        write!(
            path,
            " L{:.2},{:.2} L{:.2},{:.2}",
            x(low_edge),
            y(content as f64),
            x(high_edge),
            y(content as f64)
        )?;
    }
    write!(path, " L{:.2},{:.2}", x(binning.high as f64), y(0.))?;
    writeln!(
        out,
        r#"<path d="{path}" fill="none" stroke="steelblue" stroke-width="1.5"/>"#
    )?;

    // Frame and ticks
    writeln!(
        out,
        r#"<rect x="{left}" y="{top}" width="{}" height="{}" fill="none" stroke="black"/>"#,
        right - left,
        bottom - top
    )?;
    for &tick in &x_axis.ticks {
        let px = x(tick);
        writeln!(
            out,
            r#"<line x1="{px:.2}" y1="{bottom}" x2="{px:.2}" y2="{}" stroke="black"/>"#,
            bottom - TICK
        )?;
        writeln!(
            out,
            r#"<text x="{px:.2}" y="{}" font-size="12" text-anchor="middle">{}</text>"#,
            bottom + 16.,
            x_axis.label(tick)
        )?;
    }
    for &tick in &y_axis.ticks {
        let py = y(tick);
        writeln!(
            out,
            r#"<line x1="{left}" y1="{py:.2}" x2="{}" y2="{py:.2}" stroke="black"/>"#,
            left + TICK
        )?;
        writeln!(
            out,
            r#"<text x="{}" y="{:.2}" font-size="12" text-anchor="end">{}</text>"#,
            left - 4.,
            py + 4.,
            y_axis.label(tick)
        )?;
    }

    // Labels
    let title = match hist.main_title() {
        "" => hist.name().to_owned(),
        title => title.to_owned(),
    };
    writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="16" text-anchor="middle">{}</text>"#,
        (left + right) / 2.,
        TOP - 14.,
        plain_text(&title)
    )?;
    writeln!(
        out,
        r#"<text x="{right}" y="{}" font-size="13" text-anchor="end">{}</text>"#,
        HEIGHT - 12.,
        plain_text(hist.x_label())
    )?;
    writeln!(
        out,
        r#"<text x="16" y="{top}" font-size="13" text-anchor="end" transform="rotate(-90 16 {top})">{}</text>"#,
        plain_text(hist.y_label())
    )?;
    writeln!(out, "</svg>")
}

/// Render every histogram of a histogram file into `<out_dir>/<name>.svg`
pub fn plot_file(hists: &HistogramFile, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(hists.histograms.len());
    for hist in &hists.histograms {
        let path = out_dir.join(format!("{}.svg", hist.name()));
        fs::write(&path, render_svg(hist)?)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!("Plotted {} into {}", hist.name(), path.display());
        written.push(path);
    }
    Ok(written)
}
