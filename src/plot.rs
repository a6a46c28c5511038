//! Figure composition: one subplot per metric, one curve per run.

use crate::palette::ColorMap;
use crate::series::{MetricCollection, SeriesRecord};
use crate::smooth::{smooth, SmoothMethod};
use anyhow::{Context, Result};
use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

/// Pixels per inch of subplot size.
const DPI: f64 = 150.0;

/// X-axis semantics for every subplot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum XAxis {
    /// Raw step index.
    Step,
    /// Hours elapsed since each run's first sample.
    Walltime,
}

/// Layout and rendering options for the composed figure.
#[derive(Debug, Clone)]
pub struct FigureOptions {
    pub output: PathBuf,
    /// Per-subplot size in inches.
    pub subplot_width: f64,
    pub subplot_height: f64,
    pub max_cols: usize,
    pub smooth: Option<SmoothMethod>,
    pub smooth_window: usize,
    pub show_both: bool,
    pub x_axis: XAxis,
}

/// What was drawn, reported to the caller after the file is written.
#[derive(Debug, Clone, Copy)]
pub struct FigureSummary {
    pub width_px: u32,
    pub height_px: u32,
    pub metrics: usize,
}

/// Render the metric grid and write it to `opts.output`.
///
/// Returns `None` without touching the output path when the collection is
/// empty. The output extension picks the backend: `.svg` is vector,
/// anything else rasterizes to a bitmap.
pub fn compose(data: &MetricCollection, opts: &FigureOptions) -> Result<Option<FigureSummary>> {
    if data.is_empty() {
        return Ok(None);
    }

    let (rows, cols) = grid_shape(data.len(), opts.max_cols);
    let width_px = (opts.subplot_width * DPI * cols as f64).round() as u32;
    let height_px = (opts.subplot_height * DPI * rows as f64).round() as u32;

    let svg = opts
        .output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if svg {
        let root = SVGBackend::new(&opts.output, (width_px, height_px)).into_drawing_area();
        draw_figure(&root, data, opts, rows, cols)?;
        root.present().context("failed to write figure")?;
    } else {
        let root = BitMapBackend::new(&opts.output, (width_px, height_px)).into_drawing_area();
        draw_figure(&root, data, opts, rows, cols)?;
        root.present().context("failed to write figure")?;
    }

    Ok(Some(FigureSummary {
        width_px,
        height_px,
        metrics: data.len(),
    }))
}

/// Columns = min(metric count, max columns); rows = ceiling division.
fn grid_shape(n_metrics: usize, max_cols: usize) -> (usize, usize) {
    let cols = n_metrics.min(max_cols.max(1));
    let rows = n_metrics.div_ceil(cols);
    (rows, cols)
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &MetricCollection,
    opts: &FigureOptions,
    rows: usize,
    cols: usize,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let titled = root.titled("TensorBoard Metrics Visualization", ("sans-serif", 32))?;
    let areas = titled.split_evenly((rows, cols));

    // One color map for the whole figure keeps a run's color stable across
    // subplots; metrics iterate in sorted-name order.
    let mut colors = ColorMap::new();
    for (area, (metric, records)) in areas.iter().zip(data.iter()) {
        draw_subplot(area, metric, records, opts, &mut colors)?;
    }
    Ok(())
}

/// One run's prepared curve: x values, raw y values, and the smoothed y
/// values when smoothing is requested.
struct Curve {
    x: Vec<f64>,
    raw: Vec<f64>,
    smoothed: Option<Vec<f64>>,
    label: String,
    color: RGBColor,
}

fn curve_for(record: &SeriesRecord, opts: &FigureOptions, colors: &mut ColorMap) -> Curve {
    let x = match opts.x_axis {
        XAxis::Step => record.steps.iter().map(|&s| s as f64).collect(),
        XAxis::Walltime => elapsed_hours(&record.wall_times),
    };
    let smoothed = opts
        .smooth
        .map(|method| smooth(&record.values, method, opts.smooth_window));
    Curve {
        x,
        raw: record.values.clone(),
        smoothed,
        label: record.run_name.clone(),
        color: colors.color_for(&record.run_name),
    }
}

/// Hours elapsed since the first sample; the first sample is always x = 0.
fn elapsed_hours(wall_times: &[f64]) -> Vec<f64> {
    let Some(&first) = wall_times.first() else {
        return Vec::new();
    };
    wall_times.iter().map(|&wt| (wt - first) / 3600.0).collect()
}

fn draw_subplot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    metric: &str,
    records: &[SeriesRecord],
    opts: &FigureOptions,
    colors: &mut ColorMap,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let curves: Vec<Curve> = records
        .iter()
        .map(|record| curve_for(record, opts, colors))
        .collect();

    let (x_min, x_max, y_min, y_max) = data_bounds(&curves, opts.show_both);
    let (x_min, x_max) = guard_range(x_min, x_max);
    let (y_min, y_max) = pad_range(y_min, y_max);

    let x_label = match opts.x_axis {
        XAxis::Step => "Step",
        XAxis::Walltime => "Wall Time (hours)",
    };

    let mut chart = ChartBuilder::on(area)
        .caption(metric, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Value")
        .draw()?;

    for curve in &curves {
        let color = curve.color;
        match (&curve.smoothed, opts.show_both) {
            (Some(smoothed), true) => {
                // Raw curve underneath, excluded from the legend.
                chart.draw_series(LineSeries::new(
                    points(&curve.x, &curve.raw),
                    color.mix(0.35).stroke_width(1),
                ))?;
                chart
                    .draw_series(LineSeries::new(
                        points(&curve.x, smoothed),
                        color.mix(0.9).stroke_width(2),
                    ))?
                    .label(curve.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            (Some(smoothed), false) => {
                chart
                    .draw_series(LineSeries::new(
                        points(&curve.x, smoothed),
                        color.mix(0.8).stroke_width(2),
                    ))?
                    .label(curve.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            (None, _) => {
                chart
                    .draw_series(LineSeries::new(
                        points(&curve.x, &curve.raw),
                        color.mix(0.8).stroke_width(2),
                    ))?
                    .label(curve.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn points<'a>(xs: &'a [f64], ys: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    xs.iter().copied().zip(ys.iter().copied())
}

/// Min/max over the curves that will actually be drawn.
fn data_bounds(curves: &[Curve], show_both: bool) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for curve in curves {
        for &x in &curve.x {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }
        let mut track = |values: &[f64]| {
            for &y in values {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        };
        match (&curve.smoothed, show_both) {
            (Some(smoothed), true) => {
                track(&curve.raw);
                track(smoothed);
            }
            (Some(smoothed), false) => track(smoothed),
            (None, _) => track(&curve.raw),
        }
    }

    (x_min, x_max, y_min, y_max)
}

/// Widen a degenerate or non-finite range so the chart can always build.
fn guard_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    (min, max)
}

/// `guard_range` plus a small vertical margin so curves don't hug the frame.
fn pad_range(min: f64, max: f64) -> (f64, f64) {
    let (min, max) = guard_range(min, max);
    let margin = (max - min) * 0.05;
    (min - margin, max + margin)
}
