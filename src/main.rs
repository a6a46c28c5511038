//! tbviz - combined comparison charts from TensorBoard event logs.
//!
//! Scans log directories for event files, merges same-named scalar metrics
//! across runs, and renders one grid figure with a subplot per metric and a
//! curve per run.

mod discover;
mod palette;
mod plot;
mod proto;
mod series;
mod smooth;
mod tfevents;

use anyhow::Result;
use clap::Parser;
use plot::{FigureOptions, XAxis};
use smooth::SmoothMethod;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Render a grid of comparison charts from TensorBoard event logs
#[derive(Parser, Debug)]
#[command(name = "tbviz")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directories to scan for event logs
    #[arg(required = true)]
    directories: Vec<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "tensorboard_visualization.png")]
    output: PathBuf,

    /// Width of each subplot in inches
    #[arg(long, default_value = "8")]
    width: f64,

    /// Height of each subplot in inches
    #[arg(long, default_value = "4")]
    height: f64,

    /// Maximum number of subplots per row
    #[arg(long, default_value = "3")]
    max_cols: usize,

    /// Open the saved image in a viewer
    #[arg(long)]
    show: bool,

    /// Curve smoothing method
    #[arg(long, value_enum)]
    smooth: Option<SmoothMethod>,

    /// Smoothing window size
    #[arg(long, default_value = "10")]
    smooth_window: usize,

    /// Draw the raw curve under the smoothed one (requires --smooth)
    #[arg(long)]
    show_both: bool,

    /// X-axis semantics
    #[arg(long, value_enum, default_value = "step")]
    x_axis: XAxis,

    /// Drop observations with a step beyond this bound
    #[arg(long)]
    max_step: Option<i64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let files = discover::find_event_files(&args.directories);
    if files.is_empty() {
        println!("No event files found");
        return Ok(());
    }
    println!("Found {} event files", files.len());

    let report = series::load_series(&files, &args.directories, args.max_step);
    for failure in &report.failures {
        warn!("skipped {}: {}", failure.file.display(), failure.error);
    }
    if report.metrics.is_empty() {
        println!("No scalar data loaded");
        return Ok(());
    }
    println!("Loaded {} metrics", report.metrics.len());

    let opts = FigureOptions {
        output: args.output.clone(),
        subplot_width: args.width,
        subplot_height: args.height,
        max_cols: args.max_cols,
        smooth: args.smooth,
        smooth_window: args.smooth_window,
        show_both: args.show_both,
        x_axis: args.x_axis,
    };

    match plot::compose(&report.metrics, &opts)? {
        Some(summary) => {
            println!("Visualization saved to: {}", args.output.display());
            println!("Figure size: {}x{} px", summary.width_px, summary.height_px);
            println!("Total metrics plotted: {}", summary.metrics);
        }
        None => {
            println!("No data to visualize");
            return Ok(());
        }
    }

    if args.show {
        if let Err(e) = open::that(&args.output) {
            warn!("failed to open {}: {}", args.output.display(), e);
        }
    }

    Ok(())
}
