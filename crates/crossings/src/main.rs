//! crossings: count edge crossings in an image of a graph drawing.
//!
//! Reads a raster image of a drawing made of dark strokes on a light
//! background, finds the junctions where strokes meet, infers which
//! junctions are joined by a stroke, and prints how many junctions lie
//! on an edge between two others.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin crossings -- [OPTIONS] <FILENAME>
//! ```
//!
//! Set `RUST_LOG=debug` for per-stage counts, `RUST_LOG=trace` for every
//! junction and edge.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use crossings_export::{OverlayStyle, SvgMetadata};
use crossings_pipeline::diagnostics::{Clock, process_with_diagnostics};
use crossings_pipeline::{DetectionConfig, ProcessResult, StagedResult};
use tracing_subscriber::EnvFilter;

/// Count the edge crossings in an image of a graph drawing.
#[derive(Parser)]
#[command(name = "crossings", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    filename: PathBuf,

    /// Expected number of vertices in the drawing.
    ///
    /// Informational only: a mismatch with the detected junction count
    /// is logged as a warning.
    #[arg(short = 'v', long)]
    vertices: Option<usize>,

    /// Write a copy of the input with junction markers to this path.
    #[arg(short = 's', long)]
    save_image: Option<PathBuf>,

    /// Half-width of the overlay markers in pixels.
    #[arg(long, default_value_t = OverlayStyle::DEFAULT_MARKER_SIZE)]
    marker_size: u32,

    /// Tint the ink pixels absorbed by each junction in the overlay.
    #[arg(long)]
    show_suppressed: bool,

    /// Write an SVG of junctions and inferred edges to this path.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the result as JSON instead of a summary line.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Luma values below this are ink.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_INK_THRESHOLD)]
    ink_threshold: u8,

    /// Largest radial sampling radius in pixels.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_MAX_RADIUS)]
    max_radius: u32,

    /// Exclusive lower bound for sampling radii.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_MIN_RADIUS)]
    min_radius: u32,

    /// Decrement between sampling radii.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_RADIUS_STEP, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    radius_step: u32,

    /// Directions sampled over a half-turn.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_ANGLE_STEPS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    angle_steps: u32,

    /// Accepted directions needed for a junction.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_MIN_DIRECTIONS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    min_directions: u32,

    /// Half-width of the square suppressed around each junction.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_SUPPRESSION_LIMIT)]
    suppression_limit: u32,

    /// Pixel adjacency used when tracing strokes between junctions.
    #[arg(long, value_enum, default_value_t = Adjacency::Eight)]
    connectivity: Adjacency,

    /// Extra steps allowed beyond the straight-line distance.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_DEPTH_SLACK)]
    depth_slack: u32,

    /// Distance in pixels under which a junction lies on an edge.
    #[arg(long, default_value_t = DetectionConfig::DEFAULT_NEAR_EDGE_THRESHOLD)]
    near_edge_threshold: f64,

    /// Full detection config as a JSON string.
    ///
    /// When provided, all other detection parameter flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Pixel adjacency selection.
#[derive(Clone, Copy, ValueEnum)]
enum Adjacency {
    /// Horizontal and vertical neighbours.
    Four,
    /// Diagonal neighbours too.
    Eight,
}

/// Build a [`DetectionConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<DetectionConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(DetectionConfig {
        ink_threshold: cli.ink_threshold,
        max_radius: cli.max_radius,
        min_radius: cli.min_radius,
        radius_step: cli.radius_step,
        angle_steps: cli.angle_steps,
        min_directions: cli.min_directions,
        suppression_limit: cli.suppression_limit,
        connectivity: match cli.connectivity {
            Adjacency::Four => crossings_pipeline::Connectivity::Four,
            Adjacency::Eight => crossings_pipeline::Connectivity::Eight,
        },
        depth_slack: cli.depth_slack,
        near_edge_threshold: cli.near_edge_threshold,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.filename.display());
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        path = %cli.filename.display(),
        bytes = image_bytes.len(),
        "loaded image"
    );

    let (staged, diagnostics) = match process_with_diagnostics(&image_bytes, &config, &StdClock) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.diagnostics {
        eprintln!("{}", diagnostics.report());
    }

    let result = &staged.result;

    if let Some(expected) = cli.vertices {
        let found = result.analysis.junctions.len();
        if expected == found {
            tracing::info!(vertices = expected, "junction count matches vertex hint");
        } else {
            tracing::warn!(
                vertices = expected,
                junctions = found,
                "junction count differs from vertex hint"
            );
        }
    }

    if let Some(ref path) = cli.save_image
        && let Err(msg) = save_overlay(&cli, &staged, path)
    {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    if let Some(ref path) = cli.svg
        && let Err(msg) = save_svg(&cli, result, path)
    {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    if cli.json {
        match serde_json::to_string_pretty(&result.report()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{} intersections found", result.analysis.intersection_count());
    }

    ExitCode::SUCCESS
}

/// Write the decoded input with markers drawn on top.
fn save_overlay(cli: &Cli, staged: &StagedResult, path: &Path) -> Result<(), String> {
    let style = OverlayStyle {
        marker_size: cli.marker_size,
        suppressed_color: cli.show_suppressed.then_some(image::Rgb([0, 170, 0])),
        ..OverlayStyle::default()
    };
    let overlay =
        crossings_export::render_overlay(&staged.original, &staged.result.analysis, &style);
    overlay
        .save(path)
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "overlay written");
    Ok(())
}

fn save_svg(cli: &Cli, result: &ProcessResult, path: &Path) -> Result<(), String> {
    let title = cli
        .filename
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("crossings");
    let desc = format!("{} intersections found", result.analysis.intersection_count());
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&desc),
    };
    let svg = crossings_export::to_svg(&result.report(), &metadata);
    std::fs::write(path, &svg)
        .map_err(|e| format!("Error writing SVG to {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "SVG written");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
