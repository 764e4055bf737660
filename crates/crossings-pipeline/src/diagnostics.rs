//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`crate::process`] and records how long each took and what it
//! produced. Timestamps come from a caller-supplied [`Clock`], which
//! keeps this crate free of platform time sources.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analyze::{Analysis, flag_intersections, infer_edges};
use crate::connect::ProbeConfig;
use crate::field::BinaryField;
use crate::scan::{CellState, find_junction_points};
use crate::types::{DetectionConfig, PipelineError, ProcessResult, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 0: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 1: grayscale conversion and thresholding.
    pub threshold: StageDiagnostics,
    /// Stage 2: junction scan and de-duplication.
    pub scan: StageDiagnostics,
    /// Stage 3: pairwise connectivity probing.
    pub connectivity: StageDiagnostics,
    /// Stage 4: near-edge flagging.
    pub crossing: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Thresholding metrics.
    Threshold {
        /// Luma threshold used.
        ink_threshold: u8,
        /// Number of ink pixels.
        ink_pixel_count: u64,
        /// Total pixel count for computing ink density.
        total_pixel_count: u64,
    },
    /// Junction scan metrics.
    Scan {
        /// Junctions found.
        junction_count: usize,
        /// Ink pixels suppressed by the de-duplicator.
        suppressed_pixel_count: usize,
        /// Suppression half-width in pixels.
        suppression_limit: u32,
    },
    /// Connectivity probing metrics.
    Connectivity {
        /// Unordered junction pairs probed.
        pairs_probed: usize,
        /// Pairs found connected.
        edge_count: usize,
        /// Connected components of the junction graph.
        component_count: usize,
    },
    /// Crossing evaluation metrics.
    Crossing {
        /// Near-edge distance threshold in pixels.
        near_edge_threshold: f64,
        /// Junctions flagged as intersections.
        intersection_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Junctions found.
    pub junction_count: usize,
    /// Inferred edges.
    pub edge_count: usize,
    /// Intersections counted.
    pub intersection_count: usize,
}

/// Run the pipeline and collect per-stage diagnostics.
///
/// The decoded input is handed back in the [`StagedResult`] for callers
/// that draw over it.
///
/// # Errors
///
/// Same as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &DetectionConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let start = clock.now();

    let t = clock.now();
    let image = crate::grayscale::decode(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: image.width(),
            height: image.height(),
        },
    };

    let t = clock.now();
    let gray = crate::grayscale::to_gray(&image);
    let field = BinaryField::from_luma(&gray, config.ink_threshold);
    let dimensions = field.dimensions();
    let threshold = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Threshold {
            ink_threshold: config.ink_threshold,
            ink_pixel_count: field.ink_count() as u64,
            total_pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
        },
    };

    let t = clock.now();
    let junction_scan = find_junction_points(&field, config);
    let scan = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Scan {
            junction_count: junction_scan.points.len(),
            suppressed_pixel_count: junction_scan.mask.count(CellState::Suppressed),
            suppression_limit: config.suppression_limit,
        },
    };

    let t = clock.now();
    let graph = infer_edges(&junction_scan.points, &field, &ProbeConfig::from_config(config));
    let n = junction_scan.points.len();
    let connectivity = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Connectivity {
            pairs_probed: n * n.saturating_sub(1) / 2,
            edge_count: graph.edge_count(),
            component_count: graph.component_count(),
        },
    };

    let t = clock.now();
    let flags = flag_intersections(&junction_scan.points, &graph, config.near_edge_threshold);
    let analysis = Analysis {
        junctions: junction_scan.points,
        mask: junction_scan.mask,
        graph,
        flags,
    };
    let crossing = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Crossing {
            near_edge_threshold: config.near_edge_threshold,
            intersection_count: analysis.intersection_count(),
        },
    };

    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        junction_count: analysis.junctions.len(),
        edge_count: analysis.graph.edge_count(),
        intersection_count: analysis.intersection_count(),
    };

    let diagnostics = PipelineDiagnostics {
        decode,
        threshold,
        scan,
        connectivity,
        crossing,
        total_duration: clock.elapsed(&start),
        summary,
    };

    Ok((
        StagedResult {
            original: image,
            result: ProcessResult {
                analysis,
                dimensions,
            },
        },
        diagnostics,
    ))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Threshold", &self.threshold),
            ("Junction Scan", &self.scan),
            ("Connectivity", &self.connectivity),
            ("Crossing", &self.crossing),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Junctions: {}  |  Edges: {}  |  Intersections: {}",
            self.summary.junction_count, self.summary.edge_count, self.summary.intersection_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Threshold {
            ink_threshold,
            ink_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *ink_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("luma<{ink_threshold} ink={ink_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Scan {
            junction_count,
            suppressed_pixel_count,
            suppression_limit,
        } => format!(
            "{junction_count} junctions, {suppressed_pixel_count} px suppressed (limit={suppression_limit})"
        ),
        StageMetrics::Connectivity {
            pairs_probed,
            edge_count,
            component_count,
        } => format!("{pairs_probed} pairs -> {edge_count} edges, {component_count} components"),
        StageMetrics::Crossing {
            near_edge_threshold,
            intersection_count,
        } => format!("threshold={near_edge_threshold:.1}px -> {intersection_count} intersections"),
    }
}
