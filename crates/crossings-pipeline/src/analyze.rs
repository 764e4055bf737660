//! Intersection counting: compose scanning, probing, and the near-edge
//! test into the final result.
//!
//! 1. Scan the field for junctions ([`find_junction_points`]).
//! 2. Probe every unordered pair of junctions; connected pairs become
//!    inferred edges ([`infer_edges`]).
//! 3. Flag every junction lying near an inferred edge it is not an
//!    endpoint of ([`flag_intersections`]).
//!
//! The flags live in a `Vec<bool>` indexed like the junction list and
//! owned by the [`Analysis`]; points themselves are never mutated.

use serde::{Deserialize, Serialize};

use crate::connect::{ProbeConfig, are_connected};
use crate::crossing::is_near_segment;
use crate::field::BinaryField;
use crate::graph::JunctionGraph;
use crate::scan::{SuppressionMask, find_junction_points};
use crate::types::{DetectionConfig, Dimensions, PipelineError, Point};

/// Everything the pipeline learns about one field.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Detected junctions in scan order.
    pub junctions: Vec<Point>,
    /// Suppression mask left by the scan, for rendering.
    pub mask: SuppressionMask,
    /// Inferred edges between junctions.
    pub graph: JunctionGraph,
    /// `flags[i]` is set when junction `i` lies on an inferred edge it
    /// is not an endpoint of.
    pub flags: Vec<bool>,
}

impl Analysis {
    /// Number of junctions flagged as intersections.
    #[must_use]
    pub fn intersection_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Flagged junctions, in scan order.
    pub fn intersections(&self) -> impl Iterator<Item = Point> + '_ {
        self.junctions
            .iter()
            .zip(&self.flags)
            .filter_map(|(&p, &flag)| flag.then_some(p))
    }

    /// Serializable summary for export.
    #[must_use]
    pub fn report(&self, dimensions: Dimensions) -> Report {
        Report {
            dimensions,
            junctions: self.junctions.clone(),
            edges: self.graph.edges().map(|(i, j)| [i, j]).collect(),
            intersections: self.intersections().collect(),
            intersection_count: self.intersection_count(),
        }
    }
}

/// Serializable summary of an [`Analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
    /// Detected junctions in scan order.
    pub junctions: Vec<Point>,
    /// Inferred edges as `[lower, higher]` indices into `junctions`.
    pub edges: Vec<[usize; 2]>,
    /// Junctions flagged as intersections.
    pub intersections: Vec<Point>,
    /// `intersections.len()`.
    pub intersection_count: usize,
}

/// Run the full detection pipeline on a field.
#[must_use]
pub fn analyze(field: &BinaryField, config: &DetectionConfig) -> Analysis {
    let scan = find_junction_points(field, config);
    let graph = infer_edges(&scan.points, field, &ProbeConfig::from_config(config));
    let flags = flag_intersections(&scan.points, &graph, config.near_edge_threshold);

    tracing::debug!(
        junctions = scan.points.len(),
        edges = graph.edge_count(),
        intersections = flags.iter().filter(|&&f| f).count(),
        "analysis complete"
    );

    Analysis {
        junctions: scan.points,
        mask: scan.mask,
        graph,
        flags,
    }
}

/// Like [`analyze`], but validates `config` first.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`DetectionConfig::validate`].
pub fn analyze_checked(
    field: &BinaryField,
    config: &DetectionConfig,
) -> Result<Analysis, PipelineError> {
    config.validate()?;
    Ok(analyze(field, config))
}

/// Probe every unordered pair of junctions and collect the connected
/// ones as edges.
#[must_use]
pub fn infer_edges(junctions: &[Point], field: &BinaryField, probe: &ProbeConfig) -> JunctionGraph {
    let mut graph = JunctionGraph::new(junctions);
    for (i, &a) in junctions.iter().enumerate() {
        for (j, &b) in junctions.iter().enumerate().skip(i + 1) {
            if are_connected(a, b, field, probe) {
                tracing::trace!(i, j, "inferred edge");
                graph.connect(i, j);
            }
        }
    }
    graph
}

/// Flag the junctions lying within `threshold` of an inferred edge they
/// are not an endpoint of.
#[must_use]
pub fn flag_intersections(junctions: &[Point], graph: &JunctionGraph, threshold: f64) -> Vec<bool> {
    let mut flags = vec![false; junctions.len()];
    for (i, j) in graph.edges() {
        let (a, b) = (junctions[i], junctions[j]);
        for (k, &p) in junctions.iter().enumerate() {
            if k == i || k == j || flags[k] {
                continue;
            }
            if is_near_segment(a, b, p, threshold) {
                flags[k] = true;
            }
        }
    }
    flags
}
