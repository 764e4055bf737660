//! Shared types for the crossings detection pipeline.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::connect::Connectivity;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// A pixel position (or offset) in image coordinates.
///
/// `x` is the column, `y` the row. Points double as 2D integer vectors:
/// `+`, `-`, [`dot`](Self::dot) and [`cross`](Self::cross) are exact, and
/// only [`length`](Self::length) involves floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> i64 {
        i64::from(self.x) * i64::from(other.x) + i64::from(self.y) * i64::from(other.y)
    }

    /// Scalar 2D cross product (`self.x * other.y - self.y * other.x`).
    ///
    /// Positive when `other` is counter-clockwise of `self` in a y-up
    /// frame (clockwise on screen, where y grows downwards).
    #[must_use]
    pub fn cross(self, other: Self) -> i64 {
        i64::from(self.x) * i64::from(other.y) - i64::from(self.y) * i64::from(other.x)
    }

    /// Squared Euclidean length, exact.
    #[must_use]
    pub fn length_squared(self) -> i64 {
        self.dot(self)
    }

    /// Euclidean length of the vector.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn length(self) -> f64 {
        (self.length_squared() as f64).sqrt()
    }

    /// Component-wise addition, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_add(rhs.x), self.y.checked_add(rhs.y)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Component-wise subtraction, or `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_sub(rhs.x), self.y.checked_sub(rhs.y)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the detection pipeline.
///
/// Every constant that the detector, scanner, prober, and crossing
/// evaluator depend on lives here. The radial sampling parameters and
/// the suppression limit are empirically tuned to line thickness and
/// junction spacing; they have no closed-form derivation.
///
/// Use [`validate`](Self::validate) (called by [`crate::process`]) to
/// reject values that would make the pipeline meaningless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Luma values strictly below this threshold are ink.
    pub ink_threshold: u8,

    /// Largest radial sampling radius in pixels.
    pub max_radius: u32,

    /// Exclusive lower bound for sampling radii.
    pub min_radius: u32,

    /// Decrement between consecutive sampling radii.
    pub radius_step: u32,

    /// Number of sampled directions across a half-turn.
    pub angle_steps: u32,

    /// Accepted directions needed to classify a pixel as a junction.
    pub min_directions: u32,

    /// Half-width (Chebyshev radius) of the square suppressed around
    /// each detected junction.
    pub suppression_limit: u32,

    /// Pixel adjacency used when probing connectivity.
    pub connectivity: Connectivity,

    /// Extra BFS depth allowed beyond the straight-line distance.
    pub depth_slack: u32,

    /// A junction closer than this (in pixels) to an inferred edge it
    /// is not an endpoint of is counted as an intersection.
    pub near_edge_threshold: f64,
}

impl DetectionConfig {
    /// Default luma threshold separating ink from paper.
    pub const DEFAULT_INK_THRESHOLD: u8 = 100;
    /// Default largest sampling radius.
    pub const DEFAULT_MAX_RADIUS: u32 = 17;
    /// Default exclusive lower bound for sampling radii.
    pub const DEFAULT_MIN_RADIUS: u32 = 5;
    /// Default radius decrement.
    pub const DEFAULT_RADIUS_STEP: u32 = 3;
    /// Default number of directions over a half-turn.
    pub const DEFAULT_ANGLE_STEPS: u32 = 10;
    /// Default accepted-direction threshold.
    pub const DEFAULT_MIN_DIRECTIONS: u32 = 2;
    /// Default suppression half-width.
    pub const DEFAULT_SUPPRESSION_LIMIT: u32 = 30;
    /// Default BFS depth slack.
    pub const DEFAULT_DEPTH_SLACK: u32 = 5;
    /// Default near-edge distance threshold.
    pub const DEFAULT_NEAR_EDGE_THRESHOLD: f64 = 5.0;

    /// Largest accepted `max_radius`. Sampling rays longer than this
    /// exceed any stroke length the detector is tuned for.
    pub const MAX_RADIUS_LIMIT: u32 = 4096;
    /// Largest accepted `angle_steps`.
    pub const MAX_ANGLE_STEPS: u32 = 3600;

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `radius_step`,
    /// `angle_steps` or `min_directions` is zero, if `max_radius` does
    /// not exceed `min_radius`, if `max_radius` or `angle_steps` is above
    /// [`MAX_RADIUS_LIMIT`](Self::MAX_RADIUS_LIMIT) or
    /// [`MAX_ANGLE_STEPS`](Self::MAX_ANGLE_STEPS), or if
    /// `near_edge_threshold` is negative or not finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.radius_step == 0 {
            return Err(PipelineError::InvalidConfig(
                "radius_step must be at least 1".to_owned(),
            ));
        }
        if self.max_radius <= self.min_radius {
            return Err(PipelineError::InvalidConfig(format!(
                "max_radius ({}) must exceed min_radius ({})",
                self.max_radius, self.min_radius,
            )));
        }
        if self.max_radius > Self::MAX_RADIUS_LIMIT {
            return Err(PipelineError::InvalidConfig(format!(
                "max_radius ({}) must not exceed {}",
                self.max_radius,
                Self::MAX_RADIUS_LIMIT,
            )));
        }
        if self.angle_steps == 0 {
            return Err(PipelineError::InvalidConfig(
                "angle_steps must be at least 1".to_owned(),
            ));
        }
        if self.angle_steps > Self::MAX_ANGLE_STEPS {
            return Err(PipelineError::InvalidConfig(format!(
                "angle_steps ({}) must not exceed {}",
                self.angle_steps,
                Self::MAX_ANGLE_STEPS,
            )));
        }
        if self.min_directions == 0 {
            return Err(PipelineError::InvalidConfig(
                "min_directions must be at least 1".to_owned(),
            ));
        }
        if !self.near_edge_threshold.is_finite() || self.near_edge_threshold < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "near_edge_threshold must be finite and non-negative, got {}",
                self.near_edge_threshold,
            )));
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ink_threshold: Self::DEFAULT_INK_THRESHOLD,
            max_radius: Self::DEFAULT_MAX_RADIUS,
            min_radius: Self::DEFAULT_MIN_RADIUS,
            radius_step: Self::DEFAULT_RADIUS_STEP,
            angle_steps: Self::DEFAULT_ANGLE_STEPS,
            min_directions: Self::DEFAULT_MIN_DIRECTIONS,
            suppression_limit: Self::DEFAULT_SUPPRESSION_LIMIT,
            connectivity: Connectivity::default(),
            depth_slack: Self::DEFAULT_DEPTH_SLACK,
            near_edge_threshold: Self::DEFAULT_NEAR_EDGE_THRESHOLD,
        }
    }
}

/// Result of running the full pipeline on encoded image bytes.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Junctions, inferred edges, and intersection flags.
    pub analysis: crate::analyze::Analysis,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Pipeline output together with the decoded source image.
///
/// Returned by [`crate::diagnostics::process_with_diagnostics`] so
/// callers that render over the input do not decode it a second time.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// The decoded input image.
    pub original: image::DynamicImage,
    /// Detection result for `original`.
    pub result: ProcessResult,
}

impl ProcessResult {
    /// Serializable summary of the analysis.
    #[must_use]
    pub fn report(&self) -> crate::analyze::Report {
        self.analysis.report(self.dimensions)
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_are_componentwise() {
        let a = Point::new(3, -4);
        let b = Point::new(-1, 7);
        assert_eq!(a + b, Point::new(2, 3));
        assert_eq!(a - b, Point::new(4, -11));
        assert_eq!(a + b - b, a);
    }

    #[test]
    fn dot_and_cross() {
        let a = Point::new(2, 3);
        let b = Point::new(4, -1);
        assert_eq!(a.dot(b), 5);
        assert_eq!(a.cross(b), -14);
        assert_eq!(b.cross(a), 14);
        assert_eq!(a.cross(a), 0);
    }

    #[test]
    fn dot_and_cross_do_not_overflow_i32() {
        let a = Point::new(i32::MAX, i32::MAX);
        assert_eq!(a.dot(a), 2 * i64::from(i32::MAX) * i64::from(i32::MAX));
        assert_eq!(a.cross(a), 0);
    }

    #[test]
    fn length_of_pythagorean_triple() {
        assert!((Point::new(3, 4).length() - 5.0).abs() < 1e-12);
        assert!((Point::new(-6, 8).length() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Point::new(10, 20);
        let b = Point::new(13, 16);
        assert!((a.distance(b) - b.distance(a)).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!(a.distance(a).abs() < f64::EPSILON);
    }

    #[test]
    fn equality_is_exact() {
        assert_eq!(Point::new(1, 2), Point::new(1, 2));
        assert_ne!(Point::new(1, 2), Point::new(2, 1));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_radius_step_is_rejected() {
        let config = DetectionConfig {
            radius_step: 0,
            ..DetectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_radius_range_is_rejected() {
        let config = DetectionConfig {
            max_radius: 5,
            min_radius: 5,
            ..DetectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_sampling_is_rejected() {
        let config = DetectionConfig {
            max_radius: 3_000_000_000,
            min_radius: 2_999_999_990,
            ..DetectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));

        let at_limit = DetectionConfig {
            max_radius: DetectionConfig::MAX_RADIUS_LIMIT,
            ..DetectionConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let config = DetectionConfig {
            angle_steps: DetectionConfig::MAX_ANGLE_STEPS + 1,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let p = Point::new(10, 10);
        assert_eq!(p.checked_add(Point::new(1, -1)), Some(Point::new(11, 9)));
        assert_eq!(p.checked_add(Point::new(i32::MAX, 0)), None);
        assert_eq!(p.checked_sub(Point::new(0, i32::MIN)), None);
        assert_eq!(p.checked_sub(Point::new(3, 4)), Some(Point::new(7, 6)));
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let config = DetectionConfig {
            near_edge_threshold: f64::NAN,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DetectionConfig {
            near_edge_threshold: -1.0,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_angle_steps_and_directions_are_rejected() {
        let config = DetectionConfig {
            angle_steps: 0,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DetectionConfig {
            min_directions: 0,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = DetectionConfig {
            suppression_limit: 12,
            connectivity: Connectivity::Four,
            ..DetectionConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: DetectionConfig = serde_json::from_str(r#"{"depth_slack": 9}"#).unwrap();
        assert_eq!(config.depth_slack, 9);
        assert_eq!(config.max_radius, DetectionConfig::DEFAULT_MAX_RADIUS);
    }
}
