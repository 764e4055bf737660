//! Candidate detection: does a single ink pixel look like a junction?
//!
//! A pixel in the middle of one drawn stroke has ink on both sides along
//! exactly one direction (the stroke's own). Where two or more strokes
//! meet, ink fans out along several directions. [`could_be_intersection`]
//! samples pairs of opposite rays at a few radii and counts the
//! directions whose samples are all ink.
//!
//! Directions are spread over a half-turn only: each direction tests the
//! forward and backward offset together.

use std::f64::consts::PI;

use crate::field::BinaryField;
use crate::types::{DetectionConfig, Point};

/// Precomputed ray offsets for radial sampling.
///
/// `directions[i][k]` is the rounded offset at the `k`-th radius along
/// the `i`-th direction. Built once per scan from a [`DetectionConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadialSampling {
    directions: Vec<Vec<Point>>,
    min_directions: usize,
}

impl RadialSampling {
    /// Build the sampling pattern for explicit radii and angle steps.
    #[must_use]
    pub fn new(radii: &[u32], angle_steps: u32, min_directions: u32) -> Self {
        let directions = (0..angle_steps)
            .map(|step| {
                let angle = direction_angle(step, angle_steps);
                radii
                    .iter()
                    .map(|&r| polar_offset(f64::from(r), angle))
                    .collect()
            })
            .collect();
        Self {
            directions,
            min_directions: min_directions as usize,
        }
    }

    /// Build the sampling pattern described by `config`.
    #[must_use]
    pub fn from_config(config: &DetectionConfig) -> Self {
        let radii = sampling_radii(config.max_radius, config.min_radius, config.radius_step);
        Self::new(&radii, config.angle_steps, config.min_directions)
    }

    /// Number of sampled directions.
    #[must_use]
    pub fn direction_count(&self) -> usize {
        self.directions.len()
    }

    /// Offsets along the `index`-th direction, largest radius first.
    #[must_use]
    pub fn offsets(&self, index: usize) -> Option<&[Point]> {
        self.directions.get(index).map(Vec::as_slice)
    }
}

/// Descending sampling radii: `max_radius`, `max_radius - step`, ...
/// while strictly greater than `min_radius`.
///
/// A zero `step` is treated as 1.
#[must_use]
pub fn sampling_radii(max_radius: u32, min_radius: u32, step: u32) -> Vec<u32> {
    (min_radius.saturating_add(1)..=max_radius)
        .rev()
        .step_by(step.max(1) as usize)
        .collect()
}

/// Angle of the `step`-th direction out of `angle_steps` over `[0, π)`.
#[must_use]
pub fn direction_angle(step: u32, angle_steps: u32) -> f64 {
    f64::from(step) * PI / f64::from(angle_steps.max(1))
}

/// Offset `(r cos θ, r sin θ)` rounded to the nearest pixel, ties to even.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn polar_offset(radius: f64, angle: f64) -> Point {
    Point::new(
        (radius * angle.cos()).round_ties_even() as i32,
        (radius * angle.sin()).round_ties_even() as i32,
    )
}

/// Number of directions along which every forward and backward sample
/// around `point` is in bounds and ink.
///
/// Returns 0 for a background `point`.
#[must_use]
pub fn accepted_directions(point: Point, field: &BinaryField, sampling: &RadialSampling) -> usize {
    if !field.is_ink(point) {
        return 0;
    }
    sampling
        .directions
        .iter()
        .filter(|offsets| is_accepted(point, offsets, field))
        .count()
}

/// Whether `point` could be the meeting point of two or more strokes.
///
/// Background pixels are never candidates. Samples that fall outside
/// the field reject their direction, so points closer to the border than
/// the largest radius can only be accepted along directions that stay
/// inside.
#[must_use]
pub fn could_be_intersection(point: Point, field: &BinaryField, sampling: &RadialSampling) -> bool {
    if !field.is_ink(point) {
        return false;
    }
    let mut count = 0;
    for offsets in &sampling.directions {
        if is_accepted(point, offsets, field) {
            count += 1;
            if count >= sampling.min_directions {
                return true;
            }
        }
    }
    false
}

/// A sample whose coordinates overflow is out of bounds and rejects
/// the direction.
fn is_accepted(point: Point, offsets: &[Point], field: &BinaryField) -> bool {
    !offsets.is_empty()
        && offsets.iter().all(|&d| {
            point.checked_add(d).is_some_and(|q| field.is_ink(q))
                && point.checked_sub(d).is_some_and(|q| field.is_ink(q))
        })
}
