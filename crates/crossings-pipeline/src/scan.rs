//! Candidate scanning and de-duplication.
//!
//! Every ink pixel near a physical junction tends to pass the radial
//! test, so one drawn crossing would otherwise produce a cluster of
//! candidates. The scanner walks the field in row-major order and, after
//! each positive detection, suppresses the ink in a square of half-width
//! `suppression_limit` around it so no neighbour of the same junction is
//! tested again.
//!
//! Two real junctions closer than the limit collapse into one: the limit
//! must be tuned to the expected junction spacing of the input.

use crate::detect::{RadialSampling, could_be_intersection};
use crate::field::BinaryField;
use crate::types::{DetectionConfig, Point};

/// Per-pixel state of the suppression mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    /// Not yet covered by any detection.
    #[default]
    Unvisited,
    /// Ink covered by a nearby junction; never tested again.
    Suppressed,
    /// The representative pixel of a detected junction.
    Junction,
}

/// Working mask of the scanner, same dimensions as the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionMask {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
}

impl SuppressionMask {
    /// Create a mask with every cell [`CellState::Unvisited`].
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Unvisited; width as usize * height as usize],
        }
    }

    /// State of `p`; out-of-bounds points read as unvisited.
    #[must_use]
    pub fn get(&self, p: Point) -> CellState {
        self.index(p)
            .map_or(CellState::Unvisited, |i| self.cells[i])
    }

    /// Set the state of an in-bounds point. Out-of-bounds writes are
    /// ignored.
    pub fn set(&mut self, p: Point, state: CellState) {
        if let Some(i) = self.index(p) {
            self.cells[i] = state;
        }
    }

    /// Number of cells in `state`.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Iterate over `(point, state)` for every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Point, CellState)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(i, &state)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let p = Point::new((i % width) as i32, (i / width) as i32);
            (p, state)
        })
    }

    fn index(&self, p: Point) -> Option<usize> {
        let x = u32::try_from(p.x).ok()?;
        let y = u32::try_from(p.y).ok()?;
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Output of one scan: the junction list and the mask that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionScan {
    /// Detected junctions in scan order, one per suppressed neighbourhood.
    pub points: Vec<Point>,
    /// Final state of the suppression mask.
    pub mask: SuppressionMask,
}

/// Find one representative point per junction in `field`.
///
/// Pixels are visited row by row (`y` outer, `x` inner). The first pixel
/// of a cluster in that order becomes its representative; the output is
/// deterministic for a given field and config.
#[must_use]
pub fn find_junction_points(field: &BinaryField, config: &DetectionConfig) -> JunctionScan {
    let sampling = RadialSampling::from_config(config);
    let limit = i32::try_from(config.suppression_limit).unwrap_or(i32::MAX);
    let mut mask = SuppressionMask::new(field.width(), field.height());
    let mut points = Vec::new();

    for y in 0..field.height() {
        for x in 0..field.width() {
            #[allow(clippy::cast_possible_wrap)]
            let p = Point::new(x as i32, y as i32);
            if mask.get(p) != CellState::Unvisited || !field.is_ink(p) {
                continue;
            }
            if !could_be_intersection(p, field, &sampling) {
                continue;
            }

            tracing::trace!(x = p.x, y = p.y, "junction candidate");
            suppress_around(&mut mask, field, p, limit);
            mask.set(p, CellState::Junction);
            points.push(p);
        }
    }

    tracing::debug!(
        junctions = points.len(),
        suppressed = mask.count(CellState::Suppressed),
        "junction scan complete"
    );

    JunctionScan { points, mask }
}

/// Mark the ink inside the square of half-width `limit` around `center`
/// as suppressed. Background cells are left untouched.
fn suppress_around(mask: &mut SuppressionMask, field: &BinaryField, center: Point, limit: i32) {
    let x_max = i32::try_from(field.width()).unwrap_or(i32::MAX) - 1;
    let y_max = i32::try_from(field.height()).unwrap_or(i32::MAX) - 1;
    let x0 = center.x.saturating_sub(limit).max(0);
    let x1 = center.x.saturating_add(limit).min(x_max);
    let y0 = center.y.saturating_sub(limit).max(0);
    let y1 = center.y.saturating_add(limit).min(y_max);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let q = Point::new(x, y);
            if field.is_ink(q) {
                mask.set(q, CellState::Suppressed);
            }
        }
    }
}
