//! Connectivity probing between junction points.
//!
//! Two junctions are connected when a path of adjacent ink pixels joins
//! them within a step budget proportional to their straight-line
//! distance: `floor(distance) + depth_slack`. The bound keeps each probe
//! cheap on large images, and it also rejects very circuitous
//! connections. An edge drawn between two junctions is roughly straight,
//! while a path that wanders through other parts of the drawing is not
//! one edge.
//!
//! Each probe owns its visited mask. Nothing farther than the budget
//! (in Chebyshev distance) from the start can be reached, so the mask
//! only spans that window of the field.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::field::BinaryField;
use crate::types::{DetectionConfig, Point};

const OFFSETS_C4: [Point; 4] = [
    Point::new(1, 0),
    Point::new(0, -1),
    Point::new(-1, 0),
    Point::new(0, 1),
];

const OFFSETS_C8: [Point; 8] = [
    Point::new(1, 0),
    Point::new(1, -1),
    Point::new(0, -1),
    Point::new(-1, -1),
    Point::new(-1, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
];

/// Pixel adjacency model used by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours only.
    Four,
    /// All eight neighbours, diagonals included.
    #[default]
    Eight,
}

impl Connectivity {
    /// Neighbour offsets for this adjacency.
    #[must_use]
    pub const fn offsets(self) -> &'static [Point] {
        match self {
            Self::Four => &OFFSETS_C4,
            Self::Eight => &OFFSETS_C8,
        }
    }
}

/// Parameters of a single connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Pixel adjacency.
    pub connectivity: Connectivity,
    /// Steps allowed beyond `floor(distance(a, b))`.
    pub depth_slack: u32,
}

impl ProbeConfig {
    /// Extract the probe parameters from a [`DetectionConfig`].
    #[must_use]
    pub const fn from_config(config: &DetectionConfig) -> Self {
        Self {
            connectivity: config.connectivity,
            depth_slack: config.depth_slack,
        }
    }

    /// Maximum BFS depth for a probe between `a` and `b`.
    #[must_use]
    pub fn depth_budget(&self, a: Point, b: Point) -> u32 {
        let floor_distance = (b - a).length_squared().unsigned_abs().isqrt();
        u32::try_from(floor_distance)
            .unwrap_or(u32::MAX)
            .saturating_add(self.depth_slack)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

/// Whether an ink path links `a` and `b` within the depth budget.
///
/// Both endpoints must be ink. The result is symmetric in `a` and `b`:
/// the budget depends only on their distance and BFS finds the shortest
/// path from either side.
#[must_use]
pub fn are_connected(a: Point, b: Point, field: &BinaryField, probe: &ProbeConfig) -> bool {
    if !field.is_ink(a) || !field.is_ink(b) {
        return false;
    }
    if a == b {
        return true;
    }

    let max_depth = probe.depth_budget(a, b);
    let window = Window::around(a, max_depth, field);
    let mut visited = vec![false; window.len()];
    let mut queue = VecDeque::new();

    if let Some(i) = window.index(a) {
        visited[i] = true;
    }
    queue.push_back((a, 0_u32));

    while let Some((p, depth)) = queue.pop_front() {
        if p == b {
            return true;
        }
        if depth >= max_depth {
            continue;
        }
        for &d in probe.connectivity.offsets() {
            let q = p + d;
            if !field.is_ink(q) {
                continue;
            }
            let Some(i) = window.index(q) else {
                continue;
            };
            if visited[i] {
                continue;
            }
            visited[i] = true;
            queue.push_back((q, depth + 1));
        }
    }

    false
}

/// Square region of the field reachable from a start point within a
/// given number of steps.
struct Window {
    x0: i32,
    y0: i32,
    width: usize,
    height: usize,
}

impl Window {
    fn around(center: Point, radius: u32, field: &BinaryField) -> Self {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let x_max = i32::try_from(field.width()).unwrap_or(i32::MAX) - 1;
        let y_max = i32::try_from(field.height()).unwrap_or(i32::MAX) - 1;
        let x0 = center.x.saturating_sub(radius).max(0);
        let y0 = center.y.saturating_sub(radius).max(0);
        let x1 = center.x.saturating_add(radius).min(x_max);
        let y1 = center.y.saturating_add(radius).min(y_max);
        Self {
            x0,
            y0,
            width: usize::try_from(x1 - x0 + 1).unwrap_or(0),
            height: usize::try_from(y1 - y0 + 1).unwrap_or(0),
        }
    }

    const fn len(&self) -> usize {
        self.width * self.height
    }

    fn index(&self, p: Point) -> Option<usize> {
        let dx = usize::try_from(p.x - self.x0).ok()?;
        let dy = usize::try_from(p.y - self.y0).ok()?;
        (dx < self.width && dy < self.height).then(|| dy * self.width + dx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draw a 1-px axis-aligned segment between two points (inclusive).
    fn line(field: &mut BinaryField, from: Point, to: Point) {
        let (dx, dy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
        let mut p = from;
        field.set(p, true);
        while p != to {
            p = p + Point::new(dx, dy);
            field.set(p, true);
        }
    }

    /// U-shaped detour from (10, 20) to (20, 20) rising `k` rows.
    ///
    /// The shortest 8-connected path cuts each corner diagonally and has
    /// `2k + 8` steps; the 4-connected one has `2k + 10`.
    fn detour(k: i32) -> BinaryField {
        let mut field = BinaryField::new(40, 40);
        line(&mut field, Point::new(10, 20), Point::new(10, 20 - k));
        line(&mut field, Point::new(10, 20 - k), Point::new(20, 20 - k));
        line(&mut field, Point::new(20, 20 - k), Point::new(20, 20));
        field
    }

    #[test]
    fn budget_is_floor_distance_plus_slack() {
        let probe = ProbeConfig {
            connectivity: Connectivity::Eight,
            depth_slack: 5,
        };
        assert_eq!(probe.depth_budget(Point::new(0, 0), Point::new(10, 0)), 15);
        // sqrt(50) = 7.07...
        assert_eq!(probe.depth_budget(Point::new(0, 0), Point::new(5, 5)), 12);
        assert_eq!(probe.depth_budget(Point::new(3, 3), Point::new(3, 3)), 5);
    }

    #[test]
    fn straight_stroke_connects() {
        let mut field = BinaryField::new(50, 10);
        line(&mut field, Point::new(2, 5), Point::new(45, 5));
        let probe = ProbeConfig::default();
        assert!(are_connected(
            Point::new(2, 5),
            Point::new(45, 5),
            &field,
            &probe
        ));
    }

    #[test]
    fn diagonal_stroke_needs_eight_connectivity() {
        let mut field = BinaryField::new(30, 30);
        line(&mut field, Point::new(2, 2), Point::new(25, 25));
        let a = Point::new(2, 2);
        let b = Point::new(25, 25);

        let eight = ProbeConfig {
            connectivity: Connectivity::Eight,
            depth_slack: 5,
        };
        let four = ProbeConfig {
            connectivity: Connectivity::Four,
            depth_slack: 5,
        };
        assert!(are_connected(a, b, &field, &eight));
        assert!(!are_connected(a, b, &field, &four));
    }

    #[test]
    fn gap_disconnects() {
        let mut field = BinaryField::new(50, 10);
        line(&mut field, Point::new(2, 5), Point::new(20, 5));
        line(&mut field, Point::new(23, 5), Point::new(45, 5));
        assert!(!are_connected(
            Point::new(2, 5),
            Point::new(45, 5),
            &field,
            &ProbeConfig::default()
        ));
    }

    #[test]
    fn background_endpoint_is_not_connected() {
        let mut field = BinaryField::new(20, 5);
        line(&mut field, Point::new(0, 2), Point::new(10, 2));
        let probe = ProbeConfig::default();
        assert!(!are_connected(
            Point::new(0, 2),
            Point::new(11, 2),
            &field,
            &probe
        ));
        assert!(!are_connected(
            Point::new(11, 2),
            Point::new(0, 2),
            &field,
            &probe
        ));
    }

    #[test]
    fn point_is_connected_to_itself_only_on_ink() {
        let mut field = BinaryField::new(5, 5);
        field.set(Point::new(2, 2), true);
        let probe = ProbeConfig::default();
        assert!(are_connected(
            Point::new(2, 2),
            Point::new(2, 2),
            &field,
            &probe
        ));
        assert!(!are_connected(
            Point::new(1, 1),
            Point::new(1, 1),
            &field,
            &probe
        ));
    }

    #[test]
    fn detour_respects_budget_eight_connected() {
        let probe = ProbeConfig {
            connectivity: Connectivity::Eight,
            depth_slack: 5,
        };
        let a = Point::new(10, 20);
        let b = Point::new(20, 20);
        for k in 1..=6 {
            let field = detour(k);
            let path_len = 2 * k + 8;
            let expected = path_len <= 15;
            assert_eq!(
                are_connected(a, b, &field, &probe),
                expected,
                "k={k}, path length {path_len}, budget 15"
            );
        }
    }

    #[test]
    fn detour_respects_budget_four_connected() {
        let probe = ProbeConfig {
            connectivity: Connectivity::Four,
            depth_slack: 5,
        };
        let a = Point::new(10, 20);
        let b = Point::new(20, 20);
        for k in 1..=6 {
            let field = detour(k);
            let path_len = 2 * k + 10;
            assert_eq!(
                are_connected(a, b, &field, &probe),
                path_len <= 15,
                "k={k}, path length {path_len}, budget 15"
            );
        }
    }

    #[test]
    fn larger_slack_admits_longer_detour() {
        let field = detour(6);
        let probe = ProbeConfig {
            connectivity: Connectivity::Eight,
            depth_slack: 10,
        };
        // Path length 20, budget 20.
        assert!(are_connected(
            Point::new(10, 20),
            Point::new(20, 20),
            &field,
            &probe
        ));
    }

    #[test]
    fn probing_is_symmetric() {
        let probe = ProbeConfig::default();
        let a = Point::new(10, 20);
        let b = Point::new(20, 20);
        for k in 1..=6 {
            let field = detour(k);
            assert_eq!(
                are_connected(a, b, &field, &probe),
                are_connected(b, a, &field, &probe),
                "k={k}"
            );
        }
    }

    #[test]
    fn probe_near_field_corner_stays_in_bounds() {
        let field = BinaryField::from_fn(6, 6, |_, _| true);
        let probe = ProbeConfig::default();
        assert!(are_connected(
            Point::new(0, 0),
            Point::new(5, 5),
            &field,
            &probe
        ));
    }
}
