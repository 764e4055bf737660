//! Point-to-segment distance and the near-edge test.
//!
//! A junction that lies on an inferred edge without being one of its
//! endpoints is where another stroke crosses that edge.

use crate::types::Point;

/// Euclidean distance from `p` to the closed segment `a`-`b`.
///
/// When `p` projects outside the segment, or the segment is degenerate
/// (`a == b`), the distance to the nearer endpoint is returned;
/// otherwise the perpendicular distance `|cross(b - a, p - a)| / |b - a|`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn distance_point_to_segment(a: Point, b: Point, p: Point) -> f64 {
    if a == b || (p - a).dot(b - a) < 0 || (p - b).dot(a - b) < 0 {
        return p.distance(a).min(p.distance(b));
    }
    (b - a).cross(p - a).unsigned_abs() as f64 / a.distance(b)
}

/// Whether `p` lies strictly within `threshold` of the segment `a`-`b`
/// and is neither of its endpoints.
#[must_use]
pub fn is_near_segment(a: Point, b: Point, p: Point, threshold: f64) -> bool {
    p != a && p != b && distance_point_to_segment(a, b, p) < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn perpendicular_distance_inside_segment() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        assert!((distance_point_to_segment(a, b, Point::new(4, 3)) - 3.0).abs() < EPS);
        assert!((distance_point_to_segment(a, b, Point::new(7, -2)) - 2.0).abs() < EPS);
        assert!(distance_point_to_segment(a, b, Point::new(5, 0)).abs() < EPS);
    }

    #[test]
    fn beyond_endpoints_uses_endpoint_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        // (13, 4) is 5 from b.
        assert!((distance_point_to_segment(a, b, Point::new(13, 4)) - 5.0).abs() < EPS);
        // (-3, -4) is 5 from a.
        assert!((distance_point_to_segment(a, b, Point::new(-3, -4)) - 5.0).abs() < EPS);
    }

    #[test]
    fn degenerate_segment_is_point_distance() {
        let a = Point::new(2, 2);
        assert!((distance_point_to_segment(a, a, Point::new(5, 6)) - 5.0).abs() < EPS);
        assert!(distance_point_to_segment(a, a, a).abs() < EPS);
    }

    #[test]
    fn slanted_segment() {
        // Line y = x; (0, 2) is sqrt(2) away.
        let a = Point::new(0, 0);
        let b = Point::new(4, 4);
        let d = distance_point_to_segment(a, b, Point::new(0, 2));
        assert!((d - 2.0_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn symmetric_under_endpoint_swap() {
        let points = [
            Point::new(0, 0),
            Point::new(10, 3),
            Point::new(-4, 7),
            Point::new(5, 5),
            Point::new(12, -6),
        ];
        for &a in &points {
            for &b in &points {
                for &p in &points {
                    let ab = distance_point_to_segment(a, b, p);
                    let ba = distance_point_to_segment(b, a, p);
                    assert!((ab - ba).abs() < EPS, "a={a:?} b={b:?} p={p:?}");
                }
            }
        }
    }

    #[test]
    fn near_segment_excludes_endpoints() {
        let a = Point::new(0, 0);
        let b = Point::new(40, 0);
        assert!(!is_near_segment(a, b, a, 5.0));
        assert!(!is_near_segment(a, b, b, 5.0));
        assert!(is_near_segment(a, b, Point::new(20, 0), 5.0));
        assert!(is_near_segment(a, b, Point::new(20, 4), 5.0));
    }

    #[test]
    fn near_segment_threshold_is_strict() {
        let a = Point::new(0, 0);
        let b = Point::new(40, 0);
        assert!(!is_near_segment(a, b, Point::new(20, 5), 5.0));
        assert!(!is_near_segment(a, b, Point::new(20, 9), 5.0));
        assert!(is_near_segment(a, b, Point::new(20, 5), 5.5));
    }
}
