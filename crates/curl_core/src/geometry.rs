//! Sheet geometry
//!
//! Point math on the playing surface.
//!
//! ## Coordinate System
//!
//! - Units are meters.
//! - The thrower releases near the origin and stones travel toward +y.
//! - Bearings are compass-style: 0° points along +y (down the sheet) and
//!   angles grow clockwise, so 90° points along +x.
//! - A positive signed angle is a clockwise rotation.

use serde::{Deserialize, Serialize};

/// Position on the sheet in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Decompose `self - origin` along the axis `origin -> toward`.
    ///
    /// Returns `(along, lateral)`. `lateral` is positive on the clockwise
    /// side of the axis. A degenerate axis falls back to +y.
    pub fn along_and_lateral(&self, origin: Point, toward: Point) -> (f64, f64) {
        let (ux, uy) = unit_axis(origin, toward);
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        let along = dx * ux + dy * uy;
        let lateral = dx * uy - dy * ux;
        (along, lateral)
    }
}

/// Euclidean distance.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Direction from `a` to `b` in degrees, `[0, 360)`.
///
/// Returns the sentinel `0.0` when `a == b`.
pub fn bearing(a: Point, b: Point) -> f64 {
    if a == b {
        return 0.0;
    }
    let deg = (b.x - a.x).atan2(b.y - a.y).to_degrees();
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round a tiny negative angle up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `intended` to `actual`, `(-180, 180]`.
pub fn signed_angle_difference(intended: f64, actual: f64) -> f64 {
    let diff = (actual - intended).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Point `dist` meters from `from` in the direction of `to`.
pub fn point_along(from: Point, to: Point, dist: f64) -> Point {
    let (ux, uy) = unit_axis(from, to);
    Point::new(from.x + ux * dist, from.y + uy * dist)
}

fn unit_axis(from: Point, to: Point) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        (0.0, 1.0)
    } else {
        (dx / len, dy / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basic() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-12);
        assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn test_bearing_compass() {
        let o = Point::ORIGIN;
        assert!((bearing(o, Point::new(0.0, 10.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(o, Point::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(o, Point::new(0.0, -10.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(o, Point::new(-10.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_same_point_sentinel() {
        let p = Point::new(1.5, 30.0);
        assert_eq!(bearing(p, p), 0.0);
    }

    #[test]
    fn test_signed_angle_difference_wraps() {
        assert!((signed_angle_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((signed_angle_difference(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert_eq!(signed_angle_difference(0.0, 180.0), 180.0);
        assert_eq!(signed_angle_difference(180.0, 0.0), 180.0);
        assert_eq!(signed_angle_difference(42.0, 42.0), 0.0);
    }

    #[test]
    fn test_along_and_lateral() {
        let origin = Point::ORIGIN;
        let toward = Point::new(0.0, 34.0);
        let (along, lateral) = Point::new(0.5, 35.0).along_and_lateral(origin, toward);
        assert!((along - 35.0).abs() < 1e-9);
        assert!((lateral - 0.5).abs() < 1e-9, "+x is the clockwise side");
    }

    #[test]
    fn test_point_along() {
        let p = point_along(Point::ORIGIN, Point::new(0.0, 34.0), 10.0);
        assert!((p.x).abs() < 1e-12);
        assert!((p.y - 10.0).abs() < 1e-12);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn point_strategy() -> impl Strategy<Value = Point> {
            (-5.0f64..5.0, -2.0f64..45.0).prop_map(|(x, y)| Point::new(x, y))
        }

        proptest! {
            /// Property: distance is symmetric and zero on the diagonal
            #[test]
            fn prop_distance_symmetric(a in point_strategy(), b in point_strategy()) {
                prop_assert_eq!(distance(a, b), distance(b, a));
                prop_assert_eq!(distance(a, a), 0.0);
            }

            /// Property: reversing a bearing rotates it by 180°
            #[test]
            fn prop_bearing_reverse_is_antipodal(a in point_strategy(), b in point_strategy()) {
                prop_assume!(a != b);
                let forward = bearing(a, b);
                let backward = bearing(b, a);
                prop_assert!((0.0..360.0).contains(&forward));
                prop_assert!((0.0..360.0).contains(&backward));
                let diff = (forward - backward).rem_euclid(360.0);
                prop_assert!((diff - 180.0).abs() < 1e-9, "diff = {}", diff);
            }

            /// Property: signed differences stay in (-180, 180]
            #[test]
            fn prop_signed_difference_range(a in 0.0f64..360.0, b in 0.0f64..360.0) {
                let d = signed_angle_difference(a, b);
                prop_assert!(d > -180.0 && d <= 180.0);
            }
        }
    }
}
