//! Sheet dimensions used by classification and inference.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Tee-to-tee distance on a standard sheet.
pub const TEE_TO_TEE_M: f64 = 34.75;
/// Radius of the 12-foot ring.
pub const HOUSE_RADIUS_M: f64 = 1.829;
/// Maximum stone circumference is 0.914m, so roughly 0.291m across.
pub const STONE_DIAMETER_M: f64 = 0.291;

/// Playing surface geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetGeometry {
    /// Center of the house (the button)
    pub button: Point,
    /// Nominal release point for records that carry none
    pub release_point: Point,
    /// House radius (m)
    pub house_radius_m: f64,
    /// Stone diameter (m)
    pub stone_diameter_m: f64,
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self {
            button: Point::new(0.0, TEE_TO_TEE_M),
            release_point: Point::ORIGIN,
            house_radius_m: HOUSE_RADIUS_M,
            stone_diameter_m: STONE_DIAMETER_M,
        }
    }
}

impl SheetGeometry {
    /// Is `p` inside the house (stone center within the 12-foot)?
    pub fn in_house(&self, p: Point) -> bool {
        p.distance_to(&self.button) <= self.house_radius_m
    }

    /// Distance of `p` from the release point along the release -> button axis.
    pub fn along_axis(&self, release: Point, p: Point) -> f64 {
        p.along_and_lateral(release, self.button).0
    }
}
