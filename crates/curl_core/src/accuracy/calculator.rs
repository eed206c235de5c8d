//! Accuracy Calculator
//!
//! Compares where the thrown stone stopped with the inferred target.
//!
//! Sign conventions:
//! - `distance_error` is the full miss distance, positive when the stone
//!   finished beyond the target along the release -> target axis and
//!   negative when short. A pure sideways miss counts as positive.
//! - `direction_error` is the signed rotation from the intended line to the
//!   achieved line as seen from the release point; positive = clockwise.

use serde::{Deserialize, Serialize};

use super::bands::{DirectionBand, DistanceBand, ErrorMagnitude};
use crate::config::AccuracyConfig;
use crate::error::{AccuracyError, GeometryPart};
use crate::geometry::{bearing, distance, signed_angle_difference, Point};
use crate::shot::{Confidence, GameContext, InferredTarget, ShotCategory, ShotRecord};

/// Per-shot accuracy measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetric {
    pub shot_id: u64,
    pub player_id: String,
    pub category: ShotCategory,
    pub context: GameContext,
    /// Signed miss distance (m), positive = long
    pub distance_error: f64,
    /// Signed line error (deg), positive = clockwise
    pub direction_error: f64,
    /// Miss component along the throw axis (m)
    pub along_error: f64,
    /// Miss component across the throw axis (m), positive = clockwise side
    pub lateral_error: f64,
    pub target: Point,
    pub final_position: Point,
    pub target_confidence: Confidence,
    pub distance_band: DistanceBand,
    pub direction_band: DirectionBand,
    pub magnitude: ErrorMagnitude,
}

/// Measure one shot against its inferred target.
///
/// # Errors
/// `MissingGeometry` when the release point, the thrown stone, or its
/// final position is unavailable. The caller drops the record.
pub fn compute_accuracy(
    record: &ShotRecord,
    target: &InferredTarget,
    config: &AccuracyConfig,
) -> Result<AccuracyMetric, AccuracyError> {
    let release = record
        .release
        .ok_or(AccuracyError::MissingGeometry(GeometryPart::ReleasePosition))?;
    let thrown = record
        .thrown_stone()
        .map_err(|_| AccuracyError::MissingGeometry(GeometryPart::ThrownStone))?;
    // A stone charted past the back line still has a usable rest position
    let final_pos = thrown
        .after
        .ok_or(AccuracyError::MissingGeometry(GeometryPart::FinalPosition))?;

    let miss = distance(final_pos, target.point);
    let (along_error, lateral_error) = offset_components(release, target.point, final_pos);
    let distance_error = if along_error < 0.0 { -miss } else { miss };

    let direction_error =
        signed_angle_difference(bearing(release, target.point), bearing(release, final_pos));

    let distance_band = DistanceBand::from_error(miss, &config.distance_bands_m);
    let direction_band = DirectionBand::from_error(direction_error.abs(), &config.direction_bands_deg);

    Ok(AccuracyMetric {
        shot_id: record.shot_id,
        player_id: record.player_id.clone(),
        category: target.category,
        context: record.context.clone(),
        distance_error,
        direction_error,
        along_error,
        lateral_error,
        target: target.point,
        final_position: final_pos,
        target_confidence: target.confidence,
        distance_band,
        direction_band,
        magnitude: ErrorMagnitude::from_bands(distance_band, direction_band),
    })
}

/// `final - target` split along / across the release -> target axis.
fn offset_components(release: Point, target: Point, final_pos: Point) -> (f64, f64) {
    let (final_along, final_lateral) = final_pos.along_and_lateral(release, target);
    let (target_along, target_lateral) = target.along_and_lateral(release, target);
    (final_along - target_along, final_lateral - target_lateral)
}

/// Keep a divisor away from zero without flipping its sign.
pub fn floor_magnitude(value: f64, floor: f64) -> f64 {
    if value.abs() >= floor {
        value
    } else if value < 0.0 {
        -floor
    } else {
        floor
    }
}
