//! Target Inference Engine
//!
//! Intent is never observed, so each category has its own rule for the most
//! plausible aim point:
//!
//! | Category | Target | Confidence |
//! |----------|--------|------------|
//! | Draw | best open scoring spot (button first) | High, Low in a cluttered house |
//! | TakeOut | pre-shot position of the removed stone | High |
//! | Guard | on the release-button line, in front of the protected stone | Low |
//! | HitAndRoll | pre-shot position of the struck stone | High |
//! | Freeze | the stone frozen against | High |
//!
//! Ambiguous classifications drop to Low.

use serde::{Deserialize, Serialize};

use super::classifier::{ShotCategory, ShotClassification};
use super::record::{ShotRecord, StoneMovement};
use crate::config::{InferenceConfig, SheetGeometry};
use crate::error::InferenceError;
use crate::geometry::{distance, point_along, Point};

/// Slack for stones that exactly touch a candidate spot.
const OCCUPANCY_EPS_M: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Best guess at the intended aim point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferredTarget {
    pub point: Point,
    pub confidence: Confidence,
    pub category: ShotCategory,
}

/// Infer the intended target for a classified shot.
///
/// # Errors
/// * `UnknownClassification` - called for an Unknown shot (usage error)
/// * `NoTargetStone` / `MissingTargetStone` - the classification names no
///   stone, or one that is absent from the record
pub fn infer_target(
    record: &ShotRecord,
    classification: &ShotClassification,
    config: &InferenceConfig,
    sheet: &SheetGeometry,
) -> Result<InferredTarget, InferenceError> {
    let category = classification.category;
    let (point, confidence) = match category {
        ShotCategory::Unknown => return Err(InferenceError::UnknownClassification),
        ShotCategory::Draw => infer_draw(record, config, sheet)?,
        ShotCategory::TakeOut | ShotCategory::HitAndRoll => {
            let stone = target_stone(record, classification)?;
            let point = stone
                .before
                .ok_or_else(|| InferenceError::MissingTargetStone {
                    stone_id: stone.stone_id.clone(),
                })?;
            (point, Confidence::High)
        }
        ShotCategory::Freeze => {
            let stone = target_stone(record, classification)?;
            let point = stone
                .in_play_position()
                .or(stone.before)
                .ok_or_else(|| InferenceError::MissingTargetStone {
                    stone_id: stone.stone_id.clone(),
                })?;
            (point, Confidence::High)
        }
        ShotCategory::Guard => (infer_guard(record, classification, config, sheet), Confidence::Low),
    };

    let confidence = if classification.ambiguous {
        Confidence::Low
    } else {
        confidence
    };

    Ok(InferredTarget {
        point,
        confidence,
        category,
    })
}

fn target_stone<'a>(
    record: &'a ShotRecord,
    classification: &ShotClassification,
) -> Result<&'a StoneMovement, InferenceError> {
    let id = classification
        .target_stone
        .as_deref()
        .ok_or(InferenceError::NoTargetStone(classification.category.as_str()))?;
    record
        .stone(id)
        .ok_or_else(|| InferenceError::MissingTargetStone {
            stone_id: id.to_string(),
        })
}

/// Button if open, otherwise the closest open spot on rings around it.
fn infer_draw(
    record: &ShotRecord,
    config: &InferenceConfig,
    sheet: &SheetGeometry,
) -> Result<(Point, Confidence), InferenceError> {
    let thrown_final = record.thrown_stone()?.in_play_position();
    let occupied: Vec<Point> = record.existing_stones().filter_map(|s| s.before).collect();

    let in_house = occupied.iter().filter(|p| sheet.in_house(**p)).count();
    let confidence = if in_house >= config.clutter_stone_count {
        Confidence::Low
    } else {
        Confidence::High
    };

    let is_open = |spot: Point| {
        occupied
            .iter()
            .all(|p| distance(*p, spot) >= sheet.stone_diameter_m - OCCUPANCY_EPS_M)
    };

    if is_open(sheet.button) {
        return Ok((sheet.button, confidence));
    }

    let directions = config.draw_search_directions.max(1);
    for ring in 1..=config.draw_search_rings {
        let radius = ring as f64 * sheet.stone_diameter_m;
        if radius > sheet.house_radius_m {
            break;
        }
        let best = (0..directions)
            .map(|j| {
                let theta = (j as f64 * 360.0 / directions as f64).to_radians();
                Point::new(
                    sheet.button.x + radius * theta.sin(),
                    sheet.button.y + radius * theta.cos(),
                )
            })
            .filter(|spot| is_open(*spot))
            .min_by(|a, b| {
                let da = thrown_final.map_or(0.0, |f| distance(*a, f));
                let db = thrown_final.map_or(0.0, |f| distance(*b, f));
                da.total_cmp(&db)
            });
        if let Some(spot) = best {
            return Ok((spot, confidence));
        }
    }

    // House fully packed: the button is still the best-value aim
    Ok((sheet.button, Confidence::Low))
}

/// Point on the release-button line, `guard_standoff_m` short of the
/// protected stone (or of the front of the house when none is named).
fn infer_guard(
    record: &ShotRecord,
    classification: &ShotClassification,
    config: &InferenceConfig,
    sheet: &SheetGeometry,
) -> Point {
    let release = record.release.unwrap_or(sheet.release_point);
    let protected_along = classification
        .target_stone
        .as_deref()
        .and_then(|id| record.stone(id))
        .and_then(|s| s.in_play_position().or(s.before))
        .map(|p| sheet.along_axis(release, p))
        .unwrap_or_else(|| sheet.along_axis(release, sheet.button) - sheet.house_radius_m);

    let along = (protected_along - config.guard_standoff_m).max(0.0);
    point_along(release, sheet.button, along)
}
