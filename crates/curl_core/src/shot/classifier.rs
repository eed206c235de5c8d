//! Shot Type Classifier
//!
//! Labels a shot's tactical category from stone-movement evidence.
//!
//! Rules run in a fixed priority order and the first match wins:
//!
//! 1. TakeOut    - an existing stone was struck and removed
//! 2. HitAndRoll - an existing stone was struck, the thrown stone stayed in
//!                 play and deflected past the roll threshold
//! 3. Freeze     - no contact, thrown stone came to rest against a stone that
//!                 did not move
//! 4. Guard      - no contact, thrown stone rests short, in front of stones
//!                 that lie closer to the button
//! 5. Draw       - no contact, thrown stone in play
//!
//! Anything else is Unknown.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::record::{ShotRecord, StoneMovement};
use crate::config::{ClassifierThresholds, SheetGeometry};
use crate::error::RecordError;
use crate::geometry::{bearing, distance, point_along, signed_angle_difference, Point};

/// Tactical shot category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotCategory {
    Draw,
    TakeOut,
    Guard,
    HitAndRoll,
    Freeze,
    Unknown,
}

impl ShotCategory {
    /// All categories
    pub const ALL: [ShotCategory; 6] = [
        ShotCategory::Draw,
        ShotCategory::TakeOut,
        ShotCategory::Guard,
        ShotCategory::HitAndRoll,
        ShotCategory::Freeze,
        ShotCategory::Unknown,
    ];

    /// Categories that yield an accuracy metric
    pub const MEASURABLE: [ShotCategory; 5] = [
        ShotCategory::Draw,
        ShotCategory::TakeOut,
        ShotCategory::Guard,
        ShotCategory::HitAndRoll,
        ShotCategory::Freeze,
    ];

    /// Does this category involve striking another stone?
    pub fn is_contact(&self) -> bool {
        matches!(self, ShotCategory::TakeOut | ShotCategory::HitAndRoll)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotCategory::Draw => "draw",
            ShotCategory::TakeOut => "take_out",
            ShotCategory::Guard => "guard",
            ShotCategory::HitAndRoll => "hit_and_roll",
            ShotCategory::Freeze => "freeze",
            ShotCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ShotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result with the evidence behind it
#[derive(Debug, Clone, PartialEq)]
pub struct ShotClassification {
    pub category: ShotCategory,
    /// Stone struck (TakeOut, HitAndRoll), frozen to (Freeze) or
    /// protected (Guard)
    pub target_stone: Option<String>,
    /// Existing stones displaced past the contact threshold
    pub contact_count: usize,
    /// More than one candidate fit the winning rule
    pub ambiguous: bool,
    /// Thrown-stone deflection after contact (deg)
    pub roll_angle_deg: Option<f64>,
    /// Set when the record broke the thrown-stone invariant
    pub malformed: Option<RecordError>,
}

impl ShotClassification {
    fn new(category: ShotCategory, contact_count: usize) -> Self {
        Self {
            category,
            target_stone: None,
            contact_count,
            ambiguous: false,
            roll_angle_deg: None,
            malformed: None,
        }
    }

    fn unknown(contact_count: usize) -> Self {
        Self::new(ShotCategory::Unknown, contact_count)
    }

    fn malformed(err: RecordError) -> Self {
        Self {
            malformed: Some(err),
            ..Self::unknown(0)
        }
    }

    fn with_target(mut self, stone: &StoneMovement) -> Self {
        self.target_stone = Some(stone.stone_id.clone());
        self
    }

    fn ambiguous_if(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.category == ShotCategory::Unknown
    }
}

/// Classify a shot
///
/// # Arguments
/// * `record` - Observed shot
/// * `thresholds` - Classification thresholds
/// * `sheet` - Sheet geometry (button, release fallback, stone size)
///
/// # Returns
/// Category plus evidence. Never fails; unresolvable evidence is Unknown.
pub fn classify(
    record: &ShotRecord,
    thresholds: &ClassifierThresholds,
    sheet: &SheetGeometry,
) -> ShotClassification {
    let thrown = match record.thrown_stone() {
        Ok(stone) => stone,
        Err(err) => return ShotClassification::malformed(err),
    };
    let release = record.release.unwrap_or(sheet.release_point);

    // Struck stones in travel order: the stone nearest the release is hit first
    let mut contacts: Vec<(&StoneMovement, f64)> = record
        .existing_stones()
        .filter(|s| s.displacement() > thresholds.contact_displacement_m)
        .filter_map(|s| s.before.map(|before| (s, distance(release, before))))
        .collect();
    contacts.sort_by(travel_order);
    let contact_count = contacts.len();

    // 1. TakeOut
    let removed: Vec<&(&StoneMovement, f64)> =
        contacts.iter().filter(|(s, _)| s.is_removed()).collect();
    if let Some(&&(target, travel)) = removed.first() {
        let tied = removed
            .get(1)
            .is_some_and(|&&(_, next_travel)| next_travel - travel < thresholds.ambiguity_tolerance_m);
        return ShotClassification::new(ShotCategory::TakeOut, contact_count)
            .with_target(target)
            .ambiguous_if(tied);
    }

    let Some(final_pos) = thrown.in_play_position() else {
        // Thrown stone went out without removing anything
        return ShotClassification::unknown(contact_count);
    };

    // 2. HitAndRoll
    if let Some(&(struck, travel)) = contacts.first() {
        if let Some(&(_, next_travel)) = contacts.get(1) {
            if next_travel - travel < thresholds.ambiguity_tolerance_m {
                return ShotClassification::unknown(contact_count);
            }
        }
        let Some(struck_pos) = struck.before else {
            return ShotClassification::unknown(contact_count);
        };
        let roll = roll_angle(release, struck_pos, final_pos, sheet.stone_diameter_m);
        if roll > thresholds.roll_angle_deg {
            let mut result =
                ShotClassification::new(ShotCategory::HitAndRoll, contact_count).with_target(struck);
            result.roll_angle_deg = Some(roll);
            return result;
        }
        // Hit-and-stick or a tap: contact without a resolvable intent
        let mut result = ShotClassification::unknown(contact_count);
        result.roll_angle_deg = Some(roll);
        return result;
    }

    // 3. Freeze
    let mut frozen_to: Vec<(&StoneMovement, f64)> = record
        .existing_stones()
        .filter(|s| s.displacement() <= thresholds.still_tolerance_m)
        .filter_map(|s| s.in_play_position().map(|p| (s, distance(final_pos, p))))
        .filter(|&(_, gap)| gap < thresholds.freeze_tolerance_m)
        .collect();
    frozen_to.sort_by(travel_order);
    if let Some(&(stone, _)) = frozen_to.first() {
        return ShotClassification::new(ShotCategory::Freeze, 0)
            .with_target(stone)
            .ambiguous_if(frozen_to.len() > 1);
    }

    // 4. Guard
    let protected = protected_stones(record, release, final_pos, thresholds, sheet);
    if protected.len() >= thresholds.guard_min_cluster.max(1) {
        return ShotClassification::new(ShotCategory::Guard, 0).with_target(protected[0]);
    }

    // 5. Draw
    ShotClassification::new(ShotCategory::Draw, 0)
}

/// Stones a thrown stone resting at `final_pos` would shield, nearest first.
///
/// A protected stone lies closer to the button and further along the throw
/// axis than the thrown stone, inside the guard corridor. Nothing is
/// protected when the thrown stone rests beyond the button.
pub fn protected_stones<'a>(
    record: &'a ShotRecord,
    release: Point,
    final_pos: Point,
    thresholds: &ClassifierThresholds,
    sheet: &SheetGeometry,
) -> Vec<&'a StoneMovement> {
    let (final_along, final_lateral) = final_pos.along_and_lateral(release, sheet.button);
    let button_along = sheet.along_axis(release, sheet.button);
    if final_along >= button_along {
        return Vec::new();
    }
    let final_to_button = distance(final_pos, sheet.button);

    let mut protected: Vec<(&StoneMovement, f64)> = record
        .existing_stones()
        .filter_map(|s| s.in_play_position().map(|p| (s, p)))
        .filter(|&(_, p)| {
            let (along, lateral) = p.along_and_lateral(release, sheet.button);
            distance(p, sheet.button) < final_to_button
                && along > final_along
                && (lateral - final_lateral).abs() <= thresholds.guard_corridor_m
        })
        .map(|(s, p)| (s, distance(final_pos, p)))
        .collect();
    protected.sort_by(travel_order);
    protected.into_iter().map(|(s, _)| s).collect()
}

/// Deflection of the thrown stone after contact (deg, unsigned).
///
/// The incoming line ends where the thrown stone touches the struck stone,
/// one stone diameter short of its center. A thrown stone that stops within
/// a stone diameter of that point did not roll.
fn roll_angle(release: Point, struck: Point, final_pos: Point, stone_diameter: f64) -> f64 {
    let approach = distance(release, struck);
    let contact_point = point_along(release, struck, (approach - stone_diameter).max(0.0));
    if distance(contact_point, final_pos) <= stone_diameter {
        return 0.0;
    }
    let incoming = bearing(release, contact_point);
    let outgoing = bearing(contact_point, final_pos);
    signed_angle_difference(incoming, outgoing).abs()
}

fn travel_order(a: &(&StoneMovement, f64), b: &(&StoneMovement, f64)) -> Ordering {
    a.1.total_cmp(&b.1)
        .then_with(|| a.0.stone_id.cmp(&b.0.stone_id))
}
