//! Classification and inference thresholds
//!
//! The geometric thresholds were tuned on a small observation sample at
//! standard sheet scale. They are configuration so other surfaces can
//! recalibrate them.
//!
//! | Threshold | Default | Used by |
//! |-----------|---------|---------|
//! | `contact_displacement_m` | 0.5 | TakeOut / HitAndRoll contact test |
//! | `roll_angle_deg` | 15.0 | HitAndRoll roll test |
//! | `freeze_tolerance_m` | 0.3 | Freeze proximity (center to center) |
//! | `still_tolerance_m` | 0.05 | Freeze: frozen-to stone must not move |
//! | `guard_corridor_m` | 1.0 | Guard protected-stone corridor |
//! | `clutter_stone_count` | 3 | Draw confidence |

use serde::{Deserialize, Serialize};

/// Classifier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// A non-thrown stone moving further than this was struck (m)
    pub contact_displacement_m: f64,
    /// Minimum deflection of the thrown stone after contact for a roll (deg)
    pub roll_angle_deg: f64,
    /// Center-to-center distance counted as frozen (m)
    pub freeze_tolerance_m: f64,
    /// A frozen-to stone may move at most this far (m)
    pub still_tolerance_m: f64,
    /// Half-width of the lane behind a guard that counts as protected (m)
    pub guard_corridor_m: f64,
    /// Protected stones needed before a short stone is a guard
    pub guard_min_cluster: usize,
    /// Two contact candidates closer than this in travel order are ambiguous (m)
    pub ambiguity_tolerance_m: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            contact_displacement_m: 0.5,
            roll_angle_deg: 15.0,
            freeze_tolerance_m: 0.3,
            still_tolerance_m: 0.05,
            guard_corridor_m: 1.0,
            guard_min_cluster: 1,
            ambiguity_tolerance_m: 0.05,
        }
    }
}

impl ClassifierThresholds {
    /// Tighter contact and freeze tests for precise tracking data
    pub fn strict() -> Self {
        Self {
            contact_displacement_m: 0.3,
            roll_angle_deg: 10.0,
            freeze_tolerance_m: 0.295,
            still_tolerance_m: 0.03,
            guard_corridor_m: 0.75,
            ..Self::default()
        }
    }

    /// Looser tests for noisy, hand-charted positions
    pub fn lenient() -> Self {
        Self {
            contact_displacement_m: 0.75,
            roll_angle_deg: 20.0,
            freeze_tolerance_m: 0.45,
            still_tolerance_m: 0.10,
            guard_corridor_m: 1.5,
            ambiguity_tolerance_m: 0.10,
            ..Self::default()
        }
    }
}

/// Target inference parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Pre-shot stones in the house at which a draw target becomes ambiguous
    pub clutter_stone_count: usize,
    /// Distance a guard is aimed in front of the stone it protects (m)
    pub guard_standoff_m: f64,
    /// Rings searched around the button for an open draw spot
    pub draw_search_rings: usize,
    /// Directions tried per ring
    pub draw_search_directions: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            clutter_stone_count: 3,
            guard_standoff_m: 1.0,
            draw_search_rings: 6,
            draw_search_directions: 8,
        }
    }
}
