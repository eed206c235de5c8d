//! Error banding
//!
//! Coarse labels for a single shot's miss, used for pattern tables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBand {
    OnTarget,
    Close,
    Moderate,
    Large,
}

impl DistanceBand {
    pub const ALL: [DistanceBand; 4] = [
        DistanceBand::OnTarget,
        DistanceBand::Close,
        DistanceBand::Moderate,
        DistanceBand::Large,
    ];

    /// Band for an absolute distance error (m).
    pub fn from_error(abs_error_m: f64, bounds: &[f64; 3]) -> Self {
        match abs_error_m {
            e if e <= bounds[0] => DistanceBand::OnTarget,
            e if e <= bounds[1] => DistanceBand::Close,
            e if e <= bounds[2] => DistanceBand::Moderate,
            _ => DistanceBand::Large,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionBand {
    OnLine,
    Slight,
    Moderate,
    Large,
}

impl DirectionBand {
    pub const ALL: [DirectionBand; 4] = [
        DirectionBand::OnLine,
        DirectionBand::Slight,
        DirectionBand::Moderate,
        DirectionBand::Large,
    ];

    /// Band for an absolute direction error (deg).
    pub fn from_error(abs_error_deg: f64, bounds: &[f64; 3]) -> Self {
        match abs_error_deg {
            e if e <= bounds[0] => DirectionBand::OnLine,
            e if e <= bounds[1] => DirectionBand::Slight,
            e if e <= bounds[2] => DirectionBand::Moderate,
            _ => DirectionBand::Large,
        }
    }
}

/// Overall size of a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMagnitude {
    Minor,
    Moderate,
    Major,
}

impl ErrorMagnitude {
    pub const ALL: [ErrorMagnitude; 3] = [
        ErrorMagnitude::Minor,
        ErrorMagnitude::Moderate,
        ErrorMagnitude::Major,
    ];

    pub fn from_bands(distance: DistanceBand, direction: DirectionBand) -> Self {
        use DirectionBand as Dir;
        use DistanceBand as Dist;
        match (distance, direction) {
            (Dist::OnTarget, Dir::OnLine | Dir::Slight) => ErrorMagnitude::Minor,
            (Dist::OnTarget | Dist::Close, Dir::OnLine | Dir::Slight | Dir::Moderate) => {
                ErrorMagnitude::Moderate
            }
            _ => ErrorMagnitude::Major,
        }
    }
}
