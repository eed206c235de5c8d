//! Error pattern distribution
//!
//! Share of shots per (distance band, direction band) pair and per overall
//! error magnitude.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::accuracy::{AccuracyMetric, DirectionBand, DistanceBand, ErrorMagnitude};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCell {
    pub distance_band: DistanceBand,
    pub direction_band: DirectionBand,
    pub count: usize,
    /// 0.0..=100.0
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeShare {
    pub magnitude: ErrorMagnitude,
    pub count: usize,
    pub percentage: f64,
    pub mean_abs_distance_error: f64,
    pub mean_abs_direction_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorPatternDistribution {
    pub total: usize,
    /// Most common pattern first
    pub cells: Vec<PatternCell>,
    /// Minor, moderate, major; empty magnitudes omitted
    pub magnitudes: Vec<MagnitudeShare>,
}

impl ErrorPatternDistribution {
    pub fn from_metrics(metrics: &[AccuracyMetric]) -> Self {
        let total = metrics.len();
        if total == 0 {
            return Self::default();
        }

        let mut pairs: BTreeMap<(DistanceBand, DirectionBand), usize> = BTreeMap::new();
        let mut by_magnitude: BTreeMap<ErrorMagnitude, Vec<&AccuracyMetric>> = BTreeMap::new();
        for m in metrics {
            *pairs.entry((m.distance_band, m.direction_band)).or_insert(0) += 1;
            by_magnitude.entry(m.magnitude).or_default().push(m);
        }

        let mut cells: Vec<PatternCell> = pairs
            .into_iter()
            .map(|((distance_band, direction_band), count)| PatternCell {
                distance_band,
                direction_band,
                count,
                percentage: percentage(count, total),
            })
            .collect();
        // Stable sort keeps band order for equal counts
        cells.sort_by(|a, b| b.count.cmp(&a.count));

        let magnitudes = by_magnitude
            .into_iter()
            .map(|(magnitude, members)| MagnitudeShare {
                magnitude,
                count: members.len(),
                percentage: percentage(members.len(), total),
                mean_abs_distance_error: sorted_mean_abs(members.iter().map(|m| m.distance_error)),
                mean_abs_direction_error: sorted_mean_abs(
                    members.iter().map(|m| m.direction_error),
                ),
            })
            .collect();

        Self {
            total,
            cells,
            magnitudes,
        }
    }

    pub fn most_common(&self) -> Option<&PatternCell> {
        self.cells.first()
    }

    pub fn share_of(&self, magnitude: ErrorMagnitude) -> f64 {
        self.magnitudes
            .iter()
            .find(|s| s.magnitude == magnitude)
            .map_or(0.0, |s| s.percentage)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 * 100.0 / total as f64
}

fn sorted_mean_abs(values: impl Iterator<Item = f64>) -> f64 {
    let mut abs: Vec<f64> = values.map(f64::abs).collect();
    if abs.is_empty() {
        return 0.0;
    }
    abs.sort_by(f64::total_cmp);
    abs.iter().sum::<f64>() / abs.len() as f64
}
