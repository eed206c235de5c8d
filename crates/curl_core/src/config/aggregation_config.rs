//! Accuracy banding and aggregation settings

use serde::{Deserialize, Serialize};

/// Accuracy calculator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyConfig {
    /// Floor applied to divisors built from error magnitudes
    pub min_error_magnitude: f64,
    /// Upper bounds (m) for on_target / close / moderate; beyond is large
    pub distance_bands_m: [f64; 3],
    /// Upper bounds (deg) for on_line / slight / moderate; beyond is large
    pub direction_bands_deg: [f64; 3],
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        Self {
            min_error_magnitude: 0.01,
            distance_bands_m: [0.20, 0.50, 1.00],
            direction_bands_deg: [3.0, 8.0, 15.0],
        }
    }
}

/// Statistical aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Groups below this many samples are flagged low-confidence
    pub min_sample_count: usize,
    /// House complexity at or above this is tagged `complex_house`
    pub complex_house_threshold: f64,
    /// Batches larger than this are processed on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_sample_count: 3,
            complex_house_threshold: 0.5,
            parallel_threshold: 64,
        }
    }
}
