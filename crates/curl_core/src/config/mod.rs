//! # Pipeline Configuration
//!
//! Every tuning constant of the accuracy pipeline lives here.
//!
//! ## Usage
//! ```rust
//! use curl_core::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let strict = PipelineConfig::strict();
//! assert!(strict.classifier.contact_displacement_m < config.classifier.contact_displacement_m);
//! ```
//!
//! ## Environment Variables
//!
//! - `CURL_THRESHOLD_PROFILE`: Select preset (strict, lenient, default)

mod aggregation_config;
mod sheet_config;
mod thresholds_config;

pub use aggregation_config::{AccuracyConfig, AggregationConfig};
pub use sheet_config::{SheetGeometry, HOUSE_RADIUS_M, STONE_DIAMETER_M, TEE_TO_TEE_M};
pub use thresholds_config::{ClassifierThresholds, InferenceConfig};

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::ConfigError;

pub const PROFILE_ENV_VAR: &str = "CURL_THRESHOLD_PROFILE";

/// Full pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub sheet: SheetGeometry,
    pub classifier: ClassifierThresholds,
    pub inference: InferenceConfig,
    pub accuracy: AccuracyConfig,
    pub aggregation: AggregationConfig,
}

impl PipelineConfig {
    /// Precise tracking data
    pub fn strict() -> Self {
        let mut cfg = Self::default();
        cfg.classifier = ClassifierThresholds::strict();
        cfg.inference.clutter_stone_count = 2;
        cfg.aggregation.min_sample_count = 5;
        cfg
    }

    /// Hand-charted positions
    pub fn lenient() -> Self {
        let mut cfg = Self::default();
        cfg.classifier = ClassifierThresholds::lenient();
        cfg.inference.clutter_stone_count = 4;
        cfg.inference.guard_standoff_m = 1.5;
        cfg
    }

    /// Preset by name
    pub fn from_profile(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_lowercase().as_str() {
            "" | "default" => Ok(Self::default()),
            "strict" => Ok(Self::strict()),
            "lenient" => Ok(Self::lenient()),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }

    /// Load from `CURL_THRESHOLD_PROFILE` or use default
    pub fn from_env_or_default() -> Self {
        let profile = env::var(PROFILE_ENV_VAR).unwrap_or_default();
        match Self::from_profile(&profile) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("{}; falling back to default profile", err);
                Self::default()
            }
        }
    }

    /// Load a YAML (`.yaml`/`.yml`) or JSON config file.
    ///
    /// Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let cfg: Self = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be a positive finite number, got {}", value),
                })
            }
        }

        positive("classifier.contact_displacement_m", self.classifier.contact_displacement_m)?;
        positive("classifier.roll_angle_deg", self.classifier.roll_angle_deg)?;
        positive("classifier.freeze_tolerance_m", self.classifier.freeze_tolerance_m)?;
        positive("classifier.guard_corridor_m", self.classifier.guard_corridor_m)?;
        positive("sheet.house_radius_m", self.sheet.house_radius_m)?;
        positive("sheet.stone_diameter_m", self.sheet.stone_diameter_m)?;
        positive("accuracy.min_error_magnitude", self.accuracy.min_error_magnitude)?;

        if !self.sheet.button.is_finite() || !self.sheet.release_point.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "sheet",
                reason: "button and release point must be finite".to_string(),
            });
        }
        let still = self.classifier.still_tolerance_m;
        if !(still >= 0.0 && still < self.classifier.contact_displacement_m) {
            return Err(ConfigError::InvalidParameter {
                name: "classifier.still_tolerance_m",
                reason: format!(
                    "must be in [0, contact_displacement_m), got {}",
                    still
                ),
            });
        }
        if self.inference.draw_search_directions == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "inference.draw_search_directions",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// ========== Tests ==========
