//! # Accuracy Pipeline
//!
//! Batch driver: classify -> infer target -> measure for every record, then
//! aggregate and export once all records are done.
//!
//! ```rust
//! use curl_core::config::PipelineConfig;
//! use curl_core::geometry::Point;
//! use curl_core::pipeline::AccuracyPipeline;
//! use curl_core::shot::{ShotRecord, StoneMovement};
//!
//! let record = ShotRecord::new(1, "p1")
//!     .with_release(Point::ORIGIN)
//!     .with_stone(StoneMovement::thrown("y1", Point::new(0.14, 34.75)));
//!
//! let report = AccuracyPipeline::new(PipelineConfig::default()).run(&[record]);
//! assert_eq!(report.metrics.len(), 1);
//! assert!(report.parameters.get("draw", "distance_mean").is_some());
//! ```

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::accuracy::{compute_accuracy, AccuracyMetric};
use crate::calibration::{
    aggregate, export, AggregateStatistic, ErrorPatternDistribution, GroupBy, ParameterTable,
};
use crate::config::PipelineConfig;
use crate::error::{AccuracyError, GeometryPart, InferenceError, RecordError};
use crate::shot::{classify, infer_target, ShotCategory, ShotClassification, ShotRecord};

/// Why a record produced no metric
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    Malformed(RecordError),
    Unknown,
    Inference(InferenceError),
    MissingGeometry(GeometryPart),
}

impl From<AccuracyError> for ExclusionReason {
    fn from(err: AccuracyError) -> Self {
        match err {
            AccuracyError::MissingGeometry(part) => ExclusionReason::MissingGeometry(part),
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExclusionReason::Malformed(e) => write!(f, "{}", e),
            ExclusionReason::Unknown => write!(f, "unclassifiable shot"),
            ExclusionReason::Inference(e) => write!(f, "{}", e),
            ExclusionReason::MissingGeometry(part) => write!(f, "missing {}", part),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Measured(AccuracyMetric),
    Excluded(ExclusionReason),
}

/// Per-record result of the first three stages
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedShot {
    pub shot_id: u64,
    pub classification: ShotClassification,
    pub outcome: RecordOutcome,
}

impl ProcessedShot {
    pub fn metric(&self) -> Option<&AccuracyMetric> {
        match &self.outcome {
            RecordOutcome::Measured(m) => Some(m),
            RecordOutcome::Excluded(_) => None,
        }
    }
}

/// Count of dropped records by cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExclusionSummary {
    pub malformed: usize,
    pub unknown: usize,
    pub inference_error: usize,
    pub missing_geometry: usize,
}

impl ExclusionSummary {
    fn record(&mut self, reason: &ExclusionReason) {
        match reason {
            ExclusionReason::Malformed(_) => self.malformed += 1,
            ExclusionReason::Unknown => self.unknown += 1,
            ExclusionReason::Inference(_) => self.inference_error += 1,
            ExclusionReason::MissingGeometry(_) => self.missing_geometry += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.malformed + self.unknown + self.inference_error + self.missing_geometry
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub record_count: usize,
    /// Category -> records classified into it (Unknown included)
    pub classification_counts: BTreeMap<ShotCategory, usize>,
    pub exclusions: ExclusionSummary,
    /// Input order
    pub metrics: Vec<AccuracyMetric>,
    pub category_stats: Vec<AggregateStatistic>,
    pub player_stats: Vec<AggregateStatistic>,
    pub patterns: ErrorPatternDistribution,
    pub parameters: ParameterTable,
}

impl PipelineReport {
    pub fn measured_count(&self) -> usize {
        self.metrics.len()
    }

    /// Measurable categories with no measured shot in this batch
    pub fn unmeasured_categories(&self) -> Vec<ShotCategory> {
        ShotCategory::MEASURABLE
            .into_iter()
            .filter(|c| !self.category_stats.iter().any(|s| s.key.category == *c))
            .collect()
    }
}

pub struct AccuracyPipeline {
    config: PipelineConfig,
}

impl AccuracyPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classify, infer and measure a single record.
    pub fn process_record(&self, record: &ShotRecord) -> ProcessedShot {
        let cfg = &self.config;
        let classification = classify(record, &cfg.classifier, &cfg.sheet);
        let outcome = match self.measure(record, &classification) {
            Ok(metric) => RecordOutcome::Measured(metric),
            Err(reason) => RecordOutcome::Excluded(reason),
        };
        ProcessedShot {
            shot_id: record.shot_id,
            classification,
            outcome,
        }
    }

    fn measure(
        &self,
        record: &ShotRecord,
        classification: &ShotClassification,
    ) -> Result<AccuracyMetric, ExclusionReason> {
        if let Some(err) = &classification.malformed {
            return Err(ExclusionReason::Malformed(err.clone()));
        }
        if classification.is_unknown() {
            return Err(ExclusionReason::Unknown);
        }
        let cfg = &self.config;
        let target = infer_target(record, classification, &cfg.inference, &cfg.sheet)
            .map_err(ExclusionReason::Inference)?;
        Ok(compute_accuracy(record, &target, &cfg.accuracy)?)
    }

    /// Per-record stages for the whole batch, input order preserved.
    pub fn process_batch(&self, records: &[ShotRecord]) -> Vec<ProcessedShot> {
        if records.len() > self.config.aggregation.parallel_threshold {
            records.par_iter().map(|r| self.process_record(r)).collect()
        } else {
            records.iter().map(|r| self.process_record(r)).collect()
        }
    }

    /// Run the full pipeline. Records that cannot be measured are counted
    /// and skipped; the batch itself never fails.
    pub fn run(&self, records: &[ShotRecord]) -> PipelineReport {
        info!("Running accuracy pipeline over {} records", records.len());

        let processed = self.process_batch(records);

        let mut classification_counts = BTreeMap::new();
        let mut exclusions = ExclusionSummary::default();
        let mut metrics = Vec::with_capacity(processed.len());
        for shot in processed {
            *classification_counts
                .entry(shot.classification.category)
                .or_insert(0) += 1;
            match shot.outcome {
                RecordOutcome::Measured(metric) => metrics.push(metric),
                RecordOutcome::Excluded(reason) => {
                    match &reason {
                        ExclusionReason::Malformed(_) => {
                            warn!("Shot {} excluded: {}", shot.shot_id, reason)
                        }
                        _ => debug!("Shot {} excluded: {}", shot.shot_id, reason),
                    }
                    exclusions.record(&reason);
                }
            }
        }

        let category_stats = aggregate(&metrics, GroupBy::Category, &self.config);
        let player_stats = aggregate(&metrics, GroupBy::CategoryAndPlayer, &self.config);
        for stat in category_stats.iter().filter(|s| s.low_confidence) {
            debug!(
                "Category {} has only {} samples",
                stat.key.category, stat.sample_count
            );
        }

        let patterns = ErrorPatternDistribution::from_metrics(&metrics);
        let mut table_source = category_stats.clone();
        table_source.extend(player_stats.iter().cloned());
        let parameters = export(&table_source);

        for category in ShotCategory::MEASURABLE {
            if !category_stats.iter().any(|s| s.key.category == category) {
                debug!("No measured {} shots", category);
            }
        }

        info!(
            "Measured {} of {} records ({} excluded, {} categories)",
            metrics.len(),
            records.len(),
            exclusions.total(),
            category_stats.len()
        );

        PipelineReport {
            record_count: records.len(),
            classification_counts,
            exclusions,
            metrics,
            category_stats,
            player_stats,
            patterns,
            parameters,
        }
    }
}

impl Default for AccuracyPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests;
