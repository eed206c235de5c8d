//! Statistical Aggregator
//!
//! Turns per-shot accuracy metrics into distribution parameters per shot
//! category (optionally per player), with situational modifiers on top.
//!
//! Every run recomputes from scratch. Values are sorted before summing so the
//! result does not depend on input order, down to the last bit.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::accuracy::{floor_magnitude, AccuracyMetric};
use crate::config::PipelineConfig;
use crate::shot::{ContextTag, ShotCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Category,
    CategoryAndPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub category: ShotCategory,
    pub player_id: Option<String>,
}

impl GroupKey {
    fn for_metric(metric: &AccuracyMetric, group_by: GroupBy) -> Self {
        Self {
            category: metric.category,
            player_id: match group_by {
                GroupBy::Category => None,
                GroupBy::CategoryAndPlayer => Some(metric.player_id.clone()),
            },
        }
    }
}

/// Distribution of one error dimension within a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorSummary {
    /// Arithmetic mean of the signed error
    pub mean: f64,
    /// Sample standard deviation (n - 1), 0 for a single sample
    pub std: f64,
    /// Systematic tendency: the mean signed error
    pub bias: f64,
    /// Mean error magnitude
    pub mean_abs: f64,
    /// `std / mean_abs`, with the divisor floored
    pub cv: f64,
}

impl ErrorSummary {
    fn from_values(values: &[f64], floor: f64) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut signed = values.to_vec();
        signed.sort_by(f64::total_cmp);
        let mut magnitudes: Vec<f64> = values.iter().map(|v| v.abs()).collect();
        magnitudes.sort_by(f64::total_cmp);

        let n = signed.len() as f64;
        let mean = signed.iter().sum::<f64>() / n;
        let std = if signed.len() < 2 {
            0.0
        } else {
            let ss: f64 = signed.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        };
        let mean_abs = magnitudes.iter().sum::<f64>() / n;

        Self {
            mean,
            std,
            bias: mean,
            mean_abs,
            cv: std / floor_magnitude(mean_abs, floor),
        }
    }
}

/// Multiplicative accuracy adjustment for one context partition of a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SituationalModifier {
    pub tag: ContextTag,
    pub sample_count: usize,
    /// Contextual mean distance miss / overall mean distance miss
    pub distance_factor: f64,
    /// Contextual mean direction miss / overall mean direction miss
    pub direction_factor: f64,
    pub low_confidence: bool,
}

/// Aggregate accuracy for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistic {
    pub key: GroupKey,
    pub sample_count: usize,
    pub distance: ErrorSummary,
    pub direction: ErrorSummary,
    /// Fewer samples than `min_sample_count`
    pub low_confidence: bool,
    pub modifiers: Vec<SituationalModifier>,
}

impl AggregateStatistic {
    pub fn mean_distance_error(&self) -> f64 {
        self.distance.mean
    }

    pub fn std_distance_error(&self) -> f64 {
        self.distance.std
    }

    pub fn mean_direction_error(&self) -> f64 {
        self.direction.mean
    }

    pub fn std_direction_error(&self) -> f64 {
        self.direction.std
    }

    pub fn distance_bias(&self) -> f64 {
        self.distance.bias
    }

    pub fn direction_bias(&self) -> f64 {
        self.direction.bias
    }

    pub fn modifier(&self, tag: ContextTag) -> Option<&SituationalModifier> {
        self.modifiers.iter().find(|m| m.tag == tag)
    }
}

/// Aggregate metrics into per-group statistics, sorted by group key.
///
/// Groups below the sample threshold are kept and flagged.
pub fn aggregate(
    metrics: &[AccuracyMetric],
    group_by: GroupBy,
    config: &PipelineConfig,
) -> Vec<AggregateStatistic> {
    let mut groups: FxHashMap<GroupKey, Vec<&AccuracyMetric>> = FxHashMap::default();
    for metric in metrics {
        groups
            .entry(GroupKey::for_metric(metric, group_by))
            .or_default()
            .push(metric);
    }

    let mut stats: Vec<AggregateStatistic> = groups
        .into_iter()
        .map(|(key, members)| summarize_group(key, &members, config))
        .collect();
    stats.sort_by(|a, b| a.key.cmp(&b.key));
    stats
}

fn summarize_group(
    key: GroupKey,
    members: &[&AccuracyMetric],
    config: &PipelineConfig,
) -> AggregateStatistic {
    let floor = config.accuracy.min_error_magnitude;
    let min_samples = config.aggregation.min_sample_count;

    let distance = summarize_distance(members, floor);
    let direction = summarize_direction(members, floor);

    // Second pass: context partitions, reported next to the base statistic
    let mut partitions: BTreeMap<ContextTag, Vec<&AccuracyMetric>> = BTreeMap::new();
    for metric in members {
        for tag in metric.context.tags(config.aggregation.complex_house_threshold) {
            partitions.entry(tag).or_default().push(*metric);
        }
    }
    let modifiers = partitions
        .into_iter()
        .map(|(tag, subset)| {
            let sub_distance = summarize_distance(&subset, floor);
            let sub_direction = summarize_direction(&subset, floor);
            SituationalModifier {
                tag,
                sample_count: subset.len(),
                distance_factor: sub_distance.mean_abs / floor_magnitude(distance.mean_abs, floor),
                direction_factor: sub_direction.mean_abs
                    / floor_magnitude(direction.mean_abs, floor),
                low_confidence: subset.len() < min_samples,
            }
        })
        .collect();

    AggregateStatistic {
        key,
        sample_count: members.len(),
        distance,
        direction,
        low_confidence: members.len() < min_samples,
        modifiers,
    }
}

fn summarize_distance(members: &[&AccuracyMetric], floor: f64) -> ErrorSummary {
    let values: Vec<f64> = members.iter().map(|m| m.distance_error).collect();
    ErrorSummary::from_values(&values, floor)
}

fn summarize_direction(members: &[&AccuracyMetric], floor: f64) -> ErrorSummary {
    let values: Vec<f64> = members.iter().map(|m| m.direction_error).collect();
    ErrorSummary::from_values(&values, floor)
}
