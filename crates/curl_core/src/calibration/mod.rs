//! Accuracy Calibration
//!
//! Turns a batch of per-shot metrics into the parameter table the simulation
//! consumes.
//!
//! This module provides:
//! - Aggregator (per-category / per-player distributions + situational modifiers)
//! - Error pattern distribution (band pair and magnitude shares)
//! - Parameter table export (JSON / YAML / flat rows, with checksum)

pub mod aggregator;
pub mod parameter_table;
pub mod patterns;

pub use aggregator::{
    aggregate, AggregateStatistic, ErrorSummary, GroupBy, GroupKey, SituationalModifier,
};
pub use parameter_table::{export, MetricMap, ParameterRow, ParameterTable};
pub use patterns::{ErrorPatternDistribution, MagnitudeShare, PatternCell};
