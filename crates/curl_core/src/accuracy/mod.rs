//! # Accuracy Module
//!
//! Per-shot distance and direction error.
//!
//! - `calculator` - signed errors against an inferred target
//! - `bands` - on_target/close/moderate/large style labels

pub mod bands;
pub mod calculator;

pub use bands::{DirectionBand, DistanceBand, ErrorMagnitude};
pub use calculator::{compute_accuracy, floor_magnitude, AccuracyMetric};
