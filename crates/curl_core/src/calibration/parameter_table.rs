//! Parameter export
//!
//! Flattens aggregate statistics into the name/value table the game
//! simulation reads:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "categories": { "draw": { "distance_mean": 0.08, "distance_std": 0.31, ... } },
//!   "modifiers": { "pressure": { "draw": { "distance_factor": 1.4, ... } } },
//!   "players": { "p1": { "draw": { ... } } }
//! }
//! ```
//!
//! Every map is a `BTreeMap`, so the same statistics always serialize to the
//! same bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::aggregator::{AggregateStatistic, ErrorSummary};
use crate::error::Result;
use crate::SCHEMA_VERSION;

/// Metric name -> value
pub type MetricMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    pub schema_version: u32,
    /// Category -> metrics
    pub categories: BTreeMap<String, MetricMap>,
    /// Context tag -> category -> factors
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifiers: BTreeMap<String, BTreeMap<String, MetricMap>>,
    /// Player -> category -> metrics
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub players: BTreeMap<String, BTreeMap<String, MetricMap>>,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            categories: BTreeMap::new(),
            modifiers: BTreeMap::new(),
            players: BTreeMap::new(),
        }
    }
}

/// One flattened table row (CSV output)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRow {
    pub scope: String,
    pub key: String,
    pub category: String,
    pub metric: String,
    pub value: f64,
}

/// Build the export table.
///
/// Statistics without a player key land in `categories` together with their
/// modifiers; per-player statistics land in `players`.
pub fn export(aggregates: &[AggregateStatistic]) -> ParameterTable {
    let mut table = ParameterTable::default();

    for stat in aggregates {
        let category = stat.key.category.as_str().to_string();
        match &stat.key.player_id {
            None => {
                table.categories.insert(category.clone(), stat_metrics(stat));
                for modifier in &stat.modifiers {
                    let mut factors = MetricMap::new();
                    factors.insert("distance_factor".into(), modifier.distance_factor);
                    factors.insert("direction_factor".into(), modifier.direction_factor);
                    factors.insert("sample_count".into(), modifier.sample_count as f64);
                    factors.insert("low_confidence".into(), flag(modifier.low_confidence));
                    table
                        .modifiers
                        .entry(modifier.tag.as_str().to_string())
                        .or_default()
                        .insert(category.clone(), factors);
                }
            }
            Some(player) => {
                table
                    .players
                    .entry(player.clone())
                    .or_default()
                    .insert(category, stat_metrics(stat));
            }
        }
    }

    table
}

fn stat_metrics(stat: &AggregateStatistic) -> MetricMap {
    let mut m = MetricMap::new();
    insert_summary(&mut m, "distance", &stat.distance);
    insert_summary(&mut m, "direction", &stat.direction);
    m.insert("sample_count".into(), stat.sample_count as f64);
    m.insert("low_confidence".into(), flag(stat.low_confidence));
    m
}

fn insert_summary(m: &mut MetricMap, prefix: &str, s: &ErrorSummary) {
    m.insert(format!("{prefix}_mean"), s.mean);
    m.insert(format!("{prefix}_std"), s.std);
    m.insert(format!("{prefix}_bias"), s.bias);
    m.insert(format!("{prefix}_mean_abs"), s.mean_abs);
    m.insert(format!("{prefix}_cv"), s.cv);
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl ParameterTable {
    pub fn get(&self, category: &str, metric: &str) -> Option<f64> {
        self.categories.get(category)?.get(metric).copied()
    }

    pub fn modifier(&self, tag: &str, category: &str, metric: &str) -> Option<f64> {
        self.modifiers.get(tag)?.get(category)?.get(metric).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.players.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Flattened rows in table order: category, modifier, then player scope
    pub fn rows(&self) -> Vec<ParameterRow> {
        let mut rows = Vec::new();
        for (category, metrics) in &self.categories {
            push_rows(&mut rows, "category", category, category, metrics);
        }
        for (tag, per_category) in &self.modifiers {
            for (category, metrics) in per_category {
                push_rows(&mut rows, "modifier", tag, category, metrics);
            }
        }
        for (player, per_category) in &self.players {
            for (category, metrics) in per_category {
                push_rows(&mut rows, "player", player, category, metrics);
            }
        }
        rows
    }

    /// SHA-256 of the compact JSON encoding, lowercase hex
    pub fn checksum(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn push_rows(rows: &mut Vec<ParameterRow>, scope: &str, key: &str, category: &str, metrics: &MetricMap) {
    for (metric, value) in metrics {
        rows.push(ParameterRow {
            scope: scope.to_string(),
            key: key.to_string(),
            category: category.to_string(),
            metric: metric.clone(),
            value: *value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::aggregator::{GroupKey, SituationalModifier};
    use crate::shot::{ContextTag, ShotCategory};
    use tempfile::tempdir;

    fn summary(mean: f64, std: f64) -> ErrorSummary {
        ErrorSummary {
            mean,
            std,
            bias: mean,
            mean_abs: mean.abs(),
            cv: 0.5,
        }
    }

    fn stat(category: ShotCategory, player: Option<&str>) -> AggregateStatistic {
        AggregateStatistic {
            key: GroupKey {
                category,
                player_id: player.map(str::to_string),
            },
            sample_count: 12,
            distance: summary(0.08, 0.31),
            direction: summary(-0.4, 2.1),
            low_confidence: false,
            modifiers: vec![SituationalModifier {
                tag: ContextTag::Pressure,
                sample_count: 4,
                distance_factor: 1.4,
                direction_factor: 1.1,
                low_confidence: false,
            }],
        }
    }

    #[test]
    fn test_export_layout() {
        let table = export(&[
            stat(ShotCategory::Draw, None),
            stat(ShotCategory::TakeOut, None),
            stat(ShotCategory::Draw, Some("p1")),
        ]);

        assert_eq!(table.schema_version, SCHEMA_VERSION);
        assert_eq!(table.get("draw", "distance_mean"), Some(0.08));
        assert_eq!(table.get("take_out", "direction_std"), Some(2.1));
        assert_eq!(table.get("draw", "direction_bias"), Some(-0.4));
        assert_eq!(table.get("draw", "sample_count"), Some(12.0));
        assert_eq!(table.get("guard", "distance_mean"), None);
        assert_eq!(table.modifier("pressure", "draw", "distance_factor"), Some(1.4));
        assert_eq!(table.players["p1"]["draw"]["distance_std"], 0.31);
        // Player statistics never add modifier rows
        assert_eq!(table.modifiers["pressure"].len(), 2);
    }

    #[test]
    fn test_json_round_trip_and_keys() {
        let table = export(&[stat(ShotCategory::Guard, None)]);
        let json = table.to_json().unwrap();
        assert!(json.contains("\"guard\""));
        assert!(json.contains("\"distance_mean\""));
        assert!(!json.contains("\"players\""));
        assert_eq!(ParameterTable::from_json(&json).unwrap(), table);
    }

    #[test]
    fn test_yaml_output() {
        let table = export(&[stat(ShotCategory::Freeze, None)]);
        let yaml = table.to_yaml().unwrap();
        assert!(yaml.contains("freeze:"));
        assert!(yaml.contains("schema_version: 1"));
    }

    #[test]
    fn test_checksum_is_stable() {
        let a = export(&[stat(ShotCategory::Draw, None), stat(ShotCategory::TakeOut, None)]);
        let b = export(&[stat(ShotCategory::TakeOut, None), stat(ShotCategory::Draw, None)]);
        let ca = a.checksum().unwrap();
        assert_eq!(ca, b.checksum().unwrap());
        assert_eq!(ca.len(), 64);

        let c = export(&[stat(ShotCategory::Draw, None)]);
        assert_ne!(ca, c.checksum().unwrap());
    }

    #[test]
    fn test_rows_scopes() {
        let table = export(&[stat(ShotCategory::Draw, None), stat(ShotCategory::Draw, Some("p1"))]);
        let rows = table.rows();
        assert_eq!(rows[0].scope, "category");
        assert!(rows.iter().any(|r| r.scope == "modifier" && r.key == "pressure"));
        assert!(rows.iter().any(|r| r.scope == "player" && r.key == "p1"));
        let category_rows = rows.iter().filter(|r| r.scope == "category").count();
        assert_eq!(category_rows, table.categories["draw"].len());
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.json");
        let table = export(&[stat(ShotCategory::HitAndRoll, None)]);
        table.write_json(&path).unwrap();

        let loaded = ParameterTable::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.get("hit_and_roll", "distance_std"), Some(0.31));
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("params.json");
        assert!(export(&[]).write_json(&path).is_err());
    }
}
