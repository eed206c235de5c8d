//! Parameter Builder Library
//!
//! Shot JSON -> accuracy pipeline -> parameter table (JSON / YAML / CSV)
//! plus SHA256 checksum metadata.

use anyhow::{bail, Context, Result};
use curl_core::calibration::ParameterTable;
use curl_core::config::PipelineConfig;
use curl_core::pipeline::{AccuracyPipeline, ExclusionSummary, PipelineReport};
use curl_core::shot::{classify, ShotRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Output encoding for the parameter table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ParamFormat {
    #[default]
    Json,
    Yaml,
    Csv,
}

impl ParamFormat {
    /// Guess from the output file extension, JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ParamFormat::Yaml,
            Some("csv") => ParamFormat::Csv,
            _ => ParamFormat::Json,
        }
    }
}

/// Build metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub schema_version: u32,
    /// SHA256 of the written file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub record_count: usize,
    pub measured_count: usize,
    pub malformed: usize,
    pub unknown: usize,
    pub inference_error: usize,
    pub missing_geometry: usize,
    /// Groups flagged below the sample threshold
    pub low_confidence_groups: Vec<String>,
    /// Categories left without parameters
    #[serde(default)]
    pub unmeasured_categories: Vec<String>,
}

/// One line of the `classify` listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRow {
    pub shot_id: u64,
    pub player_id: String,
    pub category: String,
    pub target_stone: Option<String>,
    pub contact_count: usize,
    pub ambiguous: bool,
    pub roll_angle_deg: Option<f64>,
    pub note: Option<String>,
}

/// Load shot records from a JSON array or a JSON-lines file (`.jsonl`).
pub fn load_shot_records(path: &Path) -> Result<Vec<ShotRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shot file: {}", path.display()))?;

    let records: Vec<ShotRecord> = if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid shot record on line {}", i + 1))
            })
            .collect::<Result<_>>()?
    } else {
        serde_json::from_str(&text).context("Failed to parse shot records JSON")?
    };

    info!("Loaded {} shot records from {}", records.len(), path.display());
    Ok(records)
}

/// Config file if given, else the named profile, else `CURL_THRESHOLD_PROFILE`.
pub fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<PipelineConfig> {
    match (path, profile) {
        (Some(path), _) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        (None, Some(name)) => Ok(PipelineConfig::from_profile(name)?),
        (None, None) => Ok(PipelineConfig::from_env_or_default()),
    }
}

/// Run the pipeline. Per-player sections are dropped unless `by_player`.
pub fn build_parameters(
    records: &[ShotRecord],
    config: PipelineConfig,
    by_player: bool,
) -> (PipelineReport, ParameterTable) {
    let report = AccuracyPipeline::new(config).run(records);
    for category in report.unmeasured_categories() {
        warn!("No parameters for {}: no measured shots", category);
    }
    let mut table = report.parameters.clone();
    if !by_player {
        table.players.clear();
    }
    (report, table)
}

/// Encode the table in the requested format.
pub fn render_parameter_table(table: &ParameterTable, format: ParamFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ParamFormat::Json => table.to_json()?.into_bytes(),
        ParamFormat::Yaml => table.to_yaml()?.into_bytes(),
        ParamFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in table.rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
            writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e))?
        }
    };
    Ok(bytes)
}

/// Write the table and return its checksum.
pub fn write_parameter_table(
    table: &ParameterTable,
    out: &Path,
    format: ParamFormat,
) -> Result<String> {
    let bytes = render_parameter_table(table, format)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(out, &bytes)
        .with_context(|| format!("Failed to write output file: {}", out.display()))?;

    let checksum = sha256_hex(&bytes);
    info!(
        "Wrote {} parameter groups to {} ({:?}, {} bytes)",
        table.categories.len() + table.players.len(),
        out.display(),
        format,
        bytes.len()
    );
    Ok(checksum)
}

pub fn build_metadata(report: &PipelineReport, checksum: String) -> BuildMetadata {
    let ExclusionSummary {
        malformed,
        unknown,
        inference_error,
        missing_geometry,
    } = report.exclusions;

    let low_confidence_groups = report
        .category_stats
        .iter()
        .chain(report.player_stats.iter())
        .filter(|s| s.low_confidence)
        .map(|s| match &s.key.player_id {
            Some(player) => format!("{}/{}", player, s.key.category),
            None => s.key.category.to_string(),
        })
        .collect();

    BuildMetadata {
        schema_version: report.parameters.schema_version,
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        record_count: report.record_count,
        measured_count: report.measured_count(),
        malformed,
        unknown,
        inference_error,
        missing_geometry,
        low_confidence_groups,
        unmeasured_categories: report
            .unmeasured_categories()
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }
}

/// Check a written table against a recorded checksum
pub fn verify_output(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read output file: {}", path.display()))?;
    Ok(sha256_hex(&bytes) == expected_checksum)
}

pub fn classification_rows(records: &[ShotRecord], config: &PipelineConfig) -> Vec<ClassificationRow> {
    records
        .iter()
        .map(|record| {
            let c = classify(record, &config.classifier, &config.sheet);
            ClassificationRow {
                shot_id: record.shot_id,
                player_id: record.player_id.clone(),
                category: c.category.to_string(),
                target_stone: c.target_stone.clone(),
                contact_count: c.contact_count,
                ambiguous: c.ambiguous,
                roll_angle_deg: c.roll_angle_deg,
                note: c.malformed.as_ref().map(|e| e.to_string()),
            }
        })
        .collect()
}

/// Write the classification listing as CSV
pub fn write_classification_csv<W: Write>(rows: &[ClassificationRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Refuse to build from a batch that produced nothing
pub fn ensure_measured(report: &PipelineReport) -> Result<()> {
    if report.record_count > 0 && report.measured_count() == 0 {
        bail!(
            "None of the {} records could be measured ({} excluded)",
            report.record_count,
            report.exclusions.total()
        );
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
