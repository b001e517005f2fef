//! History Snapshot Source
//!
//! Reads the upstream feed's history export, a JSON array of snapshots each
//! carrying its area breakdown, and assembles row-store rows from it.

use chrono::DateTime;
use serde::Deserialize;
use std::cmp::Ordering;
use std::path::PathBuf;

use super::*;
use crate::series::NATIVE_TIMESTAMP_FORMAT;

/// Area occupied before 24.02.2022 (km²), not reported by the feed
pub const OCCUPIED_BEFORE_KM2: f64 = 42495.4112;

/// Share occupied before 24.02.2022 (%)
pub const OCCUPIED_BEFORE_PERCENT: f64 = 7.04;

/// A number the feed sometimes sends as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

impl Loose {
    fn value(&self) -> Option<f64> {
        match self {
            Loose::Number(n) => Some(*n),
            Loose::Text(s) => s.trim().trim_end_matches('%').parse().ok(),
        }
    }
}

impl Default for Loose {
    fn default() -> Self {
        Loose::Number(0.0)
    }
}

/// One area entry of a snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct AreaEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    area: Loose,
    #[serde(default)]
    percent: Loose,
}

impl AreaEntry {
    pub fn area(&self) -> f64 {
        self.area.value().unwrap_or(0.0)
    }

    pub fn percent(&self) -> f64 {
        self.percent.value().unwrap_or(0.0)
    }
}

/// One history snapshot with its areas
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySnapshot {
    id: serde_json::Value,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "descriptionEn", default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub areas: Vec<AreaEntry>,
}

impl HistorySnapshot {
    pub fn id(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Assemble a row-store row
    pub fn to_row(&self) -> Result<RawRow, SourceError> {
        let created = DateTime::parse_from_rfc3339(&self.created_at).map_err(|e| {
            SourceError::Parse(format!(
                "snapshot {}: bad createdAt {:?}: {}",
                self.id(),
                self.created_at,
                e
            ))
        })?;

        let mut gray_zone = 0.0;
        let (mut liberated_km2, mut liberated_percent) = (0.0, 0.0);
        let (mut after_km2, mut after_percent) = (0.0, 0.0);

        for area in &self.areas {
            match area.kind.as_str() {
                "liberated" => {
                    liberated_km2 = area.area();
                    liberated_percent = area.percent();
                }
                "occupied_after_24_02_2022" => {
                    after_km2 = area.area();
                    after_percent = area.percent();
                }
                "unspecified" => gray_zone = area.area(),
                other => tracing::trace!(kind = other, "ignoring area type"),
            }
        }

        let total_km2 = OCCUPIED_BEFORE_KM2 + after_km2;
        let total_percent = OCCUPIED_BEFORE_PERCENT + after_percent;

        Ok(vec![
            self.id(),
            created.naive_local().format(NATIVE_TIMESTAMP_FORMAT).to_string(),
            gray_zone.to_string(),
            liberated_km2.to_string(),
            liberated_percent.to_string(),
            OCCUPIED_BEFORE_KM2.to_string(),
            OCCUPIED_BEFORE_PERCENT.to_string(),
            after_km2.to_string(),
            after_percent.to_string(),
            total_km2.to_string(),
            format!("{:.2}", total_percent),
        ])
    }
}

/// Compare feed ids numerically when both are numbers
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

enum Input {
    Path(PathBuf),
    Text(String),
}

/// Row source over a history export
pub struct SnapshotSource {
    input: Input,
    /// Only snapshots with an id after this one are read
    after_id: Option<String>,
}

impl SnapshotSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Input::Path(path.into()),
            after_id: None,
        }
    }

    pub fn from_text(data: impl Into<String>) -> Self {
        Self {
            input: Input::Text(data.into()),
            after_id: None,
        }
    }

    /// Skip snapshots already held by the row store
    pub fn after_id(mut self, id: impl Into<String>) -> Self {
        self.after_id = Some(id.into());
        self
    }

    fn load(&self) -> Result<Vec<HistorySnapshot>, SourceError> {
        Ok(match &self.input {
            Input::Path(path) => serde_json::from_reader(std::io::BufReader::new(
                std::fs::File::open(path)?,
            ))?,
            Input::Text(text) => serde_json::from_str(text)?,
        })
    }

    /// Parse the export, newest snapshot first
    pub fn snapshots(&self) -> Result<Vec<HistorySnapshot>, SourceError> {
        let mut snapshots = self.load()?;

        if let Some(after) = &self.after_id {
            snapshots.retain(|s| compare_ids(&s.id(), after) == Ordering::Greater);
        }
        snapshots.sort_by(|a, b| compare_ids(&b.id(), &a.id()));
        Ok(snapshots)
    }

    /// English description of the snapshot with the given id.
    ///
    /// Looks at the whole export, ignoring `after_id`. A blank description
    /// counts as missing.
    pub fn description_for(&self, id: &str) -> Result<Option<String>, SourceError> {
        let description = self
            .load()?
            .into_iter()
            .find(|s| compare_ids(&s.id(), id) == Ordering::Equal)
            .and_then(|s| s.description_en)
            .filter(|d| !d.trim().is_empty());
        Ok(description)
    }
}

impl RowSource for SnapshotSource {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError> {
        let mut rows = Vec::new();
        for snapshot in self.snapshots()? {
            match snapshot.to_row() {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(error = %e, "skipping snapshot"),
            }
        }
        tracing::debug!(rows = rows.len(), "assembled rows from snapshots");
        Ok(rows)
    }
}
