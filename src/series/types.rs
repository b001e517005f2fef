//! Core data types for territorial-control series
//!
//! This module defines the fundamental types used throughout the pipeline:
//! - `Record`: One snapshot of the front, keyed by timestamp
//! - `Measurements`: The nine area/percentage fields of a snapshot
//! - `Granularity` and `Period`: How a request buckets time
//! - `Metric`: Which summary to derive

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::query::QueryError;

/// One positional row as held by the row store.
///
/// Layout: `[0] id, [1] date, [2..=10]` the measurement fields in
/// [`Measurements`] order.
pub type RawRow = Vec<String>;

/// Number of cells in a complete raw row
pub const RAW_ROW_WIDTH: usize = 11;

/// Start of the full-scale invasion, the epoch of `"23.02.2022 to date"`
pub const INVASION_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2022, 2, 23) {
    Some(date) => date,
    None => panic!("invalid invasion epoch"),
};

/// Area and percentage measurements of a single snapshot
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    /// Contested gray-zone area (km²)
    pub gray_zone_km2: f64,
    /// Liberated area (km²)
    pub liberated_km2: f64,
    /// Liberated share of Ukraine (%)
    pub liberated_percent: f64,
    /// Area occupied before 24.02.2022 (km²)
    pub occupied_before_km2: f64,
    /// Share occupied before 24.02.2022 (%)
    pub occupied_before_percent: f64,
    /// Area occupied after 24.02.2022 (km²)
    pub occupied_after_km2: f64,
    /// Share occupied after 24.02.2022 (%)
    pub occupied_after_percent: f64,
    /// Currently occupied area (km²), the series every metric runs on
    pub occupied_total_km2: f64,
    /// Currently occupied share (%)
    pub occupied_total_percent: f64,
}

impl Measurements {
    /// Build from the nine numeric cells in row order
    pub fn from_array(values: [f64; 9]) -> Self {
        Self {
            gray_zone_km2: values[0],
            liberated_km2: values[1],
            liberated_percent: values[2],
            occupied_before_km2: values[3],
            occupied_before_percent: values[4],
            occupied_after_km2: values[5],
            occupied_after_percent: values[6],
            occupied_total_km2: values[7],
            occupied_total_percent: values[8],
        }
    }

    /// Measurements with only the currently-occupied fields set
    pub fn occupied(km2: f64, percent: f64) -> Self {
        Self {
            occupied_total_km2: km2,
            occupied_total_percent: percent,
            ..Self::default()
        }
    }
}

/// A single measurement snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Opaque identifier assigned by the upstream history feed
    pub id: String,
    /// Wall-clock time of the snapshot
    pub timestamp: NaiveDateTime,
    pub measurements: Measurements,
}

impl Record {
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, measurements: Measurements) -> Self {
        Self {
            id: id.into(),
            timestamp,
            measurements,
        }
    }

    /// Calendar day the snapshot belongs to
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Currently occupied area in km²
    pub fn occupied_km2(&self) -> f64 {
        self.measurements.occupied_total_km2
    }
}

/// Bucketing unit a request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar day
    Day,
    /// Monday through Sunday
    Week,
    /// Calendar month
    Month,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

/// Time granularity selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    /// The 30 days ending at the latest record, bucketed daily
    Last30Days,
    /// From the invasion epoch (or first record) to the latest record, bucketed daily
    SinceInvasion,
}

impl Granularity {
    /// All granularities, in menu order
    pub fn all() -> &'static [Granularity] {
        &[
            Granularity::Daily,
            Granularity::Weekly,
            Granularity::Monthly,
            Granularity::Last30Days,
            Granularity::SinceInvasion,
        ]
    }

    /// Label as it appears in the granularity selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Last30Days => "Last 30 days",
            Self::SinceInvasion => "23.02.2022 to date",
        }
    }

    /// Bucketing period used by every downstream stage
    pub fn period(&self) -> Period {
        match self {
            Self::Weekly => Period::Week,
            Self::Monthly => Period::Month,
            Self::Daily | Self::Last30Days | Self::SinceInvasion => Period::Day,
        }
    }

    /// Whether the requested bounds are replaced by bounds derived from the data
    pub fn is_data_bounded(&self) -> bool {
        matches!(self, Self::Last30Days | Self::SinceInvasion)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Granularity::all()
            .iter()
            .copied()
            .find(|g| g.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| QueryError::UnsupportedGranularity(trimmed.to_string()))
    }
}

/// Summary metric derived from the bucketed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Change in occupied area since the previous bucket
    PaceOfChange,
    /// Change in occupied area since the first in-window bucket
    AreaChange,
    /// Mean change per period across the window
    AveragePace,
    /// The five largest pace-of-change entries by magnitude
    TopChanges,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[
            Metric::PaceOfChange,
            Metric::AreaChange,
            Metric::AveragePace,
            Metric::TopChanges,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PaceOfChange => "Pace of change",
            Self::AreaChange => "Area change",
            Self::AveragePace => "Average pace",
            Self::TopChanges => "Top 5 Changes",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Metric::all()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| QueryError::UnsupportedMetric(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_labels_round_trip() {
        for g in Granularity::all() {
            assert_eq!(g.label().parse::<Granularity>().unwrap(), *g);
        }
        assert_eq!(
            "23.02.2022 to date".parse::<Granularity>().unwrap(),
            Granularity::SinceInvasion
        );
    }

    #[test]
    fn test_unknown_granularity() {
        let err = "Hourly".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedGranularity(ref g) if g == "Hourly"));
    }

    #[test]
    fn test_granularity_period() {
        assert_eq!(Granularity::Weekly.period(), Period::Week);
        assert_eq!(Granularity::Monthly.period(), Period::Month);
        assert_eq!(Granularity::SinceInvasion.period(), Period::Day);
        assert_eq!(Granularity::Last30Days.period(), Period::Day);
    }

    #[test]
    fn test_metric_names() {
        assert_eq!("Top 5 Changes".parse::<Metric>().unwrap(), Metric::TopChanges);
        assert_eq!("pace of change".parse::<Metric>().unwrap(), Metric::PaceOfChange);
        assert!(matches!(
            "Forecast".parse::<Metric>(),
            Err(QueryError::UnsupportedMetric(_))
        ));
    }

    #[test]
    fn test_measurements_from_array() {
        let m = Measurements::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(m.gray_zone_km2, 1.0);
        assert_eq!(m.occupied_total_km2, 8.0);
        assert_eq!(m.occupied_total_percent, 9.0);
    }

    #[test]
    fn test_invasion_epoch() {
        assert_eq!(INVASION_EPOCH.to_string(), "2022-02-23");
    }
}
