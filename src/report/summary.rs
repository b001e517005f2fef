//! Summary statistics and result descriptions

use chrono::NaiveDate;
use serde::Serialize;

use super::format::{format_date_lenient, format_value};
use crate::query::{MetricResult, QueryError, QueryResult};
use crate::series::Record;

/// Total area of Ukraine in km²
pub const UKRAINE_AREA_KM2: f64 = 603_548.0;

/// An extreme of the occupied share and the day it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupationExtreme {
    pub percent: f64,
    pub day: NaiveDate,
}

/// Headline figures over the whole series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Day of the latest record
    pub as_of: NaiveDate,
    pub occupied_km2: f64,
    pub occupied_percent: f64,
    pub max_occupied: OccupationExtreme,
    pub min_occupied: OccupationExtreme,
    pub total_area_km2: f64,
}

impl SummaryStats {
    pub fn from_records(records: &[Record]) -> QueryResult<Self> {
        let latest = records
            .iter()
            .max_by_key(|r| r.timestamp)
            .ok_or(QueryError::EmptyInput)?;

        let mut max: Option<OccupationExtreme> = None;
        let mut min: Option<OccupationExtreme> = None;
        for record in records {
            let percent = record.measurements.occupied_total_percent;
            if percent.is_nan() {
                continue;
            }
            let candidate = OccupationExtreme {
                percent,
                day: record.day(),
            };
            if max.map_or(true, |m| percent > m.percent) {
                max = Some(candidate);
            }
            if min.map_or(true, |m| percent < m.percent) {
                min = Some(candidate);
            }
        }

        let fallback = OccupationExtreme {
            percent: latest.measurements.occupied_total_percent,
            day: latest.day(),
        };

        Ok(Self {
            as_of: latest.day(),
            occupied_km2: latest.occupied_km2(),
            occupied_percent: latest.measurements.occupied_total_percent,
            max_occupied: max.unwrap_or(fallback),
            min_occupied: min.unwrap_or(fallback),
            total_area_km2: UKRAINE_AREA_KM2,
        })
    }

    /// Label/value rows for display
    pub fn rows(&self) -> Vec<[String; 2]> {
        let extreme = |e: &OccupationExtreme| {
            format!("{}% on {}", format_value(e.percent), e.day.format("%d.%m.%Y"))
        };
        vec![
            [
                "Total area currently occupied".to_string(),
                format!("{} km²", format_value(self.occupied_km2)),
            ],
            [
                "Percentage of Ukraine currently occupied".to_string(),
                format!("{}%", format_value(self.occupied_percent)),
            ],
            ["Historical maximum occupied".to_string(), extreme(&self.max_occupied)],
            ["Historical minimum occupied".to_string(), extreme(&self.min_occupied)],
            [
                "Total area of Ukraine".to_string(),
                format!("{} km²", group_thousands(self.total_area_km2)),
            ],
        ]
    }
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// One-sentence description of a metric result, for chart captions
pub fn describe(result: &MetricResult) -> QueryResult<String> {
    let (Some(first), Some(last)) = (result.entries.first(), result.entries.last()) else {
        return Err(QueryError::EmptyRange);
    };

    Ok(format!(
        "Data shows {} from {} to {}. Total change: {} km².",
        result.metric,
        format_date_lenient(&first.label),
        format_date_lenient(&last.label),
        format_value(last.value - first.value)
    ))
}
