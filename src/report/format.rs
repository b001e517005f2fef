//! Display formatting
//!
//! Date labels, column headers and value rendering for result tables.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::query::{week_end, week_start, QueryError, QueryResult};
use crate::series::{parse_timestamp, Granularity, Metric, Period};

/// Rendered in place of a date that could not be read
pub const INVALID_DATE: &str = "Invalid Date";

/// Header of the label column
pub const DATE_COLUMN: &str = "Date";

const DAY_FORMAT: &str = "%d.%m.%Y";

/// Render a bucket date for display.
///
/// - Day: `DD.MM.YYYY`
/// - Week: `DD.MM.YYYY - DD.MM.YYYY`, Monday to Sunday
/// - Month: `MM.YYYY`
pub fn display_date(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Day => date.format(DAY_FORMAT).to_string(),
        Period::Week => format!(
            "{} - {}",
            week_start(date).format(DAY_FORMAT),
            week_end(date).format(DAY_FORMAT)
        ),
        Period::Month => format!("{:02}.{}", date.month(), date.year()),
    }
}

/// Unit phrase used in the pace-of-change header
pub fn period_phrase(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Daily | Granularity::SinceInvasion => "day",
        Granularity::Weekly => "week",
        Granularity::Monthly => "month",
        Granularity::Last30Days => "30-day window",
    }
}

/// Header of the value column
pub fn metric_header(metric: Metric, granularity: Granularity) -> String {
    match metric {
        Metric::PaceOfChange => format!(
            "Russian-occupied territory per {}, km²",
            period_phrase(granularity)
        ),
        Metric::AreaChange => "Total Change (km²)".to_string(),
        Metric::AveragePace => "Average Daily Change (km²)".to_string(),
        Metric::TopChanges => "Change (km²)".to_string(),
    }
}

/// Render a value with exactly two decimals
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

static LABEL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d{1,2})\.)?(\d{1,2})\.(\d{4})\b").expect("label date regex")
});

/// Date of the first token of a display label.
///
/// Accepts `DD.MM.YYYY`, `DD.MM.YYYY - DD.MM.YYYY` and `MM.YYYY` (day 1).
pub fn label_date(label: &str) -> QueryResult<NaiveDate> {
    let invalid = || QueryError::InvalidDate(label.to_string());
    let caps = LABEL_DATE_RE.captures(label).ok_or_else(invalid)?;

    let day = caps
        .get(1)
        .map(|m| m.as_str().parse::<u32>())
        .transpose()
        .map_err(|_| invalid())?
        .unwrap_or(1);
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Render free-form date text as `DD.MM.YYYY`, or the invalid-date sentinel
pub fn format_date_lenient(text: &str) -> String {
    if let Some(ts) = parse_timestamp(text) {
        return ts.date().format(DAY_FORMAT).to_string();
    }
    match label_date(text) {
        Ok(date) => date.format(DAY_FORMAT).to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "rendering unreadable date");
            INVALID_DATE.to_string()
        }
    }
}
