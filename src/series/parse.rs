//! Raw row parsing
//!
//! Turns positional rows from the row store into [`Record`]s. Rows that
//! cannot be read are skipped with a log line instead of failing the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::types::{Measurements, RawRow, Record};

/// Format the row store writes timestamps in
pub const NATIVE_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

const DATETIME_FORMATS: [&str; 4] = [
    NATIVE_TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a timestamp cell.
///
/// Date-only values land at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse a numeric cell. Empty reads as zero.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim().trim_end_matches('%').trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok()
}

/// Parse one raw row, or `None` if it is empty or malformed
pub fn parse_row(row: &RawRow) -> Option<Record> {
    let id = row.first().map(|s| s.trim()).unwrap_or_default();
    if id.is_empty() {
        return None;
    }

    let Some(timestamp) = row.get(1).and_then(|s| parse_timestamp(s)) else {
        tracing::debug!(id, "skipping row with missing or unparseable date");
        return None;
    };

    let mut values = [0.0; 9];
    for (offset, slot) in values.iter_mut().enumerate() {
        let cell = row.get(offset + 2).map(String::as_str).unwrap_or("");
        match parse_number(cell) {
            Some(v) => *slot = v,
            None => {
                tracing::warn!(id, column = offset + 2, cell, "skipping row with non-numeric cell");
                return None;
            }
        }
    }

    Some(Record::new(id, timestamp, Measurements::from_array(values)))
}

/// Parse every usable row, preserving input order
pub fn parse_rows(rows: &[RawRow]) -> Vec<Record> {
    let records: Vec<Record> = rows.iter().filter_map(parse_row).collect();
    tracing::debug!(
        rows = rows.len(),
        records = records.len(),
        "parsed raw rows"
    );
    records
}
