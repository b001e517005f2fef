//! Same-day deduplication
//!
//! The upstream feed can publish several snapshots a day. Only the latest
//! snapshot of each calendar day is kept.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::parse::parse_rows;
use super::types::{RawRow, Record};

/// Collapse records to the latest one per calendar day, sorted ascending.
///
/// Input order does not matter. When two records share an identical
/// timestamp the one appearing later in the input wins.
pub fn dedup_daily(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut latest: BTreeMap<NaiveDate, Record> = BTreeMap::new();

    for record in records {
        match latest.get(&record.day()) {
            Some(existing) if existing.timestamp > record.timestamp => {}
            _ => {
                latest.insert(record.day(), record);
            }
        }
    }

    latest.into_values().collect()
}

/// Parse raw rows and deduplicate them in one step
pub fn dedup_rows(rows: &[RawRow]) -> Vec<Record> {
    let records = dedup_daily(parse_rows(rows));
    tracing::debug!(days = records.len(), "deduplicated series");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::types::Measurements;
    use chrono::NaiveDateTime;

    fn rec(id: &str, ts: &str, km2: f64) -> Record {
        let ts = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap();
        Record::new(id, ts, Measurements::occupied(km2, 0.0))
    }

    #[test]
    fn test_keeps_latest_per_day() {
        let out = dedup_daily(vec![
            rec("3", "2024-01-02 18:00", 3.0),
            rec("1", "2024-01-01 09:00", 1.0),
            rec("2", "2024-01-01 21:30", 2.0),
            rec("4", "2024-01-02 08:00", 4.0),
        ]);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "2");
        assert_eq!(out[1].id, "3");
    }

    #[test]
    fn test_output_sorted_ascending() {
        let out = dedup_daily(vec![
            rec("c", "2024-03-01 12:00", 0.0),
            rec("a", "2023-12-31 12:00", 0.0),
            rec("b", "2024-01-15 12:00", 0.0),
        ]);
        let days: Vec<_> = out.iter().map(|r| r.day().to_string()).collect();
        assert_eq!(days, ["2023-12-31", "2024-01-15", "2024-03-01"]);
    }

    #[test]
    fn test_idempotent() {
        let once = dedup_daily(vec![
            rec("1", "2024-01-01 09:00", 1.0),
            rec("2", "2024-01-01 10:00", 2.0),
            rec("3", "2024-01-03 10:00", 3.0),
        ]);
        let twice = dedup_daily(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_daily(Vec::new()).is_empty());
    }

    #[test]
    fn test_dedup_rows_skips_unusable() {
        let rows: Vec<RawRow> = vec![
            vec!["1".into(), "01/01/2024 09:00:00".into()],
            vec!["2".into(), "garbage".into()],
            vec!["".into(), "01/01/2024 23:00:00".into()],
            vec!["3".into(), "01/01/2024 10:00:00".into()],
        ];
        let out = dedup_rows(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "3");
    }
}
