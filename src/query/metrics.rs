//! Metric computation
//!
//! Every metric reads the currently-occupied area of the bucketed series.
//! Buckets before the reported window are only ever used as baselines.

use chrono::Datelike;
use serde::Serialize;

use super::bucket::Bucket;
use super::error::{QueryError, QueryResult};
use super::window::ResolvedWindow;
use crate::report::format::display_date;
use crate::series::{Metric, Period};

/// Number of entries kept by `Top 5 Changes`
pub const TOP_CHANGES_LIMIT: usize = 5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One labelled metric value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    /// Display label of the bucket (a date, a week range or a month)
    pub label: String,
    pub value: f64,
}

impl MetricEntry {
    fn for_bucket(bucket: &Bucket, period: Period, value: f64) -> Self {
        Self {
            label: display_date(bucket.record.day(), period),
            value,
        }
    }
}

/// Compute `metric` over ascending buckets that include the look-back range
pub fn compute_entries(
    metric: Metric,
    buckets: &[Bucket],
    window: &ResolvedWindow,
) -> QueryResult<Vec<MetricEntry>> {
    if !buckets.iter().any(|b| window.contains(b.record.timestamp)) {
        return Err(QueryError::EmptyRange);
    }

    match metric {
        Metric::PaceOfChange => pace_of_change(buckets, window),
        Metric::AreaChange => area_change(buckets, window),
        Metric::AveragePace => average_pace(buckets, window),
        Metric::TopChanges => top_changes(buckets, window),
    }
}

/// Change against the preceding bucket, for every in-window bucket that has one
fn pace_of_change(buckets: &[Bucket], window: &ResolvedWindow) -> QueryResult<Vec<MetricEntry>> {
    let entries: Vec<MetricEntry> = buckets
        .windows(2)
        .filter(|pair| window.contains(pair[1].record.timestamp))
        .map(|pair| {
            let change = pair[1].occupied_km2() - pair[0].occupied_km2();
            MetricEntry::for_bucket(&pair[1], window.period, change)
        })
        .collect();

    if entries.is_empty() {
        // The only in-window bucket has nothing before it to compare with
        tracing::debug!("no baseline bucket before the window");
        return Err(QueryError::EmptyRange);
    }
    Ok(entries)
}

/// Cumulative change against the first bucket at or after the window start
fn area_change(buckets: &[Bucket], window: &ResolvedWindow) -> QueryResult<Vec<MetricEntry>> {
    let baseline = buckets
        .iter()
        .find(|b| b.record.timestamp >= window.from)
        .ok_or(QueryError::EmptyRange)?
        .occupied_km2();

    Ok(buckets
        .iter()
        .filter(|b| window.contains(b.record.timestamp))
        .map(|b| MetricEntry::for_bucket(b, window.period, b.occupied_km2() - baseline))
        .collect())
}

/// Total in-window change spread evenly over the window's periods
fn average_pace(buckets: &[Bucket], window: &ResolvedWindow) -> QueryResult<Vec<MetricEntry>> {
    let in_window: Vec<&Bucket> = buckets
        .iter()
        .filter(|b| window.contains(b.record.timestamp))
        .collect();

    let (Some(first), Some(last)) = (in_window.first(), in_window.last()) else {
        return Err(QueryError::EmptyRange);
    };

    let total_change = last.occupied_km2() - first.occupied_km2();
    let pace = total_change / time_span(window);

    Ok(in_window
        .iter()
        .map(|b| MetricEntry::for_bucket(b, window.period, pace))
        .collect())
}

/// The largest pace-of-change entries by magnitude, ties kept in date order
fn top_changes(buckets: &[Bucket], window: &ResolvedWindow) -> QueryResult<Vec<MetricEntry>> {
    let mut entries = pace_of_change(buckets, window)?;
    entries.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    entries.truncate(TOP_CHANGES_LIMIT);
    Ok(entries)
}

/// Number of whole periods the window spans, never less than one
pub fn time_span(window: &ResolvedWindow) -> f64 {
    let millis = (window.to - window.from).num_milliseconds() as f64;
    let span = match window.period {
        Period::Day => (millis / MILLIS_PER_DAY).round(),
        Period::Week => (millis / (7.0 * MILLIS_PER_DAY)).round(),
        Period::Month => {
            let (from, to) = (window.from, window.to);
            let years = to.year() - from.year();
            (years * 12 + to.month() as i32 - from.month() as i32) as f64
        }
    };
    span.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::bucket::bucketize;
    use crate::query::window::resolve_window;
    use crate::series::{Granularity, Measurements, Record};
    use chrono::{Duration, NaiveDate};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn daily_series(start: &str, values: &[f64]) -> Vec<Record> {
        let start = day(start);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = start + Duration::days(i as i64);
                Record::new(
                    i.to_string(),
                    date.and_hms_opt(18, 0, 0).unwrap(),
                    Measurements::occupied(*v, 0.0),
                )
            })
            .collect()
    }

    fn run(
        metric: Metric,
        records: &[Record],
        from: &str,
        to: &str,
        granularity: Granularity,
    ) -> QueryResult<Vec<MetricEntry>> {
        let window = resolve_window(records, day(from), day(to), granularity)?;
        let selected: Vec<&Record> = records
            .iter()
            .filter(|r| window.selects(r.timestamp))
            .collect();
        let buckets = bucketize(selected, window.period);
        compute_entries(metric, &buckets, &window)
    }

    fn values(entries: &[MetricEntry]) -> Vec<f64> {
        entries.iter().map(|e| e.value).collect()
    }

    fn labels(entries: &[MetricEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_pace_without_prior_bucket() {
        let records = daily_series("2024-01-01", &[100.0, 105.0, 103.0]);
        let out = run(Metric::PaceOfChange, &records, "2024-01-01", "2024-01-03", Granularity::Daily)
            .unwrap();
        assert_eq!(values(&out), [5.0, -2.0]);
        assert_eq!(labels(&out), ["02.01.2024", "03.01.2024"]);
    }

    #[test]
    fn test_pace_uses_look_back_baseline() {
        let records = daily_series("2023-12-31", &[90.0, 100.0, 105.0, 103.0]);
        let out = run(Metric::PaceOfChange, &records, "2024-01-01", "2024-01-03", Granularity::Daily)
            .unwrap();
        assert_eq!(values(&out), [10.0, 5.0, -2.0]);
        assert_eq!(out[0].label, "01.01.2024");
    }

    #[test]
    fn test_pace_single_bucket_without_baseline() {
        let records = daily_series("2024-01-01", &[100.0, 105.0]);
        let err = run(Metric::PaceOfChange, &records, "2024-01-01", "2024-01-01", Granularity::Daily)
            .unwrap_err();
        assert_eq!(err, QueryError::EmptyRange);
    }

    #[test]
    fn test_area_change() {
        let records = daily_series("2023-12-31", &[90.0, 100.0, 105.0, 103.0]);
        let out = run(Metric::AreaChange, &records, "2024-01-01", "2024-01-03", Granularity::Daily)
            .unwrap();
        assert_eq!(values(&out), [0.0, 5.0, 3.0]);
    }

    #[test]
    fn test_average_pace_daily() {
        let mut values_in = vec![0.0; 11];
        values_in[1] = 100.0;
        values_in[10] = 120.0;
        // 2023-12-31 is a look-back record, the window is 2024-01-01..=2024-01-10
        let records = daily_series("2023-12-31", &values_in);
        let out = run(Metric::AveragePace, &records, "2024-01-01", "2024-01-10", Granularity::Daily)
            .unwrap();
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|e| (e.value - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_top_changes_limits_and_orders() {
        let records = daily_series(
            "2024-01-01",
            &[0.0, 1.0, -2.0, 1.0, 5.0, 2.0, 8.0, 7.0],
        );
        // pace: +1, -3, +3, +4, -3, +6, -1
        let out = run(Metric::TopChanges, &records, "2024-01-01", "2024-01-08", Granularity::Daily)
            .unwrap();
        assert_eq!(out.len(), TOP_CHANGES_LIMIT);
        assert_eq!(values(&out), [6.0, 4.0, -3.0, 3.0, -3.0]);
        assert_eq!(out[2].label, "03.01.2024");
        assert_eq!(out[3].label, "04.01.2024");
        assert_eq!(out[4].label, "06.01.2024");
    }

    #[test]
    fn test_weekly_pace_labels() {
        // Two weeks of data, 2024-01-01 and 2024-01-08 are Mondays
        let mut records = daily_series("2024-01-01", &[10.0; 14]);
        records[13].measurements.occupied_total_km2 = 30.0;
        let out = run(Metric::PaceOfChange, &records, "2024-01-08", "2024-01-14", Granularity::Weekly)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "08.01.2024 - 14.01.2024");
        assert_eq!(out[0].value, 20.0);
    }

    fn dated_series(points: &[(&str, f64)]) -> Vec<Record> {
        points
            .iter()
            .enumerate()
            .map(|(i, (date, v))| {
                Record::new(
                    i.to_string(),
                    day(date).and_hms_opt(18, 0, 0).unwrap(),
                    Measurements::occupied(*v, 0.0),
                )
            })
            .collect()
    }

    fn month_end_series() -> Vec<Record> {
        dated_series(&[
            ("2024-01-31", 100.0),
            ("2024-02-15", 102.0),
            ("2024-02-29", 105.0),
            ("2024-03-31", 120.0),
        ])
    }

    #[test]
    fn test_monthly_pace_uses_previous_month() {
        let records = month_end_series();
        let out = run(Metric::PaceOfChange, &records, "2024-02-10", "2024-03-05", Granularity::Monthly)
            .unwrap();
        assert_eq!(values(&out), [5.0, 15.0]);
        assert_eq!(labels(&out), ["02.2024", "03.2024"]);
    }

    #[test]
    fn test_monthly_area_change_and_average() {
        let records = month_end_series();

        let out = run(Metric::AreaChange, &records, "2024-02-10", "2024-03-05", Granularity::Monthly)
            .unwrap();
        assert_eq!(values(&out), [0.0, 15.0]);

        // February to March spans one month
        let out = run(Metric::AveragePace, &records, "2024-02-10", "2024-03-05", Granularity::Monthly)
            .unwrap();
        assert_eq!(values(&out), [15.0, 15.0]);
        assert_eq!(labels(&out), ["02.2024", "03.2024"]);
    }

    #[test]
    fn test_weekly_average_pace() {
        // 2024-01-07, 2024-01-14 and 2024-01-21 close the three weeks
        let mut values_in = vec![0.0; 21];
        values_in[6] = 10.0;
        values_in[13] = 25.0;
        values_in[20] = 40.0;
        let records = daily_series("2024-01-01", &values_in);

        let out = run(Metric::AveragePace, &records, "2024-01-03", "2024-01-18", Granularity::Weekly)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| (e.value - 10.0).abs() < 1e-9));
        assert_eq!(out[0].label, "01.01.2024 - 07.01.2024");
        assert_eq!(out[2].label, "15.01.2024 - 21.01.2024");
    }

    #[test]
    fn test_window_outside_series() {
        let records = daily_series("2024-01-01", &[1.0, 2.0, 3.0]);
        for metric in Metric::all() {
            let err = run(*metric, &records, "2025-01-01", "2025-02-01", Granularity::Daily)
                .unwrap_err();
            assert_eq!(err, QueryError::EmptyRange);
        }
    }

    #[test]
    fn test_time_span() {
        let records = daily_series("2024-01-01", &[0.0]);
        let span = |from: &str, to: &str, g: Granularity| {
            time_span(&resolve_window(&records, day(from), day(to), g).unwrap())
        };
        assert_eq!(span("2024-01-01", "2024-01-10", Granularity::Daily), 10.0);
        assert_eq!(span("2024-01-03", "2024-01-03", Granularity::Daily), 1.0);
        assert_eq!(span("2024-01-01", "2024-01-21", Granularity::Weekly), 3.0);
        assert_eq!(span("2024-01-15", "2024-04-02", Granularity::Monthly), 3.0);
        assert_eq!(span("2024-01-15", "2024-01-20", Granularity::Monthly), 1.0);
    }
}
