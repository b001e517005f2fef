//! Benchmarks for the Frontline metric pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use frontline::query::{MetricExecutor, MetricRequest};
use frontline::report::ResultTable;
use frontline::series::{dedup_rows, Granularity, Metric, RawRow};

/// Two snapshots a day, newest first, the way the row store holds them
fn create_test_rows(days: usize) -> Vec<RawRow> {
    let start = NaiveDate::from_ymd_opt(2022, 2, 24).unwrap();
    let mut rows = Vec::with_capacity(days * 2);
    for i in (0..days).rev() {
        let date = start + Duration::days(i as i64);
        for hour in [21, 9] {
            let occupied = 100_000.0 + (i as f64 * 0.37).sin() * 500.0 + hour as f64;
            rows.push(vec![
                format!("{}", i * 2 + hour / 12),
                format!("{} {:02}:00:00", date.format("%m/%d/%Y"), hour),
                "400".into(),
                "0".into(),
                "0".into(),
                "42495.4112".into(),
                "7.04".into(),
                format!("{}", occupied - 42495.4112),
                "10.5".into(),
                format!("{}", occupied),
                "17.54".into(),
            ]);
        }
    }
    rows
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup");

    for days in [365, 1000] {
        let rows = create_test_rows(days);
        group.throughput(Throughput::Elements(rows.len() as u64));

        group.bench_function(format!("dedup_rows_{}", days), |b| {
            b.iter(|| dedup_rows(black_box(&rows)))
        });
    }

    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");

    let executor = MetricExecutor::from_rows(&create_test_rows(1000));
    let from = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
        for metric in Metric::all() {
            let request = MetricRequest::new(from, to, granularity, *metric);
            group.bench_function(format!("{}_{}", granularity, metric), |b| {
                b.iter(|| executor.execute(black_box(&request)).unwrap())
            });
        }
    }

    group.bench_function("since_invasion_table", |b| {
        let request = MetricRequest::new(from, to, Granularity::SinceInvasion, Metric::PaceOfChange);
        b.iter(|| {
            let result = executor.execute(black_box(&request)).unwrap();
            ResultTable::from_result(&result)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_dedup, bench_metrics);
criterion_main!(benches);
