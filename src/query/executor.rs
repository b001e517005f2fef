//! Metric Executor
//!
//! Runs one metric request end to end over a deduplicated series:
//! 1. Window resolution and alignment
//! 2. Look-back filtering
//! 3. Bucketing by period
//! 4. Metric computation and labelling
//!
//! # Execution Pipeline
//!
//! ```text
//! RawRow → Dedup → Resolve Window → Filter → Bucket → Metric → Result
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::bucket::bucketize;
use super::error::{QueryError, QueryResult};
use super::metrics::{compute_entries, MetricEntry};
use super::window::{resolve_window, ResolvedWindow};
use crate::report::format::metric_header;
use crate::series::{dedup_daily, dedup_rows, Granularity, Metric, RawRow, Record};

/// A metric request: window bounds, granularity and metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub granularity: Granularity,
    pub metric: Metric,
}

impl MetricRequest {
    pub fn new(from: NaiveDate, to: NaiveDate, granularity: Granularity, metric: Metric) -> Self {
        Self {
            from,
            to,
            granularity,
            metric,
        }
    }

    /// Build a request from selector labels
    pub fn parse(from: NaiveDate, to: NaiveDate, granularity: &str, metric: &str) -> QueryResult<Self> {
        Ok(Self::new(from, to, granularity.parse()?, metric.parse()?))
    }
}

/// Result of a metric computation
#[derive(Debug, Clone, Serialize)]
pub struct MetricResult {
    pub metric: Metric,
    /// Resolved window the entries were computed over
    pub window: ResolvedWindow,
    /// Entries in bucket order (magnitude order for `Top 5 Changes`)
    pub entries: Vec<MetricEntry>,
}

impl MetricResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column header for the value column
    pub fn header(&self) -> String {
        metric_header(self.metric, self.window.requested)
    }

    pub fn granularity(&self) -> Granularity {
        self.window.requested
    }
}

/// Executor over one deduplicated, ascending series
#[derive(Debug, Clone)]
pub struct MetricExecutor {
    series: Vec<Record>,
}

impl MetricExecutor {
    /// Create an executor, deduplicating the given records
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            series: dedup_daily(records),
        }
    }

    /// Create an executor from raw row-store rows
    pub fn from_rows(rows: &[RawRow]) -> Self {
        Self {
            series: dedup_rows(rows),
        }
    }

    /// The deduplicated series
    pub fn series(&self) -> &[Record] {
        &self.series
    }

    /// Execute a request given as selector labels
    pub fn execute_str(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        granularity: &str,
        metric: &str,
    ) -> QueryResult<MetricResult> {
        self.execute(&MetricRequest::parse(from, to, granularity, metric)?)
    }

    /// Execute a parsed request
    pub fn execute(&self, request: &MetricRequest) -> QueryResult<MetricResult> {
        let start = Instant::now();

        if self.series.is_empty() {
            return Err(QueryError::EmptyInput);
        }

        let window = resolve_window(&self.series, request.from, request.to, request.granularity)?;

        let selected: Vec<&Record> = self
            .series
            .iter()
            .filter(|r| window.selects(r.timestamp))
            .collect();
        if selected.is_empty() {
            return Err(QueryError::EmptyRange);
        }

        let buckets = bucketize(selected, window.period);
        let entries = compute_entries(request.metric, &buckets, &window)?;

        tracing::debug!(
            metric = %request.metric,
            buckets = buckets.len(),
            entries = entries.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "computed metric"
        );

        Ok(MetricResult {
            metric: request.metric,
            window,
            entries,
        })
    }
}

/// Run the full pipeline over raw rows
pub fn compute_metric(
    rows: &[RawRow],
    from: NaiveDate,
    to: NaiveDate,
    granularity: &str,
    metric: &str,
) -> QueryResult<MetricResult> {
    MetricExecutor::from_rows(rows).execute_str(from, to, granularity, metric)
}
