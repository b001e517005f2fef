//! # Frontline
//!
//! Territorial-control time series - turns snapshots of occupied, liberated
//! and contested area into daily, weekly and monthly summary metrics.
//!
//! ## Features
//!
//! - **Deduplication**: One snapshot per calendar day, the latest one wins
//! - **Aligned windows**: Weeks run Monday to Sunday, months end on their last day
//! - **Look-back baselines**: Pace of change always compares against the prior period
//! - **Four metrics**: Pace of change, area change, average pace, top 5 changes
//!
//! ## Modules
//!
//! - [`series`]: Records, raw row parsing and deduplication
//! - [`query`]: Window resolution, bucketing and metric computation
//! - [`report`]: Labels, headers, result tables and summary statistics
//! - [`source`]: Row sources and result writers
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use frontline::query::MetricExecutor;
//! use frontline::report::ResultTable;
//! use frontline::source::{CsvRowSource, RowSource};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rows = CsvRowSource::from_path("raw_data.csv").read_rows()?;
//!     let executor = MetricExecutor::from_rows(&rows);
//!
//!     let result = executor.execute_str(
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//!         "Weekly",
//!         "Pace of change",
//!     )?;
//!
//!     print!("{}", ResultTable::from_result(&result));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod query;
pub mod report;
pub mod series;
pub mod source;

// Re-export top-level types for convenience
pub use series::{Granularity, Measurements, Metric, Period, RawRow, Record};

pub use query::{
    compute_metric, MetricEntry, MetricExecutor, MetricRequest, MetricResult, QueryError,
    QueryResult, ResolvedWindow,
};

pub use report::{describe, ResultTable, SummaryStats};

pub use source::{
    CsvRowSource, CsvSink, JsonSink, MemorySink, ResultSink, RowSource, SnapshotSource,
    SourceError, TextSink,
};

pub use config::{Config, ConfigError, LoggingConfig, SourceKind};
