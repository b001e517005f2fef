//! Query error types
//!
//! Defines all error conditions that can occur while resolving a window and
//! computing a metric.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No usable rows at all
    #[error("No raw data available")]
    EmptyInput,

    /// Rows exist but none fall inside the resolved window
    #[error("No data in selected date range")]
    EmptyRange,

    /// Metric name is not one of the supported metrics
    #[error("Unknown metric: {0}")]
    UnsupportedMetric(String),

    /// Granularity label is not one of the supported granularities
    #[error("Unknown time period: {0}")]
    UnsupportedGranularity(String),

    /// A date could not be parsed while formatting output
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
