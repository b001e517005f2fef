//! Frontline Query Engine
//!
//! Derives summary metrics from the deduplicated series:
//!
//! - **window**: Resolve and align the requested date window
//! - **bucket**: Group records into day/week/month buckets
//! - **metrics**: Pace of change, area change, average pace, top changes
//! - **executor**: Run a request end to end
//!
//! # Examples
//!
//! ```rust,ignore
//! use frontline::query::{MetricExecutor, MetricRequest};
//! use frontline::series::{Granularity, Metric};
//!
//! let executor = MetricExecutor::from_rows(&rows);
//!
//! let request = MetricRequest::new(from, to, Granularity::Weekly, Metric::PaceOfChange);
//! let result = executor.execute(&request)?;
//!
//! // Or straight from selector labels
//! let result = executor.execute_str(from, to, "Monthly", "Area change")?;
//! ```

mod bucket;
mod error;
mod executor;
mod metrics;
mod window;

pub use bucket::{bucketize, Bucket};
pub use error::{QueryError, QueryResult};
pub use executor::{compute_metric, MetricExecutor, MetricRequest, MetricResult};
pub use metrics::{compute_entries, time_span, MetricEntry, TOP_CHANGES_LIMIT};
pub use window::{
    month_end, month_start, resolve_window, week_end, week_start, ResolvedWindow, END_OF_DAY,
};
