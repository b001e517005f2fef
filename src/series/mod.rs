//! Frontline Series
//!
//! The measurement series every request starts from:
//!
//! - **types**: Core data structures (Record, Measurements, Granularity, Metric)
//! - **parse**: Positional raw rows into records
//! - **dedup**: One record per calendar day
//!
//! # Read Path
//!
//! ```text
//!   RawRow → parse → Record → dedup (latest per day) → ascending series
//! ```

pub mod dedup;
pub mod parse;
pub mod types;

pub use dedup::{dedup_daily, dedup_rows};
pub use parse::{parse_row, parse_rows, parse_timestamp, NATIVE_TIMESTAMP_FORMAT};
pub use types::{
    Granularity, Measurements, Metric, Period, RawRow, Record, INVASION_EPOCH, RAW_ROW_WIDTH,
};
