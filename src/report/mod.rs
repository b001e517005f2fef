//! Result rendering
//!
//! - **format**: Date labels, headers and value formatting
//! - **table**: The `(Date, value)` table handed to result writers
//! - **summary**: Headline statistics and chart descriptions

pub mod format;
pub mod summary;
pub mod table;

pub use format::{
    display_date, format_date_lenient, format_value, label_date, metric_header, period_phrase,
    DATE_COLUMN, INVALID_DATE,
};
pub use summary::{describe, OccupationExtreme, SummaryStats, UKRAINE_AREA_KM2};
pub use table::ResultTable;
