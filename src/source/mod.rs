//! Row Sources and Result Sinks
//!
//! The pipeline reads raw rows from a row store and hands rendered tables to
//! a result writer. This module defines both seams and ships:
//! - CSV row files in the row-store layout
//! - JSON history snapshots from the upstream feed
//! - CSV, text, JSON and in-memory result writers

mod csv_import;
mod export;
mod snapshot;

pub use export::{create_file, CsvSink, JsonSink, MemorySink, TextSink};
pub use csv_import::CsvRowSource;
pub use snapshot::{
    AreaEntry, HistorySnapshot, SnapshotSource, OCCUPIED_BEFORE_KM2, OCCUPIED_BEFORE_PERCENT,
};

use crate::report::ResultTable;
use crate::series::RawRow;

/// Supplies raw rows in row-store layout
pub trait RowSource {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Read every row. Order is not significant.
    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError>;
}

/// Receives rendered result tables
pub trait ResultSink {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), SourceError>;
}

/// Errors that can occur while reading rows or writing results
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}
