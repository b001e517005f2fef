//! Result tables
//!
//! The two-column `(Date, value)` table handed to result writers. The header
//! row always stays first and data rows are ordered newest first.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt;

use super::format::{format_value, label_date, DATE_COLUMN};
use crate::query::MetricResult;

/// A rendered result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub header: [String; 2],
    pub rows: Vec<[String; 2]>,
}

impl ResultTable {
    /// Render a metric result, newest label first
    pub fn from_result(result: &MetricResult) -> Self {
        let mut rows: Vec<(Option<NaiveDate>, [String; 2])> = result
            .entries
            .iter()
            .map(|entry| {
                let date = match label_date(&entry.label) {
                    Ok(date) => Some(date),
                    Err(e) => {
                        tracing::warn!(error = %e, "row label has no readable date, placing last");
                        None
                    }
                };
                (date, [entry.label.clone(), format_value(entry.value)])
            })
            .collect();

        // Stable, so equal dates keep metric order; `None` sorts after every date
        rows.sort_by_key(|(date, _)| (date.is_none(), Reverse(*date)));

        Self {
            header: [DATE_COLUMN.to_string(), result.header()],
            rows: rows.into_iter().map(|(_, row)| row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header followed by data rows
    pub fn all_rows(&self) -> impl Iterator<Item = &[String; 2]> {
        std::iter::once(&self.header).chain(self.rows.iter())
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .all_rows()
            .map(|row| row[0].chars().count())
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<label_width$} | {}", self.header[0], self.header[1])?;
        writeln!(f, "{}", "-".repeat(label_width + 3 + self.header[1].chars().count()))?;
        for row in &self.rows {
            writeln!(f, "{:<label_width$} | {:>10}", row[0], row[1])?;
        }
        Ok(())
    }
}
