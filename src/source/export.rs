//! Result writers
//!
//! Every output format goes through [`ResultSink`]: CSV, the aligned text
//! table and a JSON report. Each writes to any `Write`.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::*;

/// Create (or truncate) an output file, creating parent directories as needed
pub fn create_file(path: &Path) -> Result<File, SourceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Writes result tables as CSV, header row first
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, SourceError> {
        self.writer
            .into_inner()
            .map_err(|e| SourceError::Io(e.into_error()))
    }
}

impl CsvSink<File> {
    /// Create (or truncate) a CSV file
    pub fn create(path: &Path) -> Result<Self, SourceError> {
        Ok(Self::new(create_file(path)?))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), SourceError> {
        for row in table.all_rows() {
            self.writer.write_record(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the aligned text table, followed by optional footer lines
pub struct TextSink<W: Write> {
    writer: W,
    footer: Vec<String>,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            footer: Vec::new(),
        }
    }

    /// Add a line printed below the table
    pub fn with_footer(mut self, line: impl Into<String>) -> Self {
        self.footer.push(line.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for TextSink<W> {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), SourceError> {
        write!(self.writer, "{}", table)?;
        if !self.footer.is_empty() {
            writeln!(self.writer)?;
            for line in &self.footer {
                writeln!(self.writer, "{}", line)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a pretty-printed JSON report: the table under `"table"` plus any
/// extra top-level fields
pub struct JsonSink<W: Write> {
    writer: W,
    fields: Map<String, Value>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fields: Map::new(),
        }
    }

    /// Add a top-level field to the report
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), SourceError> {
        let mut report = self.fields.clone();
        report.insert("table".to_string(), serde_json::to_value(table)?);

        serde_json::to_writer_pretty(&mut self.writer, &report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every written table in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<ResultTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written table
    pub fn last(&self) -> Option<&ResultTable> {
        self.tables.last()
    }
}

impl ResultSink for MemorySink {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), SourceError> {
        self.tables.push(table.clone());
        Ok(())
    }
}
