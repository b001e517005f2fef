//! CSV Row Source
//!
//! Reads row-store exports laid out as `id, date, gray zone, liberated km²,
//! liberated %, ..., occupied km², occupied %`.

use std::io::Read;
use std::path::{Path, PathBuf};

use super::*;

enum Input {
    Path(PathBuf),
    Text(String),
}

/// Row source over a CSV file or string
pub struct CsvRowSource {
    input: Input,
    /// Whether the first line is a header row
    has_header: bool,
}

impl CsvRowSource {
    /// Read rows from a file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Input::Path(path.into()),
            has_header: true,
        }
    }

    /// Read rows from an in-memory string (useful for testing)
    pub fn from_text(data: impl Into<String>) -> Self {
        Self {
            input: Input::Text(data.into()),
            has_header: true,
        }
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    fn read_from<R: Read>(&self, reader: R) -> Result<Vec<RawRow>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            match result {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
                Err(e) => {
                    let line = if self.has_header { line_num + 2 } else { line_num + 1 };
                    tracing::warn!(line, error = %e, "skipping unreadable CSV line");
                }
            }
        }
        Ok(rows)
    }

    fn path(&self) -> Option<&Path> {
        match &self.input {
            Input::Path(p) => Some(p.as_path()),
            Input::Text(_) => None,
        }
    }
}

impl RowSource for CsvRowSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError> {
        let rows = match &self.input {
            Input::Path(path) => self.read_from(std::fs::File::open(path)?)?,
            Input::Text(text) => self.read_from(text.as_bytes())?,
        };
        tracing::debug!(path = ?self.path(), rows = rows.len(), "read CSV rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::dedup_rows;
    use std::io::Write;

    const SAMPLE: &str = "\
ID,Date,Gray zone,Liberated km2,Liberated %,Occupied before km2,Occupied before %,Occupied after km2,Occupied after %,Occupied km2,Occupied %
12,01/02/2024 21:00:00,410,0,0,42495.4112,7.04,65500,10.85,107995.4112,17.89
11,01/02/2024 09:00:00,405,0,0,42495.4112,7.04,65450,10.84,107945.4112,17.88
10,01/01/2024 21:00:00,400,0,0,42495.4112,7.04,65400,10.84,107895.4112,17.88
,,,,,,,,,,
";

    #[test]
    fn test_read_rows_from_text() {
        let rows = CsvRowSource::from_text(SAMPLE).read_rows().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], "12");
        assert_eq!(rows[0].len(), 11);

        let series = dedup_rows(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].id, "12");
        assert_eq!(series[1].occupied_km2(), 107995.4112);
    }

    #[test]
    fn test_without_header() {
        let data = "1,2024-01-01,0,0,0,0,0,0,0,5,1\n2,2024-01-02,0,0,0,0,0,0,0,6,1\n";
        let rows = CsvRowSource::from_text(data).with_header(false).read_rows().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_read_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut source = CsvRowSource::from_path(file.path());
        let rows = source.read_rows().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(source.name(), "csv");
    }

    #[test]
    fn test_missing_file() {
        let err = CsvRowSource::from_path("/nonexistent/rows.csv")
            .read_rows()
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
