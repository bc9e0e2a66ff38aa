//! Record sources.
//!
//! Turns a data file into the flat records templates render against. The
//! format is picked from the file extension:
//! - `.json` - one JSON array of objects
//! - `.jsonl` - one JSON object per line
//! - anything else, `.csv` included - CSV with a header row
//!
//! The whole file is read before any record is handed out so the run knows
//! its total up front.

mod csv_file;
mod json_array;
mod json_lines;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
    Jsonl,
}

impl DataFormat {
    /// Pick the format from the file extension, case-insensitively.
    /// Unknown or missing extensions fall back to CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = paths::extension(path).map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some(".json") => DataFormat::Json,
            Some(".jsonl") => DataFormat::Jsonl,
            _ => DataFormat::Csv,
        }
    }

    /// Parse a whole file's contents into records.
    pub fn parse(&self, data: &[u8]) -> Result<RecordBatch> {
        match self {
            DataFormat::Csv => csv_file::parse(data).map(|records| RecordBatch::new(*self, records)),
            DataFormat::Json => {
                json_array::parse(data).map(|records| RecordBatch::new(*self, records))
            }
            DataFormat::Jsonl => Ok(json_lines::parse(data)),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
            DataFormat::Jsonl => "jsonl",
        };
        f.write_str(name)
    }
}

/// Every record parsed from one file, plus the lines that had to be dropped.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub format: DataFormat,
    pub records: Vec<Record>,
    /// Recoverable per-line failures (JSON Lines only).
    pub invalid_lines: Vec<Error>,
}

impl RecordBatch {
    fn new(format: DataFormat, records: Vec<Record>) -> Self {
        Self {
            format,
            records,
            invalid_lines: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read `path` fully and parse it with the format its extension selects.
pub fn load(path: &Path) -> Result<RecordBatch> {
    let data =
        fs::read(path).map_err(|e| Error::input_open(path.display().to_string(), e.to_string()))?;

    let format = DataFormat::from_path(path);
    tracing::debug!(path = %path.display(), %format, bytes = data.len(), "parsing data file");
    format.parse(&data)
}
