//! Per-run execution log.
//!
//! Each real run writes one file into the log directory, named
//! `xrun-<data file base name>-<YYYYMMDD-HHMMSS>.logs`. It receives the same
//! progress lines and child output as the console.

use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;

const FILE_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

/// File name for a run over `data_file` started at `at`.
pub fn log_file_name(data_file: &Path, at: DateTime<Local>) -> String {
    format!(
        "xrun-{}-{}.logs",
        paths::base_name(data_file),
        at.format(FILE_TIMESTAMP)
    )
}

#[derive(Debug)]
pub struct ExecutionLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ExecutionLog {
    /// Create the log for a run over `data_file` in `dir`, truncating any
    /// file of the same name.
    pub fn create(data_file: &Path, dir: &Path) -> Result<Self> {
        let path = dir.join(log_file_name(data_file, Local::now()));
        let file = File::create(&path)
            .map_err(|e| Error::log_create(path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), "created execution log");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered output and return where the log was written.
    pub fn close(mut self) -> Result<PathBuf> {
        self.writer.flush().map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("flush {}", self.path.display())),
            )
        })?;
        Ok(self.path)
    }
}

impl Write for ExecutionLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::TimeZone;

    #[test]
    fn name_embeds_base_name_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            log_file_name(Path::new("data/users.csv"), at),
            "xrun-users-20240309-070501.logs"
        );
    }

    #[test]
    fn name_strips_only_last_extension() {
        let at = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            log_file_name(Path::new("export.2024.jsonl"), at),
            "xrun-export.2024-20240101-000000.logs"
        );
    }

    #[test]
    fn name_ignores_data_file_directory() {
        let at = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let name = log_file_name(Path::new("../elsewhere/rows.csv"), at);
        assert_eq!(name, "xrun-rows-20240101-000000.logs");
        assert!(!name.contains('/'));
    }

    #[test]
    fn create_write_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ExecutionLog::create(Path::new("rows.csv"), dir.path()).unwrap();
        writeln!(log, "hello").unwrap();
        let path = log.close().unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("xrun-rows-"));
        assert!(name.ends_with(".logs"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            ExecutionLog::create(Path::new("rows.csv"), &dir.path().join("missing")).unwrap_err();
        assert_eq!(err.code, ErrorCode::LogCreateFailed);
        assert!(!err.hints.is_empty());
    }
}
