//! Run results.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::Error;

/// Counters and recoverable problems from one run.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub records: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub invalid_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One record (or input line) that did not run cleanly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub location: String,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(location: impl Into<String>, error: &Error) -> Self {
        Self {
            location: location.into(),
            code: error.code.as_str().to_string(),
            message: error.message.clone(),
        }
    }
}

impl RunSummary {
    pub fn new(records: usize) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn record_succeeded(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failed(&mut self, location: impl Into<String>, error: &Error) {
        self.failed += 1;
        self.diagnostics.push(Diagnostic::new(location, error));
    }

    pub fn record_skipped(&mut self, location: impl Into<String>, error: &Error) {
        self.skipped += 1;
        self.diagnostics.push(Diagnostic::new(location, error));
    }

    pub fn record_invalid_line(&mut self, error: &Error) {
        self.invalid_lines += 1;
        let location = match error.details.get("line").and_then(|line| line.as_u64()) {
            Some(line) => format!("line {}", line),
            None => "input".to_string(),
        };
        self.diagnostics.push(Diagnostic::new(location, error));
    }

    /// True when every record ran (or was printed) without problems.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
