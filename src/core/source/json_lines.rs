use serde_json::{Map, Value};

use super::{DataFormat, RecordBatch};
use crate::error::Error;
use crate::record::{Location, Record};

/// Parse JSON Lines: one object per non-blank line.
///
/// A line that does not decode is recorded in `invalid_lines` and skipped;
/// it never fails the batch.
pub(super) fn parse(data: &[u8]) -> RecordBatch {
    let mut batch = RecordBatch::new(DataFormat::Jsonl, Vec::new());

    for (index, line) in data.split(|&b| b == b'\n').enumerate() {
        let line_number = index + 1;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_slice::<Option<Map<String, Value>>>(line) {
            Ok(object) => batch.records.push(Record::from_object(
                Location::Line(line_number),
                object.unwrap_or_default(),
            )),
            Err(e) => batch
                .invalid_lines
                .push(Error::input_invalid_line(line_number, e.to_string())),
        }
    }

    batch
}
