use csv::{ReaderBuilder, StringRecord};

use crate::error::{Error, Result};
use crate::record::{Location, Record};

/// Parse CSV with a header row.
///
/// Rows may be shorter or longer than the header. Any structural error
/// (bad quoting, bad UTF-8, unreadable stream) fails the whole file.
pub(super) fn parse(data: &[u8]) -> Result<Vec<Record>> {
    check_quoting(data)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = reader.records();

    let headers: StringRecord = match rows.next() {
        Some(row) => row.map_err(|e| Error::input_invalid_csv(format!("header row: {}", e)))?,
        None => return Err(Error::input_invalid_csv("missing header row")),
    };

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let row = row.map_err(|e| Error::input_invalid_csv(e.to_string()))?;
        records.push(Record::from_row(
            Location::Row(index + 1),
            headers.iter(),
            row.iter(),
        ));
    }

    Ok(records)
}

fn quote_error(line: usize, problem: &str) -> Error {
    Error::input_invalid_csv(format!("line {}: {}", line, problem))
}

/// Reject quoting the `csv` reader would otherwise recover from.
///
/// A field is quoted only when `"` is its first byte. Inside it `""` is a
/// literal quote and the closing quote must be followed by a delimiter, a
/// line ending or the end of input. Unquoted fields may not contain `"`.
fn check_quoting(data: &[u8]) -> Result<()> {
    let mut line = 1;
    let mut index = 0;
    let mut field_start = true;

    while index < data.len() {
        let byte = data[index];

        if field_start && byte == b'"' {
            let opened_on = line;
            index += 1;
            loop {
                match data.get(index) {
                    None => return Err(quote_error(opened_on, "unterminated quoted field")),
                    Some(b'"') => match data.get(index + 1) {
                        Some(b'"') => index += 2,
                        None | Some(b',') | Some(b'\n') | Some(b'\r') => {
                            index += 1;
                            break;
                        }
                        Some(_) => return Err(quote_error(line, "text after closing quote")),
                    },
                    Some(b'\n') => {
                        line += 1;
                        index += 1;
                    }
                    Some(_) => index += 1,
                }
            }
            field_start = false;
            continue;
        }

        match byte {
            b',' => field_start = true,
            b'\n' => {
                field_start = true;
                line += 1;
            }
            b'"' => return Err(quote_error(line, "bare quote in unquoted field")),
            _ => field_start = false,
        }
        index += 1;
    }

    Ok(())
}
