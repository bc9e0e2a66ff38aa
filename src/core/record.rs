//! Normalized input records.
//!
//! Every input format ends up as the same shape: a flat map of field name to
//! string value, plus where in the input file the record came from.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a record in its source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// CSV data row (the header row is not counted).
    Row(usize),
    /// JSON Lines line number, counting blank lines.
    Line(usize),
    /// Element index inside a JSON array.
    Index(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Row(n) => write!(f, "row {}", n),
            Location::Line(n) => write!(f, "line {}", n),
            Location::Index(n) => write!(f, "object {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    location: Location,
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            fields: BTreeMap::new(),
        }
    }

    /// Build a record from CSV headers and one row. Short rows leave the
    /// trailing fields absent; extra cells are dropped.
    pub fn from_row<'a>(
        location: Location,
        headers: impl IntoIterator<Item = &'a str>,
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let fields = headers
            .into_iter()
            .zip(cells)
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        Self { location, fields }
    }

    /// Build a record from a decoded JSON object, coercing every value to a string.
    pub fn from_object(location: Location, object: Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .map(|(key, value)| {
                let value = coerce_value(&value);
                (key, value)
            })
            .collect();
        Self { location, fields }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The record as a JSON object, for diagnostics.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Coerce a JSON value to the string a template substitutes for it.
///
/// Strings pass through, null becomes empty, booleans become `true`/`false`,
/// numbers use [`format_general`], and arrays/objects are re-serialized compactly.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Numbers are handled as 64-bit floats, so integers past 2^53 lose precision.
fn format_number(number: &Number) -> String {
    match number.as_f64() {
        Some(f) => format_general(f),
        None => number.to_string(),
    }
}

/// Shortest round-trip formatting in "general" style.
///
/// Decimal notation is used while the decimal exponent is within `[-4, 6)`;
/// outside that range the value is written as `d.ddde±XX`. So `95.5` stays
/// `95.5` but `1234567` becomes `1.234567e+06`.
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return value.to_string(),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exp) => exp,
        Err(_) => return value.to_string(),
    };

    if (-4..6).contains(&exponent) {
        return value.to_string();
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
}
