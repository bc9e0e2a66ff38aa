//! Command template compilation and rendering.
//!
//! Templates are plain text with `{{.field}}` placeholders. A template is
//! compiled once per run and rendered once per record. Placeholders naming a
//! field the record doesn't have render as the empty string.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::record::Record;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A compiled command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, failing on any malformed placeholder.
    pub fn compile(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let action_start = offset + start;
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| Error::template_invalid(action_start, "unclosed action"))?;

            let field = parse_action(&after_open[..end], action_start)?;
            segments.push(Segment::Field(field));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Substitute the record's fields into the template.
    ///
    /// Fails only when a substituted value can't be part of a command line
    /// (it contains a NUL byte).
    pub fn render(&self, record: &Record) -> Result<String> {
        let mut rendered = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Field(name) => {
                    let value = record.get(name).unwrap_or_default();
                    if value.contains('\0') {
                        return Err(Error::template_render(
                            record.location().to_string(),
                            name.as_str(),
                            "contains a NUL byte",
                            record.to_json(),
                        ));
                    }
                    rendered.push_str(value);
                }
            }
        }

        Ok(rendered)
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }
}

/// Validate the inside of `{{ ... }}` and return the field name.
fn parse_action(action: &str, position: usize) -> Result<String> {
    let action = action.trim();
    if action.is_empty() {
        return Err(Error::template_invalid(position, "missing value for action"));
    }

    let Some(name) = action.strip_prefix('.') else {
        return Err(Error::template_invalid(
            position,
            format!("expected a field reference like .name, found '{}'", action),
        ));
    };

    if name.is_empty() {
        return Err(Error::template_invalid(
            position,
            "a bare '.' is not supported, name a field",
        ));
    }

    if !FIELD_NAME_PATTERN.is_match(name) {
        return Err(Error::template_invalid(
            position,
            format!("invalid field name '{}'", name),
        ));
    }

    Ok(name.to_string())
}
