use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::{Location, Record};

/// Parse a file holding one JSON array of objects.
///
/// Only the first JSON value is decoded; anything after it is ignored.
/// `null` (top level or as an element) decodes to nothing / an empty record.
pub(super) fn parse(data: &[u8]) -> Result<Vec<Record>> {
    let mut deserializer = serde_json::Deserializer::from_slice(data);
    let objects: Option<Vec<Option<Map<String, Value>>>> =
        Deserialize::deserialize(&mut deserializer)
            .map_err(|e| Error::input_invalid_json(e.to_string()))?;

    Ok(objects
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, object)| {
            Record::from_object(Location::Index(index + 1), object.unwrap_or_default())
        })
        .collect())
}
