//! Field alias table for extraction drops.
//!
//! Historical data drops spell field names in more than one way. Instead of
//! checking each spelling inline, every record is read through [`FIELD_ALIASES`]:
//! the first alias present on the object supplies the field.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{HealthError, HealthResult};
use crate::types::{Partition, RawRecord, RawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Metric,
    Timestamp,
    Value,
    Unit,
    SourceDisplay,
    OriginalName,
}

/// `source_display` and the `original_name`/`OriginalName` spellings stay two
/// separate fields on purpose; [`RawRecord::display_label`] merges them with
/// `source_display` taking precedence.
pub const FIELD_ALIASES: &[(RecordField, &[&str])] = &[
    (RecordField::Metric, &["metric", "Metric"]),
    (RecordField::Timestamp, &["timestamp", "Timestamp"]),
    (RecordField::Value, &["value", "Value"]),
    (RecordField::Unit, &["unit", "Unit"]),
    (RecordField::SourceDisplay, &["source_display"]),
    (RecordField::OriginalName, &["original_name", "OriginalName"]),
];

fn aliases_for(field: RecordField) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

fn lookup<'a>(object: &'a Map<String, Value>, field: RecordField) -> Option<&'a Value> {
    aliases_for(field)
        .iter()
        .find_map(|alias| object.get(*alias).filter(|value| !value.is_null()))
}

fn text_field(object: &Map<String, Value>, field: RecordField) -> Option<String> {
    match lookup(object, field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_field(object: &Map<String, Value>) -> Option<RawValue> {
    match lookup(object, RecordField::Value)? {
        Value::Number(number) => number.as_f64().map(RawValue::Number),
        Value::String(text) => Some(RawValue::Text(text.clone())),
        _ => None,
    }
}

/// Read one JSON element into a [`RawRecord`]. Non-object elements produce an
/// empty record, which indexing and querying both ignore.
pub fn parse_record(element: &Value) -> RawRecord {
    let Some(object) = element.as_object() else {
        trace!("non-object element in data document: {}", element);
        return RawRecord::default();
    };

    RawRecord {
        metric: text_field(object, RecordField::Metric),
        timestamp: text_field(object, RecordField::Timestamp),
        value: value_field(object),
        unit: text_field(object, RecordField::Unit),
        source_display: text_field(object, RecordField::SourceDisplay),
        original_name: text_field(object, RecordField::OriginalName),
    }
}

/// Parse a whole partition document. The document itself must be a JSON array.
pub fn parse_document(partition: Partition, content: &str) -> HealthResult<Vec<RawRecord>> {
    let document: Value =
        serde_json::from_str(content).map_err(|error| HealthError::Json(error).in_partition(partition))?;

    match document {
        Value::Array(elements) => Ok(elements.iter().map(parse_record).collect()),
        other => Err(HealthError::InvalidDocument {
            partition,
            reason: format!("expected a JSON array, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
