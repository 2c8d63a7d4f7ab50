//! Request body builders for Tigris document and collection calls.
//!
//! Each builder returns the exact JSON shape the remote API expects. The `demo_*` helpers carry
//! the quickstart literals that the demo payload mode sends verbatim.

use serde_json::{Map, Number, Value, json};
use thiserror::Error;

/// Field whose values are sent as JSON numbers by update operations.
pub const NUMERIC_FIELD: &str = "balance";

/// A path parameter could not be converted to the type the remote API expects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoercionError {
    /// Document ids must be integers.
    #[error("document id must be an integer, got '{0}'")]
    InvalidId(String),
    /// Numeric fields must hold a finite number.
    #[error("field '{field}' expects a number, got '{value}'")]
    InvalidNumber {
        /// Field being updated.
        field: String,
        /// Raw value received.
        value: String,
    },
    /// A required query parameter was absent.
    #[error("missing required query parameter '{0}'")]
    MissingParameter(&'static str),
}

/// Parse a document id path segment.
pub fn parse_document_id(raw: &str) -> Result<i64, CoercionError> {
    raw.trim()
        .parse()
        .map_err(|_| CoercionError::InvalidId(raw.to_string()))
}

/// Convert a raw value into the JSON type stored for `field`.
///
/// `balance` becomes a float; everything else stays a string.
pub fn coerce_field_value(field: &str, raw: &str) -> Result<Value, CoercionError> {
    if field != NUMERIC_FIELD {
        return Ok(Value::String(raw.to_string()));
    }

    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| CoercionError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Fixed collection schema: auto-generated int32 `id` primary key, indexed `name` and `balance`.
pub fn collection_schema(title: &str) -> Value {
    json!({
        "schema": {
            "title": title,
            "properties": {
                "balance": {
                    "type": "number",
                    "searchIndex": true
                },
                "id": {
                    "type": "integer",
                    "format": "int32",
                    "autoGenerate": true
                },
                "name": {
                    "type": "string",
                    "searchIndex": true
                }
            },
            "primary key": ["id"]
        }
    })
}

/// Insert body for an explicit document list.
pub fn insert_body(documents: Vec<Value>) -> Value {
    json!({ "documents": documents })
}

/// Equality filter on a single field; the value is passed through as a string.
pub fn read_body(field: &str, value: &str) -> Value {
    let mut filter = Map::new();
    filter.insert(field.to_string(), Value::String(value.to_string()));
    json!({ "filter": filter })
}

/// `$set` a single field on the document with the given id.
pub fn update_body(id: i64, field: &str, value: Value) -> Value {
    let mut set = Map::new();
    set.insert(field.to_string(), value);
    json!({
        "fields": { "$set": set },
        "filter": { "id": id }
    })
}

/// Full-text search body. `filter` is omitted when `None`.
pub fn search_body(q: &str, search_fields: &[&str], filter: Option<Value>) -> Value {
    let mut body = json!({
        "q": q,
        "search_fields": search_fields,
    });
    if let (Some(filter), Some(map)) = (filter, body.as_object_mut()) {
        map.insert("filter".into(), filter);
    }
    body
}

/// Delete every document matching `filter`.
pub fn delete_body(filter: Value) -> Value {
    json!({ "filter": filter })
}

/// Filter matching a single document id.
pub fn id_filter(id: i64) -> Value {
    json!({ "id": id })
}

/// The four quickstart documents.
pub fn demo_documents() -> Vec<Value> {
    vec![
        json!({ "name": "Jania McGrory", "balance": 6045.7 }),
        json!({ "name": "Bunny Instone", "balance": 2948.87 }),
        json!({ "name": "Elon Musk", "balance": 245025.65 }),
        json!({ "name": "Elvis Presley", "balance": 0 }),
    ]
}

/// Quickstart search: "bunny" in `name`, balance above 500.
pub fn demo_search_body() -> Value {
    search_body("bunny", &["name"], Some(json!({ "balance": { "$gt": 500 } })))
}

/// Quickstart delete filter. Id 0 never exists; id 4 is the last demo row.
pub fn demo_delete_filter() -> Value {
    json!({ "$or": [{ "id": 0 }, { "id": 4 }] })
}
