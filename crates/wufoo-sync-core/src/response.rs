//! Normalization of remote response bodies
//!
//! The JSON API answers `fields` with `{"Fields": [...]}` and `entries` with
//! `{"Success": 1, "EntryId": n}` or `{"Success": 0, "FieldErrors": [...]}`.
//! Responses that went through an XML-to-array conversion carry extra
//! wrappers (`PostResponse`, `FieldErrors.FieldError`) and collapse
//! single-element lists. Every shape is reduced to the same types here.

use serde::Serialize;
use serde_json::Value;

use crate::types::{is_truthy, unwrap_sequence, FieldError, FormFieldDescriptor};
use crate::{Error, Result};

const FIND_FIELDS: &str = "findFields";
const SAVE_ENTRY: &str = "saveEntry";

/// Normalized answer to an entry submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryResponse {
    /// The entry was stored remotely
    Saved {
        entry_id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        entry_link: Option<String>,
    },
    /// The service refused the entry
    Rejected(Rejection),
}

impl EntryResponse {
    pub fn is_saved(&self) -> bool {
        matches!(self, EntryResponse::Saved { .. })
    }
}

/// Details of a refused entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rejection {
    /// Form-level error text, when the service sends one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    /// Per-field errors, always as a list
    pub field_errors: Vec<FieldError>,
}

/// Read the descriptors out of a `fields` response
pub fn parse_fields_response(body: Value) -> Result<Vec<FormFieldDescriptor>> {
    let fields = match body {
        Value::Object(mut obj) => match obj.remove("Fields") {
            Some(fields) => fields,
            None => {
                return Err(Error::response(FIND_FIELDS, "response has no 'Fields' member"));
            }
        },
        list @ Value::Array(_) => list,
        other => {
            return Err(Error::response(
                FIND_FIELDS,
                format!("expected an object or array, got {}", kind_of(&other)),
            ));
        }
    };

    unwrap_sequence(fields, "Field")
        .map_err(|e| Error::response(FIND_FIELDS, format!("malformed field descriptor: {}", e)))
}

/// Read the outcome out of an `entries` response
///
/// A bare number (or numeric string) is an entry id. Anything else must be an
/// object, optionally wrapped in `PostResponse`.
pub fn parse_entry_response(body: Value) -> Result<EntryResponse> {
    let body = match body {
        Value::Object(mut obj) if obj.contains_key("PostResponse") => {
            obj.remove("PostResponse").unwrap_or(Value::Null)
        }
        other => other,
    };

    if let Some(entry_id) = entry_id_of(&body) {
        return Ok(EntryResponse::Saved {
            entry_id,
            entry_link: None,
        });
    }

    let mut obj = match body {
        Value::Object(obj) => obj,
        other => {
            return Err(Error::response(
                SAVE_ENTRY,
                format!("expected an entry id or an object, got {}", kind_of(&other)),
            ));
        }
    };

    let success = obj.get("Success").map(is_truthy);
    let has_field_errors = obj.contains_key("FieldErrors");

    if success == Some(true) {
        let entry_id = obj
            .get("EntryId")
            .and_then(entry_id_of)
            .ok_or_else(|| Error::response(SAVE_ENTRY, "success reported without an 'EntryId'"))?;
        let entry_link = obj
            .get("EntryLink")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Ok(EntryResponse::Saved {
            entry_id,
            entry_link,
        });
    }

    if success.is_none() && !has_field_errors {
        return Err(Error::response(
            SAVE_ENTRY,
            "response has neither 'Success' nor 'FieldErrors'",
        ));
    }

    let error_text = obj
        .get("ErrorText")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let field_errors = obj.remove("FieldErrors").unwrap_or(Value::Null);
    let field_errors = unwrap_sequence(field_errors, "FieldError")
        .map_err(|e| Error::response(SAVE_ENTRY, format!("malformed field error: {}", e)))?;

    Ok(EntryResponse::Rejected(Rejection {
        error_text,
        field_errors,
    }))
}

fn entry_id_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
