//! Core types shared by the reconciler, the remote client and the save flow
//!
//! Field descriptors and field errors deserialize straight from the Wufoo
//! wire format. Wufoo (and the XML-to-array conversions older clients run
//! its responses through) is loose about one-vs-many: a list with a single
//! element may arrive unwrapped, and ids may be strings or numbers. The
//! helpers at the bottom of this module absorb those variations.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Local record values keyed by local field name, in record order
pub type RecordData = IndexMap<String, Value>;

/// Values keyed by remote field id, ready to submit as an entry
pub type OutgoingPayload = IndexMap<String, Value>;

/// Metadata for one field of a remote form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldDescriptor {
    /// Human-readable field title, the primary matching key
    #[serde(rename = "Title")]
    pub title: String,

    /// Remote field id (e.g. `Field5`)
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,

    /// Parts of a compound field (first/last name, address lines, ...)
    #[serde(
        rename = "SubFields",
        default,
        deserialize_with = "deserialize_subfields",
        skip_serializing_if = "Option::is_none"
    )]
    pub subfields: Option<Vec<Subfield>>,

    /// Wufoo field type (`text`, `shortname`, `checkbox`, ...)
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// Whether the form requires a value for this field
    #[serde(rename = "IsRequired", default, deserialize_with = "deserialize_flag")]
    pub is_required: bool,
}

impl FormFieldDescriptor {
    /// A plain field without subfields
    pub fn new(title: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
            subfields: None,
            field_type: None,
            is_required: false,
        }
    }

    /// A compound field made of the given subfields
    pub fn with_subfields(title: impl Into<String>, subfields: Vec<Subfield>) -> Self {
        Self {
            subfields: Some(subfields),
            ..Self::new(title, String::new())
        }
    }
}

/// One part of a compound remote field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    #[serde(rename = "Label")]
    pub label: String,

    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,
}

impl Subfield {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}

/// A per-field validation error reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Remote id of the rejected field
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,

    /// Error text supplied by the service
    #[serde(rename = "ErrorText", default)]
    pub message: String,
}

impl FieldError {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Ordered map from remote field title to remote field id
///
/// Later inserts of an existing title overwrite the earlier id; this mirrors
/// how the remote form is read and is not treated as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleMap(IndexMap<String, String>);

impl TitleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a title, returning the id it replaced, if any
    pub fn insert(&mut self, title: impl Into<String>, id: impl Into<String>) -> Option<String> {
        self.0.insert(title.into(), id.into())
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.0.get(title).map(String::as_str)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.0.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(title, id)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, id)| (t.as_str(), id.as_str()))
    }

    /// Build the reverse `id → title` map; on duplicate ids the later title wins
    pub fn invert(&self) -> IndexMap<&str, &str> {
        self.iter().map(|(title, id)| (id, title)).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TitleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TitleMap::new();
        for (title, id) in iter {
            map.insert(title, id);
        }
        map
    }
}

/// Render a record value the way it is submitted in a form body
///
/// Booleans follow the form convention of `"1"` for checked and an empty
/// string for unchecked. Whole-number floats drop their fraction (`1.0` is
/// `"1"`).
pub fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => number_value(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(form_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn number_value(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Read a remote list that may arrive wrapped, unwrapped or as a bare element
///
/// Accepts `[a, b]`, a single `a`, `{"<wrapper>": [a, b]}` and
/// `{"<wrapper>": a}`. `null` reads as an empty list.
pub(crate) fn unwrap_sequence<T: DeserializeOwned>(value: Value, wrapper: &str) -> serde_json::Result<Vec<T>> {
    let value = match value {
        Value::Object(mut obj) if obj.contains_key(wrapper) => {
            obj.remove(wrapper).unwrap_or(Value::Null)
        }
        other => other,
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

/// Loose truthiness for remote flags (`1`, `"1"`, `true`)
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    }
}

fn deserialize_subfields<'de, D>(deserializer: D) -> Result<Option<Vec<Subfield>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => unwrap_sequence(value, "Subfield")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|v| is_truthy(&v))
        .unwrap_or(false))
}
