//! Row abstraction shared by the filter state and the table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record that can be shown in a [`DataTable`](crate::DataTable).
///
/// Typed rows implement this with a `match` over their own field names, so
/// column accessors stay checked against the struct. [`Record`] covers the
/// case where rows have no fixed shape.
pub trait TableRow {
    /// Unique identifier of the row.
    fn row_id(&self) -> String;

    /// Value of a named field, or `None` if the row has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Every named field of the row.
    fn fields(&self) -> Vec<(String, Value)>;
}

/// Dynamic key/value row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record with only an `id` field.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::String(id.into()));
        Self { fields }
    }

    /// Add or replace a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Wrap a JSON object. Returns `None` when the object has no `id`.
    pub fn from_map(fields: Map<String, Value>) -> Option<Self> {
        if fields.contains_key("id") {
            Some(Self { fields })
        } else {
            None
        }
    }

    /// Borrow a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl TableRow for Record {
    fn row_id(&self) -> String {
        self.fields.get("id").map(scalar_text).unwrap_or_default()
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn fields(&self) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Text used when matching a search query against a value.
///
/// Objects and arrays are serialized to JSON; `null` has no text.
pub(crate) fn search_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(_) | Value::Array(_) => serde_json::to_string(value).ok(),
        other => Some(scalar_text(other)),
    }
}

/// String form of a scalar value; `None` for objects, arrays and `null`.
pub(crate) fn string_form(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => None,
        other => Some(scalar_text(other)),
    }
}

/// The `label` property of an object value.
pub(crate) fn label_of(value: &Value) -> Option<&str> {
    value.as_object()?.get("label")?.as_str()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
