//! Native field values as held by records and handed to repositories.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

/// A persisted value. Serializes to plain JSON with ISO-8601 dates, which is the raw record encoding.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl NativeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            NativeValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain string form used for display strings and search matching. Null has none.
    pub fn to_display(&self) -> Option<String> {
        match self {
            NativeValue::Null => None,
            NativeValue::Bool(b) => Some(b.to_string()),
            NativeValue::Int(n) => Some(n.to_string()),
            NativeValue::Text(s) => Some(s.clone()),
            NativeValue::Date(d) => Some(d.to_string()),
            NativeValue::DateTime(dt) => Some(dt.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        NativeValue::Int(n)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Text(s.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::Text(s)
    }
}

impl From<NaiveDate> for NativeValue {
    fn from(d: NaiveDate) -> Self {
        NativeValue::Date(d)
    }
}

impl From<NaiveDateTime> for NativeValue {
    fn from(dt: NaiveDateTime) -> Self {
        NativeValue::DateTime(dt)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(NativeValue::Null)
    }
}
