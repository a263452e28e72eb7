//! Event payload
//!
//! An event has a type, string tags, a JSON object of fields and an
//! optional timestamp. Fields are addressed with dot paths:
//!
//! | Path | Resolves to |
//! |------|-------------|
//! | `event_type` | the event type |
//! | `tags.<name>` | a tag |
//! | `fields.<a>.<b>` | a nested field |
//! | `<a>.<b>` | shorthand for `fields.<a>.<b>` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Event carried by a unit of work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub fields: Map<String, Value>,

    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Event {
    /// Create an event with no tags or fields
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Resolve a dot path
    pub fn field(&self, path: &str) -> Option<FieldValue<'_>> {
        if path == "event_type" {
            return Some(FieldValue::Str(&self.event_type));
        }
        if let Some(tag) = path.strip_prefix("tags.") {
            return self.tags.get(tag).map(|v| FieldValue::Str(v));
        }

        let path = path.strip_prefix("fields.").unwrap_or(path);
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(FieldValue::Json(current))
    }
}

/// Borrowed value resolved from an event path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Json(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// String form of scalars; objects and arrays have none
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        match *self {
            Self::Str(s) => Some(Cow::Borrowed(s)),
            Self::Json(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
            Self::Json(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
            Self::Json(Value::Bool(b)) => Some(Cow::Owned(b.to_string())),
            Self::Json(_) => None,
        }
    }

    /// Numeric form, parsing strings that hold a number
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Str(s) => s.parse().ok(),
            Self::Json(Value::Number(n)) => n.as_f64(),
            Self::Json(Value::String(s)) => s.parse().ok(),
            Self::Json(_) => None,
        }
    }

    /// Compare against the string form of an expected value
    pub fn equals(&self, expected: &str) -> bool {
        match *self {
            Self::Json(Value::Null) => expected == "null",
            other => other.as_text().is_some_and(|s| s == expected),
        }
    }
}
