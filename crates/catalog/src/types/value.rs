//! Typed filter values.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::error::{QueryError, QueryResult};

/// A literal compared against a field.
///
/// Each backend renders values differently: the document store keeps dates as
/// ISO-8601 strings with an explicit offset, the search index keeps them as
/// Unix seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer (ids, counts, ranks).
    Int(i64),
    /// Floating point (scores).
    Float(f64),
    /// Label or free text.
    Str(String),
    /// Instant, always held in UTC.
    Date(DateTime<Utc>),
}

impl FieldValue {
    /// Renders the value for a document-store filter.
    pub fn to_document_value(&self) -> Value {
        match self {
            FieldValue::Bool(b) => json!(b),
            FieldValue::Int(i) => json!(i),
            FieldValue::Float(f) => json!(f),
            FieldValue::Str(s) => json!(s),
            FieldValue::Date(d) => json!(to_atom_string(d)),
        }
    }

    /// Renders the value as a search-index `filter_by` literal.
    ///
    /// Strings are wrapped in backticks so labels with spaces or commas survive
    /// the filter grammar. A string that itself contains a backtick cannot be
    /// expressed.
    pub fn to_filter_literal(&self) -> QueryResult<String> {
        match self {
            FieldValue::Bool(b) => Ok(b.to_string()),
            FieldValue::Int(i) => Ok(i.to_string()),
            FieldValue::Float(f) => Ok(f.to_string()),
            FieldValue::Date(d) => Ok(d.timestamp().to_string()),
            FieldValue::Str(s) if s.contains('`') => Err(QueryError::invalid(
                s.clone(),
                "search filter values cannot contain backticks",
            )),
            FieldValue::Str(s) => Ok(format!("`{}`", s)),
        }
    }
}

/// Formats an instant the way stored documents carry dates
/// (`2024-03-15T00:00:00+00:00`).
pub fn to_atom_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}
