//! Backend-neutral predicate and sort vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Field, FieldValue};

/// A single constraint on the record set.
///
/// Both backends compile the same predicate list; array-valued fields follow
/// "any element" semantics for equality and "no element" semantics for
/// inequality.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value.
    Eq(Field, FieldValue),
    /// Field does not equal the value.
    Ne(Field, FieldValue),
    /// Field is strictly greater than the value.
    Gt(Field, FieldValue),
    /// Field is greater than or equal to the value.
    Gte(Field, FieldValue),
    /// Field is strictly less than the value.
    Lt(Field, FieldValue),
    /// Field is less than or equal to the value.
    Lte(Field, FieldValue),
    /// Field lies in `[lo, hi]`.
    Range {
        /// Field being bounded.
        field: Field,
        /// Inclusive lower bound.
        lo: FieldValue,
        /// Inclusive upper bound.
        hi: FieldValue,
    },
    /// Field equals one of the values.
    In(Field, Vec<FieldValue>),
    /// Field equals none of the values.
    NotIn(Field, Vec<FieldValue>),
    /// Field is present and not null.
    NotNull(Field),
    /// String field starts with the prefix.
    Prefix(Field, String),
    /// At least one of the nested predicates holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Every field this predicate touches, nested groups included.
    pub fn fields(&self) -> Vec<Field> {
        match self {
            Predicate::Eq(f, _)
            | Predicate::Ne(f, _)
            | Predicate::Gt(f, _)
            | Predicate::Gte(f, _)
            | Predicate::Lt(f, _)
            | Predicate::Lte(f, _)
            | Predicate::In(f, _)
            | Predicate::NotIn(f, _)
            | Predicate::NotNull(f)
            | Predicate::Prefix(f, _) => vec![*f],
            Predicate::Range { field, .. } => vec![*field],
            Predicate::Any(nested) => nested.iter().flat_map(Predicate::fields).collect(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Largest first.
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// The `asc` / `desc` spelling used by both backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Parses `asc` / `desc` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// The field to sort on.
    pub field: Field,
    /// The direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(field: Field, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}
