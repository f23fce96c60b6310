//! Search-index schema declarations.
//!
//! Each catalog entity declares one static [`IndexSchema`]. It is the single
//! source of truth for:
//!
//! - which fields the search index holds, with their type, locale and
//!   infix/sort/facet flags ([`IndexField`])
//! - the fields free-text queries run against and their relative weights
//!   ([`QueryByField`])
//! - the default result ordering ([`SortField`]): text relevance first, then
//!   popularity as the tie-break
//!
//! Search requests resolve every [`Field`] they reference against the schema
//! when they are built, so a filter or sort on an undeclared or unsortable
//! field is reported as [`QueryError::SchemaMismatch`] before anything is sent
//! to the engine.

mod anime;
mod manga;
pub(crate) mod searchable;
mod simplify;

use std::fmt;

use serde_json::{Value, json};

use crate::error::{QueryError, QueryResult};
use crate::query::SortDirection;
use crate::types::Field;

pub use anime::ANIME_SCHEMA;
pub use manga::MANGA_SCHEMA;
pub use searchable::Searchable;
pub use simplify::{DefaultTitleSimplifier, TitleSimplifier};

/// Pseudo-field the search engine sorts relevance on.
pub const TEXT_MATCH: &str = "_text_match";

/// Type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Type detected by the engine (used for the `.*` catch-all).
    Auto,
    /// Single string.
    String,
    /// Array of strings.
    StringArray,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Array of 64-bit integers.
    Int64Array,
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
}

impl FieldKind {
    /// The engine's name for the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Auto => "auto",
            FieldKind::String => "string",
            FieldKind::StringArray => "string[]",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Int64Array => "int64[]",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
        }
    }

    /// Returns true for string and string-array fields.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::String | FieldKind::StringArray)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexField {
    /// Field name in the index.
    pub name: &'static str,
    /// Field type.
    pub kind: FieldKind,
    /// Whether documents may omit the field.
    pub optional: bool,
    /// Language locale for tokenization.
    pub locale: Option<&'static str>,
    /// Whether infix (substring) search is enabled.
    pub infix: bool,
    /// Whether the field can be sorted on.
    pub sort: bool,
    /// Whether the field can be faceted and filtered on exactly.
    pub facet: bool,
    /// Whether the indexing transform writes `0` where the stored record
    /// has no value.
    pub zero_when_absent: bool,
}

impl IndexField {
    /// A required, unsorted field.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
            locale: None,
            infix: false,
            sort: false,
            facet: false,
            zero_when_absent: false,
        }
    }

    /// Marks the field optional.
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the tokenizer locale.
    pub const fn locale(mut self, locale: &'static str) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Enables infix search.
    pub const fn infix(mut self) -> Self {
        self.infix = true;
        self
    }

    /// Enables sorting.
    pub const fn sortable(mut self) -> Self {
        self.sort = true;
        self
    }

    /// Enables faceting.
    pub const fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    /// Marks `0` as the indexed stand-in for a missing value.
    pub const fn zero_when_absent(mut self) -> Self {
        self.zero_when_absent = true;
        self
    }

    /// The engine's JSON declaration of this field.
    pub fn to_json(&self) -> Value {
        if self.kind == FieldKind::Auto {
            return json!({ "name": self.name, "type": self.kind.as_str() });
        }

        let mut decl = json!({
            "name": self.name,
            "type": self.kind.as_str(),
            "optional": self.optional,
            "infix": self.infix,
            "sort": self.sort,
            "facet": self.facet,
        });
        if let Some(locale) = self.locale {
            decl["locale"] = json!(locale);
        }
        decl
    }
}

/// A free-text query-by field with its relative weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryByField {
    /// Field name in the index.
    pub name: &'static str,
    /// Relative weight.
    pub weight: u32,
}

impl QueryByField {
    /// Creates a weighted query-by field.
    pub const fn new(name: &'static str, weight: u32) -> Self {
        Self { name, weight }
    }
}

/// A default ordering key (may be [`TEXT_MATCH`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    /// Field name in the index.
    pub name: &'static str,
    /// Direction.
    pub direction: SortDirection,
}

impl SortField {
    /// Creates a default ordering key.
    pub const fn new(name: &'static str, direction: SortDirection) -> Self {
        Self { name, direction }
    }
}

/// How a query uses a field, for schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUsage {
    /// In a `filter_by` expression.
    Filter,
    /// In a `sort_by` expression.
    Sort,
    /// In the `query_by` list.
    QueryBy,
}

/// Static index declaration for one entity.
#[derive(Debug)]
pub struct IndexSchema {
    /// Default collection name.
    pub name: &'static str,
    /// Declared fields, in declaration order.
    pub fields: &'static [IndexField],
    /// Free-text fields with their weights.
    pub query_by: &'static [QueryByField],
    /// Default ordering for free-text searches.
    pub default_sort: &'static [SortField],
}

impl IndexSchema {
    /// Looks up a declared field by index name.
    ///
    /// The `.*` catch-all is not a field and never matches.
    pub fn field(&self, name: &str) -> Option<&'static IndexField> {
        self.fields
            .iter()
            .find(|f| f.kind != FieldKind::Auto && f.name == name)
    }

    /// The collection creation payload (`name` plus `fields`).
    pub fn collection_schema(&self, collection: &str) -> Value {
        json!({
            "name": collection,
            "fields": self.fields.iter().map(IndexField::to_json).collect::<Vec<_>>(),
        })
    }

    /// Comma-separated query-by field list.
    pub fn query_by_fields(&self) -> String {
        join_query_by(self.query_by)
    }

    /// Comma-separated query-by weights, parallel to [`Self::query_by_fields`].
    pub fn query_by_weights(&self) -> String {
        join_weights(self.query_by)
    }

    /// The default `sort_by` expression.
    pub fn default_sort_by(&self) -> String {
        self.default_sort
            .iter()
            .map(|s| format!("{}:{}", s.name, s.direction))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Resolves a [`Field`] to its declaration for the given usage.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::SchemaMismatch`] if the field is not mirrored into
    /// the index, not declared, or declared without the flag the usage needs.
    pub fn resolve(
        &self,
        collection: &str,
        field: &Field,
        usage: FieldUsage,
    ) -> QueryResult<&'static IndexField> {
        let index_name = field.index_name().ok_or_else(|| {
            QueryError::schema_mismatch(
                collection,
                field.path(),
                "field is not mirrored into the search index",
            )
        })?;
        self.resolve_name(collection, index_name, usage)
    }

    /// Same as [`Self::resolve`] for a raw index field name.
    pub fn resolve_name(
        &self,
        collection: &str,
        name: &str,
        usage: FieldUsage,
    ) -> QueryResult<&'static IndexField> {
        let decl = self.field(name).ok_or_else(|| {
            QueryError::schema_mismatch(collection, name, "field is not declared in the index schema")
        })?;

        match usage {
            FieldUsage::Sort if !decl.sort => Err(QueryError::schema_mismatch(
                collection,
                name,
                "field is not declared sortable",
            )),
            FieldUsage::QueryBy if !decl.kind.is_text() => Err(QueryError::schema_mismatch(
                collection,
                name,
                format!("query-by fields must be text, found {}", decl.kind),
            )),
            _ => Ok(decl),
        }
    }
}

pub(crate) fn join_query_by(fields: &[QueryByField]) -> String {
    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(",")
}

pub(crate) fn join_weights(fields: &[QueryByField]) -> String {
    fields
        .iter()
        .map(|f| f.weight.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
