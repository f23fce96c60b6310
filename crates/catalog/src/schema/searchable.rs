//! Records that can be mirrored into the search index.

use chrono::DateTime;
use serde_json::{Map, Value, json};

use crate::model::RelationEntry;

use super::{IndexSchema, TitleSimplifier};

/// A catalog record with an index declaration and an indexing transform.
pub trait Searchable {
    /// The entity's index declaration.
    fn index_schema() -> &'static IndexSchema
    where
        Self: Sized;

    /// Flattens the record into the document pushed to the index.
    ///
    /// Required schema fields are always present and never null.
    fn to_searchable_document(&self, simplifier: &dyn TitleSimplifier) -> Value;

    /// Collection creation payload for `collection`.
    fn collection_schema(collection: &str) -> Value
    where
        Self: Sized,
    {
        Self::index_schema().collection_schema(collection)
    }

    /// Comma-separated query-by fields.
    fn query_by() -> String
    where
        Self: Sized,
    {
        Self::index_schema().query_by_fields()
    }

    /// Query-by weights, parallel to [`Searchable::query_by`].
    fn query_by_weights() -> String
    where
        Self: Sized,
    {
        Self::index_schema().query_by_weights()
    }

    /// Default `sort_by` expression.
    fn search_index_sort_by() -> String
    where
        Self: Sized,
    {
        Self::index_schema().default_sort_by()
    }
}

/// Title fields shared by every entity.
pub(crate) struct Titles<'a> {
    pub title: &'a str,
    pub english: Option<&'a str>,
    pub japanese: Option<&'a str>,
    pub synonyms: &'a [String],
}

impl Titles<'_> {
    pub(crate) fn write(&self, doc: &mut Map<String, Value>, simplifier: &dyn TitleSimplifier) {
        let english = self.english.unwrap_or_default();
        let japanese = self.japanese.unwrap_or_default();

        doc.insert("title".into(), json!(self.title));
        doc.insert("title_transformed".into(), json!(simplifier.simplify(self.title)));
        doc.insert("title_english".into(), json!(english));
        doc.insert("title_english_transformed".into(), json!(simplifier.simplify(english)));
        doc.insert("title_japanese".into(), json!(japanese));
        doc.insert("title_japanese_transformed".into(), json!(simplifier.simplify(japanese)));
        doc.insert("title_synonyms".into(), json!(self.synonyms));
    }
}

/// Unix seconds for a stored date string, `0` when absent or unparseable.
pub(crate) fn timestamp(date: Option<&str>) -> i64 {
    date.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.timestamp())
        .unwrap_or(0)
}

/// The `mal_id` list of a relation array.
pub(crate) fn relation_ids(entries: &[RelationEntry]) -> Value {
    json!(entries.iter().map(|e| e.mal_id).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp(Some("2024-03-15T00:00:00+00:00")), 1710460800);
        assert_eq!(timestamp(Some("2024-03-15T09:00:00+09:00")), 1710460800);
        assert_eq!(timestamp(Some("not a date")), 0);
        assert_eq!(timestamp(None), 0);
    }
}
