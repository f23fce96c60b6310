//! Backend-neutral query targets.
//!
//! A [`QueryTarget`] is either a document-store query ([`StoreQuery`]) or a
//! search-index query ([`SearchQuery`]). Filters and orderings are written once
//! against the [`QueryOps`] builder trait and apply to whichever variant they
//! are handed; operations only one backend can express live on the concrete
//! type and, on `QueryTarget`, return [`QueryError::UnsupportedOperation`] for
//! the other variant.
//!
//! Every builder method takes the target by value and returns it, so a
//! pipeline is a plain chain of calls and a target is never shared while it is
//! being built.

mod predicate;
mod search;
mod store;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{QueryError, QueryResult};
use crate::schema::QueryByField;
use crate::types::{Field, FieldValue, Pagination};

pub use predicate::{Predicate, SortDirection, SortKey};
pub use search::{SearchQuery, SearchRequest};
pub use store::{FindSpec, SortSpec, StoreQuery};

/// The two storage backends a target can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// The primary document store.
    DocumentStore,
    /// The full-text search index.
    SearchIndex,
}

impl BackendKind {
    /// Short name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::DocumentStore => "document-store",
            BackendKind::SearchIndex => "search-index",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder operations shared by both backends.
///
/// Implementors provide the three primitive methods; everything else is
/// expressed in terms of them.
pub trait QueryOps: Sized {
    /// Appends a predicate.
    fn push_predicate(self, predicate: Predicate) -> Self;

    /// Makes `key` the primary sort key. Existing keys become tie-breakers
    /// and an earlier key on the same field is dropped.
    fn push_sort(self, key: SortKey) -> Self;

    /// Drops every sort key.
    fn clear_sort(self) -> Self;

    /// Field equals the value (array fields: any element equals).
    fn filter_eq(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Eq(field, value.into()))
    }

    /// Field differs from the value (array fields: no element equals).
    fn filter_ne(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Ne(field, value.into()))
    }

    /// Field is strictly greater than the value.
    fn filter_gt(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Gt(field, value.into()))
    }

    /// Field is greater than or equal to the value.
    fn filter_gte(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Gte(field, value.into()))
    }

    /// Field is strictly less than the value.
    fn filter_lt(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Lt(field, value.into()))
    }

    /// Field is less than or equal to the value.
    fn filter_lte(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push_predicate(Predicate::Lte(field, value.into()))
    }

    /// Field lies in the inclusive range `[lo, hi]`.
    fn filter_range(
        self,
        field: Field,
        lo: impl Into<FieldValue>,
        hi: impl Into<FieldValue>,
    ) -> Self {
        self.push_predicate(Predicate::Range {
            field,
            lo: lo.into(),
            hi: hi.into(),
        })
    }

    /// Field equals one of the values. An empty list matches nothing.
    fn filter_in<V: Into<FieldValue>>(self, field: Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push_predicate(Predicate::In(field, values))
    }

    /// Field equals none of the values. An empty list is a no-op.
    fn filter_not_in<V: Into<FieldValue>>(
        self,
        field: Field,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<FieldValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        self.push_predicate(Predicate::NotIn(field, values))
    }

    /// Field is present and not null.
    fn filter_not_null(self, field: Field) -> Self {
        self.push_predicate(Predicate::NotNull(field))
    }

    /// String field starts with `prefix`.
    fn filter_prefix(self, field: Field, prefix: impl Into<String>) -> Self {
        self.push_predicate(Predicate::Prefix(field, prefix.into()))
    }

    /// At least one of the clauses holds. An empty group is a no-op.
    fn filter_any(self, mut clauses: Vec<Predicate>) -> Self {
        match clauses.len() {
            0 => self,
            1 => self.push_predicate(clauses.remove(0)),
            _ => self.push_predicate(Predicate::Any(clauses)),
        }
    }

    /// Sorts by `field` ahead of any earlier ordering. The last call wins.
    fn order_by(self, field: Field, direction: SortDirection) -> Self {
        self.push_sort(SortKey::new(field, direction))
    }

    /// Sorts by several keys in one step, the first key primary.
    ///
    /// Earlier keys stay behind them as tie-breakers.
    fn order_by_keys(self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        let keys: Vec<SortKey> = keys.into_iter().collect();
        keys.into_iter().rev().fold(self, Self::push_sort)
    }

    /// Replaces the whole ordering with a single key.
    fn replace_order(self, field: Field, direction: SortDirection) -> Self {
        self.clear_sort().order_by(field, direction)
    }
}

/// A query against one of the two backends.
#[derive(Debug, Clone)]
pub enum QueryTarget {
    /// Document-store query.
    Store(StoreQuery),
    /// Search-index query.
    Search(SearchQuery),
}

impl QueryTarget {
    /// Which backend the target addresses.
    pub fn backend(&self) -> BackendKind {
        match self {
            QueryTarget::Store(_) => BackendKind::DocumentStore,
            QueryTarget::Search(_) => BackendKind::SearchIndex,
        }
    }

    /// Returns true for the search-index variant.
    pub fn is_search(&self) -> bool {
        matches!(self, QueryTarget::Search(_))
    }

    /// The store query, if this is the store variant.
    pub fn as_store(&self) -> Option<&StoreQuery> {
        match self {
            QueryTarget::Store(query) => Some(query),
            QueryTarget::Search(_) => None,
        }
    }

    /// The search query, if this is the search variant.
    pub fn as_search(&self) -> Option<&SearchQuery> {
        match self {
            QueryTarget::Store(_) => None,
            QueryTarget::Search(query) => Some(query),
        }
    }

    /// Appends a raw document-store predicate.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnsupportedOperation`] on the search variant.
    pub fn filter_raw(self, document: Map<String, Value>) -> QueryResult<Self> {
        match self {
            QueryTarget::Store(query) => Ok(QueryTarget::Store(query.filter_raw(document))),
            QueryTarget::Search(_) => Err(QueryError::unsupported(
                "filter_raw",
                BackendKind::SearchIndex,
            )),
        }
    }

    /// Overrides the weighted free-text fields.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnsupportedOperation`] on the store variant.
    pub fn with_query_by(self, fields: &'static [QueryByField]) -> QueryResult<Self> {
        match self {
            QueryTarget::Store(_) => Err(QueryError::unsupported(
                "with_query_by",
                BackendKind::DocumentStore,
            )),
            QueryTarget::Search(query) => Ok(QueryTarget::Search(query.with_query_by(fields))),
        }
    }

    /// Makes relevance the primary sort key.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnsupportedOperation`] on the store variant.
    pub fn sort_by_text_match(self, direction: SortDirection) -> QueryResult<Self> {
        match self {
            QueryTarget::Store(_) => Err(QueryError::unsupported(
                "sort_by_text_match",
                BackendKind::DocumentStore,
            )),
            QueryTarget::Search(query) => {
                Ok(QueryTarget::Search(query.sort_by_text_match(direction)))
            }
        }
    }

    /// Compiles the target without pagination.
    pub fn build(&self) -> QueryResult<CompiledQuery> {
        match self {
            QueryTarget::Store(query) => query.build().map(CompiledQuery::Find),
            QueryTarget::Search(query) => query.build().map(CompiledQuery::Search),
        }
    }

    /// Compiles the target for one page.
    pub fn build_paged(&self, pagination: &Pagination) -> QueryResult<CompiledQuery> {
        match self {
            QueryTarget::Store(query) => query.build_paged(pagination).map(CompiledQuery::Find),
            QueryTarget::Search(query) => {
                query.build_paged(pagination).map(CompiledQuery::Search)
            }
        }
    }
}

impl QueryOps for QueryTarget {
    fn push_predicate(self, predicate: Predicate) -> Self {
        match self {
            QueryTarget::Store(query) => QueryTarget::Store(query.push_predicate(predicate)),
            QueryTarget::Search(query) => QueryTarget::Search(query.push_predicate(predicate)),
        }
    }

    fn push_sort(self, key: SortKey) -> Self {
        match self {
            QueryTarget::Store(query) => QueryTarget::Store(query.push_sort(key)),
            QueryTarget::Search(query) => QueryTarget::Search(query.push_sort(key)),
        }
    }

    fn clear_sort(self) -> Self {
        match self {
            QueryTarget::Store(query) => QueryTarget::Store(query.clear_sort()),
            QueryTarget::Search(query) => QueryTarget::Search(query.clear_sort()),
        }
    }
}

impl From<StoreQuery> for QueryTarget {
    fn from(query: StoreQuery) -> Self {
        QueryTarget::Store(query)
    }
}

impl From<SearchQuery> for QueryTarget {
    fn from(query: SearchQuery) -> Self {
        QueryTarget::Search(query)
    }
}

/// A compiled query, ready to hand to a driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompiledQuery {
    /// A document-store `find`.
    Find(FindSpec),
    /// A search-index request.
    Search(SearchRequest),
}

impl CompiledQuery {
    /// The backend the compiled query runs on.
    pub fn backend(&self) -> BackendKind {
        match self {
            CompiledQuery::Find(_) => BackendKind::DocumentStore,
            CompiledQuery::Search(_) => BackendKind::SearchIndex,
        }
    }
}
