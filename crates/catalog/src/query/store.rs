//! Document-store query builder.
//!
//! Compiles predicates into a MongoDB filter document. Clauses are always
//! joined under `$and` so two constraints on the same path never overwrite
//! each other in the filter object.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::QueryResult;
use crate::types::{FieldValue, Pagination};

use super::{Predicate, QueryOps, SortDirection, SortKey};

#[derive(Debug, Clone, PartialEq)]
enum StoreClause {
    Predicate(Predicate),
    Raw(Map<String, Value>),
}

/// Builder for a `find` against one collection.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    collection: String,
    clauses: Vec<StoreClause>,
    sort: Vec<SortKey>,
}

impl StoreQuery {
    /// Creates an unconstrained query on `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            clauses: Vec::new(),
            sort: Vec::new(),
        }
    }

    /// Target collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of filter clauses added so far.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Sort keys in priority order.
    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    /// Appends a predicate written in MongoDB operator syntax.
    ///
    /// The document is passed through untouched.
    pub fn filter_raw(mut self, document: Map<String, Value>) -> Self {
        if !document.is_empty() {
            self.clauses.push(StoreClause::Raw(document));
        }
        self
    }

    /// Compiles the query with no skip or limit.
    pub fn build(&self) -> QueryResult<FindSpec> {
        Ok(FindSpec {
            collection: self.collection.clone(),
            filter: self.filter_document(),
            sort: self.sort_specs(),
            skip: 0,
            limit: None,
        })
    }

    /// Compiles the query for one page.
    pub fn build_paged(&self, pagination: &Pagination) -> QueryResult<FindSpec> {
        let mut spec = self.build()?;
        spec.skip = pagination.skip();
        spec.limit = Some(u64::from(pagination.limit));
        Ok(spec)
    }

    fn filter_document(&self) -> Value {
        let mut compiled: Vec<Value> = self
            .clauses
            .iter()
            .map(|clause| match clause {
                StoreClause::Predicate(predicate) => compile_predicate(predicate),
                StoreClause::Raw(document) => Value::Object(document.clone()),
            })
            .collect();

        match compiled.len() {
            0 => json!({}),
            1 => compiled.remove(0),
            _ => json!({ "$and": compiled }),
        }
    }

    fn sort_specs(&self) -> Vec<SortSpec> {
        self.sort
            .iter()
            .map(|key| {
                let order = match key.direction {
                    SortDirection::Ascending => 1,
                    SortDirection::Descending => -1,
                };
                SortSpec::new(key.field.path(), order)
            })
            .collect()
    }
}

impl QueryOps for StoreQuery {
    fn push_predicate(mut self, predicate: Predicate) -> Self {
        self.clauses.push(StoreClause::Predicate(predicate));
        self
    }

    fn push_sort(mut self, key: SortKey) -> Self {
        self.sort.retain(|existing| existing.field != key.field);
        self.sort.insert(0, key);
        self
    }

    fn clear_sort(mut self) -> Self {
        self.sort.clear();
        self
    }
}

fn compile_predicate(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::Eq(f, v) => operator(f.path(), "$eq", v.to_document_value()),
        Predicate::Ne(f, v) => operator(f.path(), "$ne", v.to_document_value()),
        Predicate::Gt(f, v) => operator(f.path(), "$gt", v.to_document_value()),
        Predicate::Gte(f, v) => operator(f.path(), "$gte", v.to_document_value()),
        Predicate::Lt(f, v) => operator(f.path(), "$lt", v.to_document_value()),
        Predicate::Lte(f, v) => operator(f.path(), "$lte", v.to_document_value()),
        Predicate::Range { field, lo, hi } => json!({
            field.path(): {
                "$gte": lo.to_document_value(),
                "$lte": hi.to_document_value(),
            }
        }),
        Predicate::In(f, values) => operator(f.path(), "$in", document_values(values)),
        Predicate::NotIn(f, values) => operator(f.path(), "$nin", document_values(values)),
        Predicate::NotNull(f) => json!({ f.path(): { "$exists": true, "$ne": null } }),
        Predicate::Prefix(f, prefix) => {
            let pattern = format!("^{}", regex::escape(prefix));
            operator(f.path(), "$regex", json!(pattern))
        }
        Predicate::Any(nested) => {
            json!({ "$or": nested.iter().map(compile_predicate).collect::<Vec<_>>() })
        }
    }
}

fn operator(path: &str, op: &str, value: Value) -> Value {
    json!({ path: { op: value } })
}

fn document_values(values: &[FieldValue]) -> Value {
    Value::Array(values.iter().map(FieldValue::to_document_value).collect())
}

/// One key of a compiled sort, `1` ascending and `-1` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Dotted document path.
    pub field: String,
    /// `1` or `-1`.
    pub order: i32,
}

impl SortSpec {
    /// Creates a sort key.
    pub fn new(field: impl Into<String>, order: i32) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// A compiled `find`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindSpec {
    /// Collection to query.
    pub collection: String,
    /// MongoDB filter document.
    pub filter: Value,
    /// Sort keys in priority order.
    pub sort: Vec<SortSpec>,
    /// Documents to skip.
    pub skip: u64,
    /// Maximum documents to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[cfg(feature = "mongodb")]
impl FindSpec {
    /// The filter as a BSON document for the driver.
    pub fn filter_document(&self) -> Result<mongodb::bson::Document, crate::error::BackendError> {
        mongodb::bson::to_document(&self.filter).map_err(|e| {
            crate::error::BackendError::SerializationError {
                message: format!("filter is not a valid BSON document: {}", e),
            }
        })
    }

    /// The sort keys as an ordered BSON document.
    pub fn sort_document(&self) -> mongodb::bson::Document {
        let mut sort = mongodb::bson::Document::new();
        for spec in &self.sort {
            sort.insert(spec.field.clone(), spec.order);
        }
        sort
    }
}
