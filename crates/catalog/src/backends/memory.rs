//! In-memory document-store executor.
//!
//! Evaluates the compiled MongoDB filter document directly, so tests exercise
//! exactly what would be sent to the database. Supported operators:
//! `$and`, `$or`, `$nor`, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
//! `$nin`, `$exists` and `$regex`. Dotted paths descend into arrays, and
//! equality against an array field matches when any element is equal.
//!
//! Sorting follows the document store's cross-type order: missing and null
//! first, then numbers, strings, objects, arrays and booleans.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::QueryExecutor;
use crate::error::{BackendError, QueryError, StorageResult};
use crate::query::{BackendKind, CompiledQuery, FindSpec, QueryTarget, SortSpec};
use crate::types::{Page, Pagination};

/// Executes document-store targets over collections held in memory.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    patterns: PatternCache,
}

impl MemoryExecutor {
    /// Creates an executor with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to a collection, creating it if needed.
    pub fn insert(&self, collection: &str, document: Value) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Appends several documents to a collection.
    pub fn extend(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Number of documents held in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Whether the collection is missing or empty.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Runs a compiled `find`, returning the requested window and the total
    /// number of matches.
    pub fn find(&self, spec: &FindSpec) -> Result<(Vec<Value>, u64), BackendError> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(&spec.collection) else {
            return Ok((Vec::new(), 0));
        };

        let mut matched = Vec::new();
        for document in documents {
            if matches(document, &spec.filter, &self.patterns)? {
                matched.push(document);
            }
        }
        matched.sort_by(|a, b| compare_documents(a, b, &spec.sort));

        let total = matched.len() as u64;
        let skip = usize::try_from(spec.skip).unwrap_or(usize::MAX);
        let take = spec
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        let window = matched.into_iter().skip(skip).take(take).cloned().collect();

        Ok((window, total))
    }

    fn find_spec(target: &QueryTarget, pagination: Option<&Pagination>) -> StorageResult<FindSpec> {
        let compiled = match pagination {
            Some(pagination) => target.build_paged(pagination)?,
            None => target.build()?,
        };
        match compiled {
            CompiledQuery::Find(spec) => Ok(spec),
            CompiledQuery::Search(_) => {
                Err(QueryError::unsupported("in-memory execution", BackendKind::SearchIndex).into())
            }
        }
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    fn executor_name(&self) -> &'static str {
        "memory"
    }

    fn supports(&self, backend: BackendKind) -> bool {
        backend == BackendKind::DocumentStore
    }

    async fn execute(
        &self,
        target: &QueryTarget,
        pagination: &Pagination,
    ) -> StorageResult<Page<Value>> {
        let spec = Self::find_spec(target, Some(pagination))?;
        let (documents, total) = self.find(&spec)?;
        debug!(
            collection = %spec.collection,
            returned = documents.len(),
            total,
            "executed in-memory find"
        );
        Ok(Page::new(documents, pagination, total))
    }

    async fn count(&self, target: &QueryTarget) -> StorageResult<u64> {
        let spec = Self::find_spec(target, None)?;
        let (_, total) = self.find(&spec)?;
        Ok(total)
    }
}

fn query_failed(message: impl Into<String>) -> BackendError {
    BackendError::QueryFailed {
        message: message.into(),
    }
}

/// `$regex` patterns compiled once and reused across finds.
#[derive(Debug, Default)]
struct PatternCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    fn get(&self, pattern: &str) -> Result<Regex, BackendError> {
        if let Some(regex) = self.compiled.read().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(pattern)
            .map_err(|e| query_failed(format!("invalid pattern '{}': {}", pattern, e)))?;
        self.compiled
            .write()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

/// Whether `document` satisfies the filter document.
fn matches(document: &Value, filter: &Value, patterns: &PatternCache) -> Result<bool, BackendError> {
    let Value::Object(filter) = filter else {
        return Err(query_failed("filter must be a document"));
    };

    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in sub_filters(key, condition)? {
                    if !matches(document, clause, patterns)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => any_match(document, sub_filters(key, condition)?, patterns)?,
            "$nor" => !any_match(document, sub_filters(key, condition)?, patterns)?,
            operator if operator.starts_with('$') => {
                return Err(query_failed(format!("unsupported top-level operator '{}'", operator)));
            }
            path => matches_condition(document, path, condition, patterns)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_match(
    document: &Value,
    clauses: &[Value],
    patterns: &PatternCache,
) -> Result<bool, BackendError> {
    for clause in clauses {
        if matches(document, clause, patterns)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn sub_filters<'a>(operator: &str, value: &'a Value) -> Result<&'a [Value], BackendError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| query_failed(format!("'{}' expects an array of documents", operator)))
}

fn matches_condition(
    document: &Value,
    path: &str,
    condition: &Value,
    patterns: &PatternCache,
) -> Result<bool, BackendError> {
    let values = resolve_path(document, path);
    match condition {
        Value::Object(operators) if is_operator_document(operators) => {
            for (operator, operand) in operators {
                if !apply_operator(&values, operator, operand, patterns)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        literal => Ok(equals_any(&values, literal)),
    }
}

fn is_operator_document(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|key| key.starts_with('$'))
}

fn apply_operator(
    values: &[&Value],
    operator: &str,
    operand: &Value,
    patterns: &PatternCache,
) -> Result<bool, BackendError> {
    let satisfied = match operator {
        "$eq" => equals_any(values, operand),
        "$ne" => !equals_any(values, operand),
        "$gt" => compare_any(values, operand, |o| o == Ordering::Greater),
        "$gte" => compare_any(values, operand, |o| o != Ordering::Less),
        "$lt" => compare_any(values, operand, |o| o == Ordering::Less),
        "$lte" => compare_any(values, operand, |o| o != Ordering::Greater),
        "$in" => membership(values, operator, operand)?,
        "$nin" => !membership(values, operator, operand)?,
        "$exists" => {
            let wanted = operand
                .as_bool()
                .ok_or_else(|| query_failed("'$exists' expects a boolean"))?;
            values.is_empty() != wanted
        }
        "$regex" => {
            let pattern = operand
                .as_str()
                .ok_or_else(|| query_failed("'$regex' expects a string"))?;
            let regex = patterns.get(pattern)?;
            candidates(values).any(|v| v.as_str().is_some_and(|s| regex.is_match(s)))
        }
        other => return Err(query_failed(format!("unsupported operator '{}'", other))),
    };
    Ok(satisfied)
}

fn membership(values: &[&Value], operator: &str, operand: &Value) -> Result<bool, BackendError> {
    let list = operand
        .as_array()
        .ok_or_else(|| query_failed(format!("'{}' expects an array", operator)))?;
    Ok(list.iter().any(|item| equals_any(values, item)))
}

/// Every value reachable through a dotted path, descending into arrays.
/// An empty result means the path is missing.
fn resolve_path<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    collect_path(document, &segments, &mut found);
    found
}

fn collect_path<'a>(value: &'a Value, segments: &[&str], found: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        found.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                collect_path(child, rest, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_path(item, segments, found);
            }
        }
        _ => {}
    }
}

/// Resolved values plus the elements of any resolved array.
fn candidates<'a>(values: &'a [&'a Value]) -> impl Iterator<Item = &'a Value> + 'a {
    values.iter().flat_map(|value| {
        let elements: &[Value] = match value {
            Value::Array(items) => items,
            _ => &[],
        };
        std::iter::once(*value).chain(elements.iter())
    })
}

fn equals_any(values: &[&Value], operand: &Value) -> bool {
    if operand.is_null() && values.is_empty() {
        return true;
    }
    candidates(values).any(|value| values_equal(value, operand))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn compare_any(values: &[&Value], operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    candidates(values).any(|value| compare_same_type(value, operand).is_some_and(&accept))
}

/// Range operators only compare values of the same type.
fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_documents(a: &Value, b: &Value, sort: &[SortSpec]) -> Ordering {
    for key in sort {
        let ordering = compare_sort_values(sort_value(a, &key.field), sort_value(b, &key.field));
        let ordering = if key.order < 0 { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn sort_value<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    match resolve_path(document, path).into_iter().next()? {
        Value::Array(items) => items.first(),
        value => Some(value),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_sort_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Some(x), Some(y)) => compare_same_type(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryOps, SortDirection, StoreQuery};
    use crate::types::fields;
    use serde_json::json;

    fn executor() -> MemoryExecutor {
        let executor = MemoryExecutor::new();
        executor.extend(
            "anime",
            [
                json!({ "mal_id": 1, "rank": 3, "genres": [{ "mal_id": 1 }, { "mal_id": 4 }] }),
                json!({ "mal_id": 2, "rank": null, "genres": [] }),
                json!({ "mal_id": 3, "rank": 1 }),
                json!({ "mal_id": 4, "rank": 0, "genres": [{ "mal_id": 12 }] }),
            ],
        );
        executor
    }

    fn ids(documents: &[Value]) -> Vec<i64> {
        documents
            .iter()
            .filter_map(|d| d["mal_id"].as_i64())
            .collect()
    }

    fn run(filter: Value) -> Vec<i64> {
        let spec = FindSpec {
            collection: "anime".to_string(),
            filter,
            sort: vec![SortSpec::new("mal_id", 1)],
            skip: 0,
            limit: None,
        };
        ids(&executor().find(&spec).unwrap().0)
    }

    #[test]
    fn test_array_paths_match_any_element() {
        assert_eq!(run(json!({ "genres.mal_id": { "$eq": 4 } })), vec![1]);
        assert_eq!(run(json!({ "genres.mal_id": { "$ne": 12 } })), vec![1, 2, 3]);
        assert_eq!(run(json!({ "genres.mal_id": { "$in": [4, 12] } })), vec![1, 4]);
    }

    #[test]
    fn test_exists_and_not_null() {
        assert_eq!(
            run(json!({ "rank": { "$exists": true, "$ne": null } })),
            vec![1, 3, 4]
        );
        assert_eq!(run(json!({ "genres": { "$exists": false } })), vec![3]);
    }

    #[test]
    fn test_range_skips_other_types() {
        assert_eq!(run(json!({ "rank": { "$gt": 0 } })), vec![1, 3]);
        assert_eq!(run(json!({ "rank": { "$lte": 1 } })), vec![3, 4]);
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(
            run(json!({ "$or": [{ "mal_id": 1 }, { "mal_id": { "$eq": 3 } }] })),
            vec![1, 3]
        );
        assert_eq!(run(json!({ "$nor": [{ "rank": { "$gte": 1 } }] })), vec![2, 4]);
    }

    #[test]
    fn test_unknown_operator_fails() {
        let spec = FindSpec {
            collection: "anime".to_string(),
            filter: json!({ "rank": { "$size": 1 } }),
            sort: Vec::new(),
            skip: 0,
            limit: None,
        };
        assert!(matches!(
            executor().find(&spec),
            Err(BackendError::QueryFailed { .. })
        ));
    }

    #[test]
    fn test_sort_puts_null_first() {
        let spec = FindSpec {
            collection: "anime".to_string(),
            filter: json!({}),
            sort: vec![SortSpec::new("rank", 1)],
            skip: 0,
            limit: None,
        };
        assert_eq!(ids(&executor().find(&spec).unwrap().0), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_regex_patterns_compile_once() {
        let executor = MemoryExecutor::new();
        executor.extend(
            "anime",
            [
                json!({ "mal_id": 1, "broadcast": { "string": "Mondays at 01:00" } }),
                json!({ "mal_id": 2, "broadcast": { "string": "Sundays at 17:00" } }),
            ],
        );
        let spec = FindSpec {
            collection: "anime".to_string(),
            filter: json!({ "broadcast.string": { "$regex": "^Mondays" } }),
            sort: Vec::new(),
            skip: 0,
            limit: None,
        };

        for _ in 0..3 {
            assert_eq!(ids(&executor.find(&spec).unwrap().0), vec![1]);
        }
        assert_eq!(executor.patterns.compiled.read().len(), 1);

        let broken = FindSpec {
            filter: json!({ "broadcast.string": { "$regex": "(" } }),
            ..spec
        };
        assert!(matches!(
            executor.find(&broken),
            Err(BackendError::QueryFailed { .. })
        ));
        assert_eq!(executor.patterns.compiled.read().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_pages_results() {
        let target: QueryTarget = StoreQuery::new("anime")
            .order_by(fields::MAL_ID, SortDirection::Descending)
            .into();
        let executor = executor();

        let page = executor
            .execute(&target, &Pagination::new(2, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(ids(&page.data), vec![1]);
        assert_eq!(page.pagination.items.total, 4);
        assert!(!page.pagination.has_next_page);
        assert_eq!(executor.count(&target).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let target: QueryTarget = StoreQuery::new("manga").into();
        let page = executor()
            .execute(&target, &Pagination::default())
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_search_targets_are_rejected() {
        use crate::query::SearchQuery;
        use crate::schema::ANIME_SCHEMA;
        use crate::types::SearchOptions;

        let target: QueryTarget =
            SearchQuery::new(&ANIME_SCHEMA, "anime", "", &SearchOptions::default()).into();
        let executor = executor();
        assert!(!executor.supports(target.backend()));
        let err = executor.count(&target).await.unwrap_err();
        assert!(err.is_configuration_error());
    }
}
