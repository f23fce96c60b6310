//! Search-index query builder.
//!
//! Compiles predicates into Typesense search parameters. Every field is
//! resolved against the entity's [`IndexSchema`] while compiling, so mistakes
//! in a pipeline surface as [`QueryError::SchemaMismatch`] instead of as an
//! engine-side rejection.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::trace;

use crate::error::{QueryError, QueryResult};
use crate::schema::{FieldUsage, IndexSchema, QueryByField, TEXT_MATCH, join_query_by, join_weights};
use crate::types::{Field, FieldValue, Pagination, SearchOptions};

use super::{BackendKind, Predicate, QueryOps, SortDirection, SortKey};

/// The engine rejects `sort_by` expressions with more keys than this.
const MAX_SORT_KEYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchSort {
    Field(SortKey),
    TextMatch(SortDirection),
}

/// Builder for a search against one collection.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    schema: &'static IndexSchema,
    collection: String,
    term: String,
    options: SearchOptions,
    predicates: Vec<Predicate>,
    sort: Vec<SearchSort>,
    query_by: Option<&'static [QueryByField]>,
}

impl SearchQuery {
    /// Creates a query for `term` on `collection`. A blank term matches all.
    pub fn new(
        schema: &'static IndexSchema,
        collection: impl Into<String>,
        term: &str,
        options: &SearchOptions,
    ) -> Self {
        Self {
            schema,
            collection: collection.into(),
            term: term.trim().to_string(),
            options: options.clone(),
            predicates: Vec::new(),
            sort: Vec::new(),
            query_by: None,
        }
    }

    /// Target collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The schema fields are resolved against.
    pub fn schema(&self) -> &'static IndexSchema {
        self.schema
    }

    /// The search term as given (trimmed).
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Predicates added so far.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Overrides the schema's weighted query-by fields.
    pub fn with_query_by(mut self, fields: &'static [QueryByField]) -> Self {
        self.query_by = Some(fields);
        self
    }

    /// Makes relevance the primary sort key.
    pub fn sort_by_text_match(mut self, direction: SortDirection) -> Self {
        self.sort.retain(|sort| !matches!(sort, SearchSort::TextMatch(_)));
        self.sort.insert(0, SearchSort::TextMatch(direction));
        self
    }

    /// Relevance first, then `tie_breakers` in the given order.
    pub fn order_by_relevance(
        self,
        direction: SortDirection,
        tie_breakers: impl IntoIterator<Item = SortKey>,
    ) -> Self {
        self.order_by_keys(tie_breakers).sort_by_text_match(direction)
    }

    /// Compiles the query for the first page at the configured page size.
    pub fn build(&self) -> QueryResult<SearchRequest> {
        self.compile(1, self.options.per_page)
    }

    /// Compiles the query for one page.
    pub fn build_paged(&self, pagination: &Pagination) -> QueryResult<SearchRequest> {
        self.compile(pagination.page, pagination.limit)
    }

    fn compile(&self, page: u32, per_page: u32) -> QueryResult<SearchRequest> {
        let query_by = self.query_by.unwrap_or(self.schema.query_by);
        for field in query_by {
            self.schema
                .resolve_name(&self.collection, field.name, FieldUsage::QueryBy)?;
        }

        let mut clauses = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            if let Some(terms) = self.render_predicate(predicate)? {
                clauses.extend(terms);
            }
        }
        let filter_by = (!clauses.is_empty()).then(|| clauses.join(" && "));

        let request = SearchRequest {
            collection: self.collection.clone(),
            q: if self.term.is_empty() {
                "*".to_string()
            } else {
                self.term.clone()
            },
            query_by: join_query_by(query_by),
            query_by_weights: join_weights(query_by),
            filter_by,
            sort_by: self.render_sort()?,
            page,
            per_page,
            num_typos: self.options.num_typos,
            prefix: self.options.prefix,
            exhaustive_search: self.options.exhaustive_search,
        };
        trace!(collection = %request.collection, filter_by = ?request.filter_by, "compiled search request");
        Ok(request)
    }

    /// Renders one predicate as `&&`-joined terms. `None` means always true.
    fn render_predicate(&self, predicate: &Predicate) -> QueryResult<Option<Vec<String>>> {
        let clause = match predicate {
            Predicate::Eq(f, v) => format!("{}:={}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Ne(f, v) => format!("{}:!={}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Gt(f, v) => format!("{}:>{}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Gte(f, v) => format!("{}:>={}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Lt(f, v) => format!("{}:<{}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Lte(f, v) => format!("{}:<={}", self.filter_name(f)?, v.to_filter_literal()?),
            Predicate::Range { field, lo, hi } => format!(
                "{}:[{}..{}]",
                self.filter_name(field)?,
                lo.to_filter_literal()?,
                hi.to_filter_literal()?
            ),
            Predicate::In(f, values) => {
                let name = self.filter_name(f)?;
                if values.is_empty() {
                    return Err(QueryError::invalid(
                        name,
                        "membership filter needs at least one value",
                    ));
                }
                format!("{}:=[{}]", name, literal_list(values)?)
            }
            Predicate::NotIn(f, values) => {
                format!("{}:!=[{}]", self.filter_name(f)?, literal_list(values)?)
            }
            Predicate::NotNull(f) => {
                let decl = self
                    .schema
                    .resolve(&self.collection, f, FieldUsage::Filter)?;
                // Required fields are always emitted with a value by the indexing transform.
                if decl.optional {
                    return Err(QueryError::unsupported(
                        format!("filter_not_null({})", decl.name),
                        BackendKind::SearchIndex,
                    ));
                }
                if !decl.zero_when_absent {
                    return Ok(None);
                }
                format!("{}:!=0", decl.name)
            }
            Predicate::Prefix(f, prefix) => {
                let decl = self
                    .schema
                    .resolve(&self.collection, f, FieldUsage::Filter)?;
                if !decl.kind.is_text() {
                    return Err(QueryError::schema_mismatch(
                        &self.collection,
                        decl.name,
                        "prefix filters need a text field",
                    ));
                }
                if prefix.chars().any(is_filter_syntax) {
                    return Err(QueryError::invalid(
                        prefix.clone(),
                        "prefix contains filter syntax characters",
                    ));
                }
                format!("{}:{}*", decl.name, prefix)
            }
            Predicate::Any(nested) => {
                let mut rendered = Vec::with_capacity(nested.len());
                for predicate in nested {
                    match self.render_predicate(predicate)? {
                        Some(terms) if terms.len() == 1 => rendered.extend(terms),
                        Some(terms) => rendered.push(format!("({})", terms.join(" && "))),
                        // An always-true branch makes the whole group true.
                        None => return Ok(None),
                    }
                }
                match rendered.len() {
                    0 => return Ok(None),
                    1 => rendered.remove(0),
                    _ => format!("({})", rendered.join(" || ")),
                }
            }
        };

        let mut terms = vec![clause];
        if let Some(field) = sentinel_field(predicate) {
            let decl = self.schema.resolve(&self.collection, field, FieldUsage::Filter)?;
            if decl.zero_when_absent {
                // Absent values are indexed as 0; the store never matches them here.
                terms.push(format!("{}:!=0", decl.name));
            }
        }
        Ok(Some(terms))
    }

    fn render_sort(&self) -> QueryResult<Option<String>> {
        if self.sort.is_empty() {
            if self.term.is_empty() {
                return Ok(None);
            }
            return Ok(Some(self.schema.default_sort_by()));
        }

        if self.sort.len() > MAX_SORT_KEYS {
            return Err(QueryError::unsupported(
                format!("sorting on more than {} keys", MAX_SORT_KEYS),
                BackendKind::SearchIndex,
            ));
        }

        let mut keys = Vec::with_capacity(self.sort.len());
        for sort in &self.sort {
            let key = match sort {
                SearchSort::TextMatch(direction) => format!("{}:{}", TEXT_MATCH, direction),
                SearchSort::Field(key) => {
                    let decl = self
                        .schema
                        .resolve(&self.collection, &key.field, FieldUsage::Sort)?;
                    format!("{}:{}", decl.name, key.direction)
                }
            };
            keys.push(key);
        }
        Ok(Some(keys.join(",")))
    }

    fn filter_name(&self, field: &Field) -> QueryResult<&'static str> {
        self.schema
            .resolve(&self.collection, field, FieldUsage::Filter)
            .map(|decl| decl.name)
    }
}

impl QueryOps for SearchQuery {
    fn push_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn push_sort(mut self, key: SortKey) -> Self {
        self.sort
            .retain(|sort| !matches!(sort, SearchSort::Field(existing) if existing.field == key.field));
        self.sort.insert(0, SearchSort::Field(key));
        self
    }

    fn clear_sort(mut self) -> Self {
        self.sort.clear();
        self
    }
}

/// The field of a predicate that drops missing values on the store yet admits
/// zero, the indexed stand-in for them.
fn sentinel_field(predicate: &Predicate) -> Option<&Field> {
    use Ordering::{Equal, Greater, Less};

    // How the bound compares to zero.
    let sign = |value: &FieldValue| numeric(value).and_then(|n| n.partial_cmp(&0.0));
    let admits = match predicate {
        Predicate::Eq(_, v) => sign(v) == Some(Equal),
        Predicate::Gt(_, v) => sign(v) == Some(Less),
        Predicate::Gte(_, v) => matches!(sign(v), Some(Less | Equal)),
        Predicate::Lt(_, v) => sign(v) == Some(Greater),
        Predicate::Lte(_, v) => matches!(sign(v), Some(Greater | Equal)),
        Predicate::Range { lo, hi, .. } => {
            matches!(sign(lo), Some(Less | Equal)) && matches!(sign(hi), Some(Greater | Equal))
        }
        Predicate::In(_, values) => values.iter().any(|v| sign(v) == Some(Equal)),
        _ => false,
    };
    match predicate {
        Predicate::Eq(f, _)
        | Predicate::Gt(f, _)
        | Predicate::Gte(f, _)
        | Predicate::Lt(f, _)
        | Predicate::Lte(f, _)
        | Predicate::In(f, _)
        | Predicate::Range { field: f, .. } if admits => Some(f),
        _ => None,
    }
}

fn numeric(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Int(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::Date(d) => Some(d.timestamp() as f64),
        _ => None,
    }
}

fn literal_list(values: &[FieldValue]) -> QueryResult<String> {
    let literals = values
        .iter()
        .map(FieldValue::to_filter_literal)
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(literals.join(","))
}

fn is_filter_syntax(c: char) -> bool {
    matches!(c, '`' | ',' | ':' | '&' | '|' | '(' | ')' | '[' | ']' | '*')
}

/// Compiled Typesense search parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Collection to search.
    pub collection: String,
    /// Search term (`*` matches all).
    pub q: String,
    /// Comma-separated fields the term is matched against.
    pub query_by: String,
    /// Weights parallel to `query_by`.
    pub query_by_weights: String,
    /// `filter_by` expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    /// `sort_by` expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// 1-based page.
    pub page: u32,
    /// Hits per page.
    pub per_page: u32,
    /// Typo tolerance.
    pub num_typos: u8,
    /// Whether the last token is prefix-matched.
    pub prefix: bool,
    /// Whether to consider all variations of prefixes and typos.
    pub exhaustive_search: bool,
}
