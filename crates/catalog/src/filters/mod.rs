//! Filter and scope library.
//!
//! Every filter is a plain function over [`QueryOps`], so the same code narrows
//! a document-store query and a search-index query. Listing endpoints go
//! through a [`FilterRegistry`], which maps request parameter names to filter
//! functions and applies them in a fixed order:
//!
//! 1. value filters, in registration order
//! 2. content flags (`sfw`, `kids`, `unapproved`), see [`ContentFlags`]
//! 3. ordering (`order_by` and `sort`)

mod content;
mod dates;
mod ordering;
mod relations;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::model::{AnimeRating, AnimeStatus, AnimeType, MangaStatus, MangaType, MediaKind};
use crate::query::{Predicate, QueryOps, QueryTarget, SortDirection};
use crate::types::{Field, fields};

pub use content::{
    ContentFlags, except_items_with_adult_rating, exclude_kids_items, exclude_unapproved_items,
    only_kids_items, parse_bool,
};
pub use dates::{
    aired_between, end_of_month, filter_by_end_date, filter_by_start_date, midnight_utc,
    parse_date,
};
pub use ordering::{order_by_favorite_count, order_by_popularity, order_by_rank};
pub use relations::{
    exclude_genres, filter_by_genres, filter_by_magazine, filter_by_magazines,
    filter_by_producers, filter_by_relation_ids, parse_id_list,
};

/// Parameters consumed by the registry itself rather than by a filter.
const RESERVED_PARAMETERS: &[&str] = &[
    "sfw",
    "kids",
    "unapproved",
    "order_by",
    "sort",
    "page",
    "limit",
    "q",
];

/// Query-string parameters of a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingParams(BTreeMap<String, String>);

impl ListingParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// The raw value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the parameter was given.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListingParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for ListingParams {
    fn from(params: BTreeMap<String, String>) -> Self {
        Self(params)
    }
}

/// A named listing filter.
pub type FilterFn = Box<dyn Fn(QueryTarget, &str) -> QueryResult<QueryTarget> + Send + Sync>;

/// Maps listing parameter names to filter functions.
pub struct FilterRegistry {
    kind: MediaKind,
    filters: Vec<(&'static str, FilterFn)>,
}

impl FilterRegistry {
    /// Creates an empty registry for an entity.
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            filters: Vec::new(),
        }
    }

    /// Registers a filter. Filters run in registration order.
    pub fn with_filter<F>(mut self, name: &'static str, filter: F) -> Self
    where
        F: Fn(QueryTarget, &str) -> QueryResult<QueryTarget> + Send + Sync + 'static,
    {
        self.filters.retain(|(existing, _)| *existing != name);
        self.filters.push((name, Box::new(filter)));
        self
    }

    /// The registry for the given entity.
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Anime => Self::for_anime(),
            MediaKind::Manga => Self::for_manga(),
        }
    }

    /// Listing filters for anime.
    pub fn for_anime() -> Self {
        Self::with_common(MediaKind::Anime)
            .with_filter("status", |t, v| {
                Ok(t.filter_eq(fields::STATUS, v.parse::<AnimeStatus>()?))
            })
            .with_filter("type", |t, v| Ok(t.filter_eq(fields::TYPE, v.parse::<AnimeType>()?)))
            .with_filter("rating", |t, v| {
                Ok(t.filter_eq(fields::RATING, v.parse::<AnimeRating>()?))
            })
            .with_filter("producer", |t, v| {
                filter_by_relation_ids(t, fields::PRODUCER_IDS, "producer", v)
            })
            .with_filter("producers", filter_by_producers::<QueryTarget>)
    }

    /// Listing filters for manga.
    pub fn for_manga() -> Self {
        Self::with_common(MediaKind::Manga)
            .with_filter("status", |t, v| {
                Ok(t.filter_eq(fields::STATUS, v.parse::<MangaStatus>()?))
            })
            .with_filter("type", |t, v| Ok(t.filter_eq(fields::TYPE, v.parse::<MangaType>()?)))
            .with_filter("magazine", filter_by_magazine::<QueryTarget>)
            .with_filter("magazines", filter_by_magazines::<QueryTarget>)
    }

    fn with_common(kind: MediaKind) -> Self {
        Self::new(kind)
            .with_filter("score", |t, v| Ok(t.filter_gte(fields::SCORE, parse_score("score", v)?)))
            .with_filter("min_score", |t, v| {
                Ok(t.filter_gte(fields::SCORE, parse_score("min_score", v)?))
            })
            .with_filter("max_score", |t, v| {
                Ok(t.filter_lte(fields::SCORE, parse_score("max_score", v)?))
            })
            .with_filter("start_date", move |t, v| {
                Ok(filter_by_start_date(t, kind, parse_date("start_date", v)?))
            })
            .with_filter("end_date", move |t, v| {
                Ok(filter_by_end_date(t, kind, parse_date("end_date", v)?))
            })
            .with_filter("genres", filter_by_genres::<QueryTarget>)
            .with_filter("genres_exclude", exclude_genres::<QueryTarget>)
            .with_filter("letter", filter_by_letter)
    }

    /// The entity this registry filters.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Registered parameter names, in application order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|(name, _)| *name)
    }

    /// Whether a filter is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.iter().any(|(existing, _)| *existing == name)
    }

    /// Applies every filter named in `params`, then the content flags, then
    /// the ordering.
    ///
    /// Blank values are skipped. Unknown parameters are ignored.
    pub fn apply(&self, target: QueryTarget, params: &ListingParams) -> QueryResult<QueryTarget> {
        for (name, _) in params.iter() {
            if !self.contains(name) && !RESERVED_PARAMETERS.contains(&name) {
                debug!(parameter = %name, entity = %self.kind, "ignoring unknown listing parameter");
            }
        }

        let mut target = target;
        for (name, filter) in &self.filters {
            match params.get(name) {
                Some(value) if !value.trim().is_empty() => {
                    target = filter(target, value.trim())?;
                }
                _ => {}
            }
        }

        target = ContentFlags::from_params(params)?.apply(target, self.kind);
        self.apply_ordering(target, params)
    }

    fn apply_ordering(&self, target: QueryTarget, params: &ListingParams) -> QueryResult<QueryTarget> {
        let Some(order_by) = params.get("order_by").map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(target);
        };

        let field = sort_field(self.kind, order_by).ok_or_else(|| {
            QueryError::invalid("order_by", format!("cannot order {} by '{}'", self.kind, order_by))
        })?;

        let direction = match params.get("sort").map(str::trim) {
            None | Some("") => SortDirection::Ascending,
            Some(sort) => SortDirection::parse(sort).ok_or_else(|| {
                QueryError::invalid("sort", format!("expected 'asc' or 'desc', got '{}'", sort))
            })?,
        };

        Ok(target.order_by(field, direction))
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("kind", &self.kind)
            .field("filters", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

fn sort_field(kind: MediaKind, name: &str) -> Option<Field> {
    let field = match (kind, name) {
        (_, "mal_id") => fields::MAL_ID,
        (_, "title") => fields::TITLE,
        (_, "start_date") => kind.start_date_field(),
        (_, "end_date") => kind.end_date_field(),
        (_, "score") => fields::SCORE,
        (_, "scored_by") => fields::SCORED_BY,
        (_, "rank") => fields::RANK,
        (_, "popularity") => fields::POPULARITY,
        (_, "members") => fields::MEMBERS,
        (_, "favorites") => fields::FAVORITES,
        (MediaKind::Anime, "episodes") => fields::EPISODES,
        (MediaKind::Manga, "chapters") => fields::CHAPTERS,
        (MediaKind::Manga, "volumes") => fields::VOLUMES,
        _ => return None,
    };
    Some(field)
}

fn parse_score(parameter: &str, value: &str) -> QueryResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| QueryError::invalid(parameter, format!("'{}' is not a score", value)))
}

/// Keeps titles starting with the letter, in either case.
fn filter_by_letter(target: QueryTarget, value: &str) -> QueryResult<QueryTarget> {
    let mut chars = value.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphanumeric() => c,
        _ => {
            return Err(QueryError::invalid(
                "letter",
                format!("expected a single letter or digit, got '{}'", value),
            ));
        }
    };

    let upper: String = letter.to_uppercase().collect();
    let lower: String = letter.to_lowercase().collect();
    if upper == lower {
        return Ok(target.filter_prefix(fields::TITLE, upper));
    }
    Ok(target.filter_any(vec![
        Predicate::Prefix(fields::TITLE, upper),
        Predicate::Prefix(fields::TITLE, lower),
    ]))
}
