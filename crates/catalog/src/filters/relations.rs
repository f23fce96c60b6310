//! Relation-id filters (magazines, producers, genres).

use crate::error::{QueryError, QueryResult};
use crate::query::QueryOps;
use crate::types::{Field, fields};

/// Parses a comma-separated id list.
///
/// Segments are trimmed and blank segments skipped, so `"5,,7"` yields
/// `[5, 7]` and a blank input yields an empty list.
pub fn parse_id_list(parameter: &str, value: &str) -> QueryResult<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.parse::<i64>().map_err(|_| {
                QueryError::invalid(parameter, format!("'{}' is not a numeric id", segment))
            })
        })
        .collect()
}

/// Keeps entries related to any of the listed ids, as one membership clause.
///
/// A list with no ids leaves the target untouched.
pub fn filter_by_relation_ids<Q: QueryOps>(
    target: Q,
    field: Field,
    parameter: &str,
    value: &str,
) -> QueryResult<Q> {
    let ids = parse_id_list(parameter, value)?;
    if ids.is_empty() {
        return Ok(target);
    }
    Ok(target.filter_in(field, ids))
}

/// Keeps manga serialized in the given magazine.
pub fn filter_by_magazine<Q: QueryOps>(target: Q, value: &str) -> QueryResult<Q> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(target);
    }
    let id = value
        .parse::<i64>()
        .map_err(|_| QueryError::invalid("magazine", format!("'{}' is not a numeric id", value)))?;
    Ok(target.filter_in(fields::MAGAZINE_IDS, [id]))
}

/// Keeps manga serialized in any of the comma-separated magazines.
pub fn filter_by_magazines<Q: QueryOps>(target: Q, value: &str) -> QueryResult<Q> {
    filter_by_relation_ids(target, fields::MAGAZINE_IDS, "magazines", value)
}

/// Keeps anime made by any of the comma-separated producers.
pub fn filter_by_producers<Q: QueryOps>(target: Q, value: &str) -> QueryResult<Q> {
    filter_by_relation_ids(target, fields::PRODUCER_IDS, "producers", value)
}

/// Keeps entries tagged with every listed genre.
pub fn filter_by_genres<Q: QueryOps>(target: Q, value: &str) -> QueryResult<Q> {
    let ids = parse_id_list("genres", value)?;
    Ok(ids
        .into_iter()
        .fold(target, |t, id| t.filter_eq(fields::GENRE_IDS, id)))
}

/// Drops entries tagged with any listed genre.
pub fn exclude_genres<Q: QueryOps>(target: Q, value: &str) -> QueryResult<Q> {
    let ids = parse_id_list("genres_exclude", value)?;
    Ok(ids
        .into_iter()
        .fold(target, |t, id| t.filter_ne(fields::GENRE_IDS, id)))
}
