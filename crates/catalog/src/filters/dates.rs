//! Date-range filters.
//!
//! Stored dates are ISO-8601 strings with an explicit UTC offset, so a bound is
//! always normalised to UTC before it is rendered. Bounds are taken at
//! midnight of the caller's own calendar date: `2024-03-15T14:30+09:00`
//! becomes `2024-03-15T00:00:00Z`, not the UTC instant's date.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde_json::{Map, json};

use crate::error::{QueryError, QueryResult};
use crate::model::MediaKind;
use crate::query::{QueryOps, QueryTarget};
use crate::types::{fields, to_atom_string};

/// Midnight of the value's own calendar date, expressed in UTC.
pub fn midnight_utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Keeps entries whose range starts on or after `date`.
pub fn filter_by_start_date<Q: QueryOps>(
    target: Q,
    kind: MediaKind,
    date: impl Into<DateTime<FixedOffset>>,
) -> Q {
    target.filter_gte(kind.start_date_field(), midnight_utc(date.into()))
}

/// Keeps entries whose range ends on or before `date`.
pub fn filter_by_end_date<Q: QueryOps>(
    target: Q,
    kind: MediaKind,
    date: impl Into<DateTime<FixedOffset>>,
) -> Q {
    target.filter_lte(kind.end_date_field(), midnight_utc(date.into()))
}

/// Keeps anime that started airing between `from` and the end of `to`'s month.
///
/// The lower bound is midnight of `from`; the upper bound is 23:59:59 on the
/// last day of `to`'s month. The range is written as a raw document-store
/// predicate.
///
/// # Errors
///
/// [`QueryError::UnsupportedOperation`] on the search variant, and
/// [`QueryError::InvalidParameter`] when the month end cannot be represented.
pub fn aired_between(
    target: QueryTarget,
    from: impl Into<DateTime<FixedOffset>>,
    to: impl Into<DateTime<FixedOffset>>,
) -> QueryResult<QueryTarget> {
    let lower = midnight_utc(from.into());
    let upper = end_of_month(to.into())?;

    let mut raw = Map::new();
    raw.insert(
        fields::AIRED_FROM.path().to_string(),
        json!({
            "$gte": to_atom_string(&lower),
            "$lte": to_atom_string(&upper),
        }),
    );
    target.filter_raw(raw)
}

/// 23:59:59 UTC on the last day of the value's calendar month.
pub fn end_of_month(value: DateTime<FixedOffset>) -> QueryResult<DateTime<Utc>> {
    let date = value.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .and_then(|last| last.and_hms_opt(23, 59, 59))
        .map(|end| end.and_utc())
        .ok_or_else(|| QueryError::invalid("to", format!("no month end for {}", date)))
}

/// Parses a date parameter.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and full RFC 3339 instants. Partial
/// dates resolve to the first day of the period, in UTC.
pub fn parse_date(parameter: &str, value: &str) -> QueryResult<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }

    let date = match value.len() {
        4 => value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
    };

    date.map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .ok_or_else(|| {
            QueryError::invalid(
                parameter,
                format!("expected YYYY, YYYY-MM, YYYY-MM-DD or RFC 3339, got '{}'", value),
            )
        })
}
