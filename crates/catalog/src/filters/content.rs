//! Content-rating and moderation filters.

use crate::error::{QueryError, QueryResult};
use crate::model::{MediaKind, categories};
use crate::query::QueryOps;
use crate::types::fields;

use super::ListingParams;

/// Removes adult entries for the given entity.
pub fn except_items_with_adult_rating<Q: QueryOps>(target: Q, kind: MediaKind) -> Q {
    kind.adult_exclusions()
        .into_iter()
        .fold(target, Q::push_predicate)
}

/// Removes entries in the kids demographic.
pub fn exclude_kids_items<Q: QueryOps>(target: Q) -> Q {
    target.filter_ne(fields::DEMOGRAPHIC_IDS, categories::KIDS)
}

/// Keeps only entries in the kids demographic.
pub fn only_kids_items<Q: QueryOps>(target: Q) -> Q {
    target.filter_eq(fields::DEMOGRAPHIC_IDS, categories::KIDS)
}

/// Keeps only approved entries.
pub fn exclude_unapproved_items<Q: QueryOps>(target: Q) -> Q {
    target.filter_eq(fields::APPROVED, true)
}

/// The `sfw` / `kids` / `unapproved` request flags.
///
/// Kids entries and unapproved entries are hidden unless asked for; adult
/// entries are shown unless `sfw` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentFlags {
    /// Hide adult entries.
    pub sfw: bool,
    /// Include kids entries.
    pub kids: bool,
    /// Include unapproved entries.
    pub unapproved: bool,
}

impl ContentFlags {
    /// Reads the flags from listing parameters.
    ///
    /// A flag given without a value counts as set.
    pub fn from_params(params: &ListingParams) -> QueryResult<Self> {
        Ok(Self {
            sfw: flag(params, "sfw")?,
            kids: flag(params, "kids")?,
            unapproved: flag(params, "unapproved")?,
        })
    }

    /// Applies the flags to a target.
    pub fn apply<Q: QueryOps>(&self, target: Q, kind: MediaKind) -> Q {
        let mut target = target;
        if self.sfw {
            target = except_items_with_adult_rating(target, kind);
        }
        if !self.kids {
            target = exclude_kids_items(target);
        }
        if !self.unapproved {
            target = exclude_unapproved_items(target);
        }
        target
    }
}

fn flag(params: &ListingParams, name: &str) -> QueryResult<bool> {
    match params.get(name) {
        None => Ok(false),
        Some(value) => parse_bool(name, value),
    }
}

/// Parses a boolean request parameter. An empty value means true.
pub fn parse_bool(parameter: &str, value: &str) -> QueryResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(QueryError::invalid(
            parameter,
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StoreQuery;
    use serde_json::json;

    #[test]
    fn test_adult_exclusion_compiles_to_negations() {
        let spec = except_items_with_adult_rating(StoreQuery::new("manga"), MediaKind::Manga)
            .build()
            .unwrap();
        assert_eq!(
            spec.filter,
            json!({ "$and": [
                { "type": { "$ne": "Doujinshi" } },
                { "demographics.mal_id": { "$ne": 12 } },
                { "demographics.mal_id": { "$ne": 49 } },
                { "genres.mal_id": { "$ne": 12 } },
            ]})
        );
    }

    #[test]
    fn test_default_flags_hide_kids_and_unapproved() {
        let flags = ContentFlags::from_params(&ListingParams::new()).unwrap();
        assert_eq!(flags, ContentFlags::default());

        let spec = flags
            .apply(StoreQuery::new("anime"), MediaKind::Anime)
            .build()
            .unwrap();
        assert_eq!(
            spec.filter,
            json!({ "$and": [
                { "demographics.mal_id": { "$ne": 15 } },
                { "approved": { "$eq": true } },
            ]})
        );
    }

    #[test]
    fn test_flag_without_value_is_set() {
        let params = ListingParams::new().with("sfw", "").with("kids", "false");
        let flags = ContentFlags::from_params(&params).unwrap();
        assert!(flags.sfw);
        assert!(!flags.kids);

        let params = ListingParams::new().with("unapproved", "maybe");
        assert!(matches!(
            ContentFlags::from_params(&params),
            Err(QueryError::InvalidParameter { .. })
        ));
    }
}
