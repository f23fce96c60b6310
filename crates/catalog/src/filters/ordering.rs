//! Standard orderings.

use crate::query::{QueryOps, SortDirection};
use crate::types::fields;

/// Most members first.
pub fn order_by_popularity<Q: QueryOps>(target: Q) -> Q {
    target.order_by(fields::MEMBERS, SortDirection::Descending)
}

/// Most favorited first.
pub fn order_by_favorite_count<Q: QueryOps>(target: Q) -> Q {
    target.order_by(fields::FAVORITES, SortDirection::Descending)
}

/// Ranked entries only, best rank first.
///
/// Unranked entries carry a null or zero rank and are dropped.
pub fn order_by_rank<Q: QueryOps>(target: Q) -> Q {
    target
        .filter_not_null(fields::RANK)
        .filter_gt(fields::RANK, 0)
        .order_by(fields::RANK, SortDirection::Ascending)
}
