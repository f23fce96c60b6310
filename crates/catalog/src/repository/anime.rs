use chrono::{DateTime, FixedOffset};

use crate::config::CatalogConfig;
use crate::error::QueryResult;
use crate::filters;
use crate::model::{AnimeStatus, AnimeType, MediaKind, ScheduleFilter};
use crate::query::{QueryOps, QueryTarget, SortDirection};
use crate::types::fields;

use super::{DatabaseRepository, Repository};

/// Named anime queries.
pub trait AnimeRepository: Repository {
    /// Ranked non-adult anime currently on air, best rank first.
    fn top_airing_items(&self) -> QueryTarget {
        top_airing(self.except_items_with_adult_rating())
    }

    /// Ranked non-adult anime not aired yet, best rank first.
    fn top_upcoming_items(&self) -> QueryTarget {
        top_upcoming_anime(self.except_items_with_adult_rating())
    }

    /// TV series on air, optionally narrowed to a broadcast day, least
    /// followed first.
    fn currently_airing(&self, filter: Option<ScheduleFilter>) -> QueryTarget {
        currently_airing(self.queryable(false), filter)
    }

    /// Anime that started airing between `from` and the end of `to`'s month,
    /// most followed first.
    ///
    /// # Errors
    ///
    /// Fails when the month end of `to` cannot be represented.
    fn aired_between(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        anime_type: Option<AnimeType>,
    ) -> QueryResult<QueryTarget> {
        let target = filters::aired_between(self.queryable(false), from, to)?;
        Ok(with_optional_type(target, anime_type).order_by(fields::MEMBERS, SortDirection::Descending))
    }

    /// Anime not aired yet, most followed first.
    fn upcoming_season_items(&self, anime_type: Option<AnimeType>) -> QueryTarget {
        upcoming_season(self.queryable(false), anime_type)
    }
}

/// [`AnimeRepository`] over the configured anime collection.
#[derive(Debug, Clone)]
pub struct DefaultAnimeRepository {
    base: DatabaseRepository,
}

impl DefaultAnimeRepository {
    /// Wraps an anime [`DatabaseRepository`].
    pub fn new(base: DatabaseRepository) -> Self {
        debug_assert_eq!(base.kind(), MediaKind::Anime);
        Self { base }
    }

    /// Builds the repository from configuration.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(DatabaseRepository::for_kind(MediaKind::Anime, config))
    }
}

impl Repository for DefaultAnimeRepository {
    fn base(&self) -> &DatabaseRepository {
        &self.base
    }
}

impl AnimeRepository for DefaultAnimeRepository {}

/// Airing entries ranked best first. Expects adult entries already removed.
pub fn top_airing<Q: QueryOps>(target: Q) -> Q {
    filters::order_by_rank(target.filter_eq(fields::AIRING, true))
}

/// Not-yet-aired entries ranked best first. Expects adult entries already
/// removed.
pub fn top_upcoming_anime<Q: QueryOps>(target: Q) -> Q {
    filters::order_by_rank(target.filter_eq(fields::STATUS, AnimeStatus::Upcoming))
}

/// The airing schedule: TV series on air, fewest members first.
///
/// Weekday filters match the start of the broadcast string, the other two
/// match it exactly.
pub fn currently_airing<Q: QueryOps>(target: Q, filter: Option<ScheduleFilter>) -> Q {
    let target = target
        .order_by(fields::MEMBERS, SortDirection::Ascending)
        .filter_eq(fields::TYPE, AnimeType::Tv)
        .filter_eq(fields::STATUS, AnimeStatus::Airing);

    match filter {
        Some(day) if day.is_weekday() => target.filter_prefix(fields::BROADCAST, day.label()),
        Some(other) => target.filter_eq(fields::BROADCAST, other),
        None => target,
    }
}

/// Not-yet-aired entries of an optional type, most members first.
pub fn upcoming_season<Q: QueryOps>(target: Q, anime_type: Option<AnimeType>) -> Q {
    let target = target.filter_eq(fields::STATUS, AnimeStatus::Upcoming);
    with_optional_type(target, anime_type).order_by(fields::MEMBERS, SortDirection::Descending)
}

fn with_optional_type<Q: QueryOps>(target: Q, anime_type: Option<AnimeType>) -> Q {
    match anime_type {
        Some(anime_type) => target.filter_eq(fields::TYPE, anime_type),
        None => target,
    }
}
