use crate::config::CatalogConfig;
use crate::filters;
use crate::model::{MangaStatus, MediaKind};
use crate::query::{QueryOps, QueryTarget};
use crate::types::fields;

use super::{DatabaseRepository, Repository};

/// Named manga queries.
pub trait MangaRepository: Repository {
    /// Ranked non-adult manga still publishing, best rank first.
    fn top_publishing_items(&self) -> QueryTarget {
        top_publishing(self.except_items_with_adult_rating())
    }

    /// Ranked non-adult manga not published yet, best rank first.
    fn top_upcoming_items(&self) -> QueryTarget {
        top_upcoming_manga(self.except_items_with_adult_rating())
    }
}

/// [`MangaRepository`] over the configured manga collection.
#[derive(Debug, Clone)]
pub struct DefaultMangaRepository {
    base: DatabaseRepository,
}

impl DefaultMangaRepository {
    /// Wraps a manga [`DatabaseRepository`].
    pub fn new(base: DatabaseRepository) -> Self {
        debug_assert_eq!(base.kind(), MediaKind::Manga);
        Self { base }
    }

    /// Builds the repository from configuration.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(DatabaseRepository::for_kind(MediaKind::Manga, config))
    }
}

impl Repository for DefaultMangaRepository {
    fn base(&self) -> &DatabaseRepository {
        &self.base
    }
}

impl MangaRepository for DefaultMangaRepository {}

/// Publishing entries ranked best first. Expects adult entries already
/// removed.
pub fn top_publishing<Q: QueryOps>(target: Q) -> Q {
    filters::order_by_rank(target.filter_eq(fields::PUBLISHING, true))
}

/// Not-yet-published entries ranked best first.
pub fn top_upcoming_manga<Q: QueryOps>(target: Q) -> Q {
    filters::order_by_rank(target.filter_eq(fields::STATUS, MangaStatus::Upcoming))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BackendKind, CompiledQuery};
    use serde_json::json;

    fn repo() -> DefaultMangaRepository {
        DefaultMangaRepository::from_config(&CatalogConfig::default())
    }

    #[test]
    fn test_top_upcoming_pipeline() {
        let CompiledQuery::Find(spec) = repo().top_upcoming_items().build().unwrap() else {
            panic!("expected a find");
        };
        assert_eq!(
            spec.filter,
            json!({ "$and": [
                { "type": { "$ne": "Doujinshi" } },
                { "demographics.mal_id": { "$ne": 12 } },
                { "demographics.mal_id": { "$ne": 49 } },
                { "genres.mal_id": { "$ne": 12 } },
                { "status": { "$eq": "Not yet published" } },
                { "rank": { "$exists": true, "$ne": null } },
                { "rank": { "$gt": 0 } },
            ]})
        );
    }

    #[test]
    fn test_top_publishing_on_search_variant() {
        let repo = repo();
        let target = top_publishing(repo.exclude_nsfw_items(repo.queryable(true)));
        let CompiledQuery::Search(request) = target.build().unwrap() else {
            panic!("expected a search");
        };
        assert_eq!(
            request.filter_by.as_deref(),
            Some(
                "type:!=`Doujinshi` && demographics:!=12 && demographics:!=49 && genres:!=12 \
                 && publishing:=true && rank:!=0 && rank:>0"
            )
        );
        assert_eq!(request.sort_by.as_deref(), Some("rank:asc"));
        assert_eq!(target.backend(), BackendKind::SearchIndex);
    }
}
