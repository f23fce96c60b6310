//! Catalog repositories.
//!
//! A repository owns two query factories, one per backend, and composes the
//! filter library into the named queries the API serves. Repositories never
//! execute anything: every method returns a fresh [`QueryTarget`] for a
//! [`QueryExecutor`](crate::core::QueryExecutor) to run.

mod anime;
mod manga;

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::config::CatalogConfig;
use crate::error::{QueryError, QueryResult};
use crate::filters::{self, ContentFlags, FilterRegistry, ListingParams};
use crate::model::MediaKind;
use crate::query::{
    BackendKind, QueryOps, QueryTarget, SearchQuery, SortDirection, SortKey, StoreQuery,
};
use crate::types::{SearchOptions, fields};

pub use anime::{
    AnimeRepository, DefaultAnimeRepository, currently_airing, top_airing, top_upcoming_anime,
    upcoming_season,
};
pub use manga::{DefaultMangaRepository, MangaRepository, top_publishing, top_upcoming_manga};

/// Creates a fresh document-store query.
pub type StoreFactory = Arc<dyn Fn() -> StoreQuery + Send + Sync>;

/// Creates a fresh search-index query for a term.
pub type SearchFactory = Arc<dyn Fn(&str, &SearchOptions) -> SearchQuery + Send + Sync>;

/// Backend selection shared by every repository.
#[derive(Clone)]
pub struct DatabaseRepository {
    kind: MediaKind,
    store_factory: StoreFactory,
    search_factory: SearchFactory,
    default_options: SearchOptions,
    registry: Arc<FilterRegistry>,
}

impl DatabaseRepository {
    /// Creates a repository from explicit factories.
    pub fn new(kind: MediaKind, store_factory: StoreFactory, search_factory: SearchFactory) -> Self {
        Self {
            kind,
            store_factory,
            search_factory,
            default_options: SearchOptions::default(),
            registry: Arc::new(FilterRegistry::for_kind(kind)),
        }
    }

    /// Creates a repository whose factories target the configured collection.
    pub fn for_kind(kind: MediaKind, config: &CatalogConfig) -> Self {
        let collection = config.collection_name(kind);
        let schema = kind.schema();

        let store_collection = collection.clone();
        let store_factory: StoreFactory = Arc::new(move || StoreQuery::new(store_collection.clone()));
        let search_factory: SearchFactory = Arc::new(move |term: &str, options: &SearchOptions| {
            SearchQuery::new(schema, collection.clone(), term, options)
        });

        Self::new(kind, store_factory, search_factory).with_search_options(config.search.clone())
    }

    /// Sets the options used by [`Self::queryable`] on the search backend.
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Replaces the listing filter registry.
    pub fn with_registry(mut self, registry: FilterRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// The entity this repository serves.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// The listing filter registry.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// A fresh, unconstrained target: the search index when `for_search` is
    /// set (matching every document), the document store otherwise.
    pub fn queryable(&self, for_search: bool) -> QueryTarget {
        self.queryable_with(for_search, "", &self.default_options)
    }

    /// Like [`Self::queryable`], with a search term and options for the
    /// search backend. Both are ignored for the document store.
    pub fn queryable_with(&self, for_search: bool, term: &str, options: &SearchOptions) -> QueryTarget {
        if for_search {
            trace!(entity = %self.kind, term, "selected search-index backend");
            QueryTarget::Search((self.search_factory)(term, options))
        } else {
            trace!(entity = %self.kind, "selected document-store backend");
            QueryTarget::Store((self.store_factory)())
        }
    }
}

impl fmt::Debug for DatabaseRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseRepository")
            .field("kind", &self.kind)
            .field("default_options", &self.default_options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Queries every catalog repository offers.
pub trait Repository: Send + Sync {
    /// The shared backend selection.
    fn base(&self) -> &DatabaseRepository;

    /// See [`DatabaseRepository::queryable`].
    fn queryable(&self, for_search: bool) -> QueryTarget {
        self.base().queryable(for_search)
    }

    /// See [`DatabaseRepository::queryable_with`].
    fn queryable_with(&self, for_search: bool, term: &str, options: &SearchOptions) -> QueryTarget {
        self.base().queryable_with(for_search, term, options)
    }

    /// A best-match search: weighted title fields, relevance first, then
    /// members.
    ///
    /// # Errors
    ///
    /// Fails when [`Self::queryable_with`] hands back a store target.
    fn search(&self, term: &str, options: &SearchOptions) -> QueryResult<QueryTarget> {
        let QueryTarget::Search(target) = self.queryable_with(true, term, options) else {
            return Err(QueryError::unsupported("search", BackendKind::DocumentStore));
        };
        let schema = target.schema();
        Ok(QueryTarget::Search(target.with_query_by(schema.query_by).order_by_relevance(
            SortDirection::Descending,
            [SortKey::new(fields::MEMBERS, SortDirection::Descending)],
        )))
    }

    /// A listing narrowed by request parameters.
    fn listing(&self, params: &ListingParams, for_search: bool) -> QueryResult<QueryTarget> {
        self.base()
            .registry()
            .apply(self.queryable(for_search), params)
    }

    /// All entries except adult ones, from the document store.
    fn except_items_with_adult_rating(&self) -> QueryTarget {
        self.exclude_nsfw_items(self.queryable(false))
    }

    /// Removes adult entries from `target`.
    fn exclude_nsfw_items(&self, target: QueryTarget) -> QueryTarget {
        filters::except_items_with_adult_rating(target, self.base().kind())
    }

    /// Removes kids entries from `target`.
    fn exclude_kids_items(&self, target: QueryTarget) -> QueryTarget {
        filters::exclude_kids_items(target)
    }

    /// Keeps only approved entries of `target`.
    fn exclude_unapproved_items(&self, target: QueryTarget) -> QueryTarget {
        filters::exclude_unapproved_items(target)
    }

    /// Applies the `sfw` / `kids` / `unapproved` flags to `target`.
    fn apply_content_flags(&self, target: QueryTarget, flags: ContentFlags) -> QueryTarget {
        flags.apply(target, self.base().kind())
    }

    /// Non-adult entries, most members first.
    fn order_by_popularity(&self) -> QueryTarget {
        filters::order_by_popularity(self.except_items_with_adult_rating())
    }

    /// Non-adult entries, most favorited first.
    fn order_by_favorite_count(&self) -> QueryTarget {
        filters::order_by_favorite_count(self.except_items_with_adult_rating())
    }

    /// Ranked non-adult entries, best rank first.
    fn order_by_rank(&self) -> QueryTarget {
        filters::order_by_rank(self.except_items_with_adult_rating())
    }
}
