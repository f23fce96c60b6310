//! Catalog configuration.
//!
//! [`CatalogConfig`] names the collections each entity lives in (the same name
//! is used in the document store and the search index), bounds page sizes and
//! carries the default search options handed to the search query factory.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::MediaKind;
use crate::types::{Pagination, SearchOptions};

/// Configuration shared by the repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Prefix applied to every collection name (e.g. `"staging_"`).
    #[serde(default)]
    pub collection_prefix: String,

    /// Anime collection name.
    #[serde(default = "default_anime_collection")]
    pub anime_collection: String,

    /// Manga collection name.
    #[serde(default = "default_manga_collection")]
    pub manga_collection: String,

    /// Page size used when a request does not ask for one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a request may ask for.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Options for search-index queries.
    #[serde(default)]
    pub search: SearchOptions,
}

fn default_anime_collection() -> String {
    MediaKind::Anime.default_collection().to_string()
}

fn default_manga_collection() -> String {
    MediaKind::Manga.default_collection().to_string()
}

fn default_page_size() -> u32 {
    25
}

fn default_max_page_size() -> u32 {
    25
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collection_prefix: String::new(),
            anime_collection: default_anime_collection(),
            manga_collection: default_manga_collection(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            search: SearchOptions::default(),
        }
    }
}

impl CatalogConfig {
    /// Creates a configuration from `CATALOG_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparseable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let search = SearchOptions {
            per_page: env_parse("CATALOG_SEARCH_PER_PAGE").unwrap_or(defaults.search.per_page),
            num_typos: env_parse("CATALOG_SEARCH_NUM_TYPOS").unwrap_or(defaults.search.num_typos),
            prefix: env_parse("CATALOG_SEARCH_PREFIX").unwrap_or(defaults.search.prefix),
            exhaustive_search: env_parse("CATALOG_SEARCH_EXHAUSTIVE")
                .unwrap_or(defaults.search.exhaustive_search),
        };

        Self {
            collection_prefix: std::env::var("CATALOG_COLLECTION_PREFIX")
                .unwrap_or(defaults.collection_prefix),
            anime_collection: std::env::var("CATALOG_ANIME_COLLECTION")
                .unwrap_or(defaults.anime_collection),
            manga_collection: std::env::var("CATALOG_MANGA_COLLECTION")
                .unwrap_or(defaults.manga_collection),
            default_page_size: env_parse("CATALOG_DEFAULT_PAGE_SIZE")
                .unwrap_or(defaults.default_page_size),
            max_page_size: env_parse("CATALOG_MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size),
            search,
        }
    }

    /// The full collection name for an entity, prefix included.
    pub fn collection_name(&self, kind: MediaKind) -> String {
        let base = match kind {
            MediaKind::Anime => &self.anime_collection,
            MediaKind::Manga => &self.manga_collection,
        };
        format!("{}{}", self.collection_prefix, base)
    }

    /// Builds a page request, filling in and clamping the page size.
    pub fn pagination(&self, page: Option<u32>, limit: Option<u32>) -> Pagination {
        Pagination {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(self.default_page_size).max(1),
        }
        .clamped(self.max_page_size)
    }

    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.anime_collection.trim().is_empty() {
            errors.push("anime_collection must not be empty".to_string());
        }
        if self.manga_collection.trim().is_empty() {
            errors.push("manga_collection must not be empty".to_string());
        }
        if self.collection_name(MediaKind::Anime) == self.collection_name(MediaKind::Manga) {
            errors.push("anime and manga collections must differ".to_string());
        }
        if self.default_page_size == 0 {
            errors.push("default_page_size must be at least 1".to_string());
        }
        if self.max_page_size < self.default_page_size {
            errors.push(format!(
                "max_page_size ({}) must not be below default_page_size ({})",
                self.max_page_size, self.default_page_size
            ));
        }
        if self.search.per_page == 0 {
            errors.push("search.per_page must be at least 1".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable environment variable");
            None
        }
    }
}
