//! Request handling for the query preview API.
//!
//! Handlers are plain functions over [`PreviewState`]; the axum layer in
//! [`server`](super::server) only extracts parameters and maps
//! [`HandlerError::status_code`] onto the response.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::QueryError;
use crate::filters::{self, ListingParams, parse_date};
use crate::model::{AnimeType, MediaKind, ScheduleFilter};
use crate::query::{BackendKind, CompiledQuery, QueryTarget};
use crate::repository::{
    AnimeRepository, DefaultAnimeRepository, DefaultMangaRepository, Repository,
    currently_airing, top_airing, top_publishing, top_upcoming_anime, top_upcoming_manga,
    upcoming_season,
};
use crate::types::Pagination;

/// Named queries served for every entity.
pub const COMMON_QUERIES: &[&str] = &["sfw", "popular", "favorites", "ranked", "search"];

/// Named queries served for anime only.
pub const ANIME_QUERIES: &[&str] = &[
    "top_airing",
    "top_upcoming",
    "currently_airing",
    "aired_between",
    "upcoming_season",
];

/// Named queries served for manga only.
pub const MANGA_QUERIES: &[&str] = &["top_publishing", "top_upcoming"];

/// Repositories and configuration shared by every request.
#[derive(Debug, Clone)]
pub struct PreviewState {
    config: CatalogConfig,
    anime: DefaultAnimeRepository,
    manga: DefaultMangaRepository,
}

impl PreviewState {
    /// Builds both repositories from one configuration.
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            anime: DefaultAnimeRepository::from_config(&config),
            manga: DefaultMangaRepository::from_config(&config),
            config,
        }
    }

    /// The catalog configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn repository(&self, kind: MediaKind) -> &dyn Repository {
        match kind {
            MediaKind::Anime => &self.anime,
            MediaKind::Manga => &self.manga,
        }
    }
}

/// Errors returned by the preview handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Unknown entity or query name.
    #[error("{0}")]
    NotFound(String),

    /// The query could not be composed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl HandlerError {
    /// HTTP status for the error: 404 for unknown routes, 400 for bad
    /// parameters and 500 for pipelines the backend cannot express.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::NotFound(_) => 404,
            HandlerError::Query(err) if err.is_configuration_error() => 500,
            HandlerError::Query(_) => 400,
        }
    }

    /// JSON error body.
    pub fn to_json(&self) -> Value {
        json!({ "error": self.to_string(), "status": self.status_code() })
    }
}

/// Query-string parameters of a named query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    /// `store` (default) or `search`.
    pub backend: Option<String>,
    /// Anime type for `aired_between` and `upcoming_season`.
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    /// Lower date bound for `aired_between`.
    pub from: Option<String>,
    /// Upper date bound for `aired_between`.
    pub to: Option<String>,
    /// Broadcast filter for `currently_airing`.
    pub filter: Option<String>,
    /// Search term for `search`.
    pub q: Option<String>,
}

/// A compiled named query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Entity queried.
    pub entity: MediaKind,
    /// Query name.
    pub name: String,
    /// Backend the query compiles for.
    pub backend: BackendKind,
    /// The compiled query.
    pub query: CompiledQuery,
}

/// A compiled listing request.
#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    /// Entity listed.
    pub entity: MediaKind,
    /// Backend the listing compiles for.
    pub backend: BackendKind,
    /// The page that was compiled.
    pub pagination: Pagination,
    /// The compiled query.
    pub query: CompiledQuery,
}

/// Describes the search-index collection of an entity.
pub fn handle_schema(state: &PreviewState, entity: &str) -> Result<Value, HandlerError> {
    let kind = parse_entity(entity)?;
    let schema = kind.schema();
    let collection = state.config.collection_name(kind);
    Ok(json!({
        "collection": schema.collection_schema(&collection),
        "query_by": schema.query_by_fields(),
        "query_by_weights": schema.query_by_weights(),
        "default_sort_by": schema.default_sort_by(),
    }))
}

/// Lists the named queries an entity serves.
pub fn handle_query_names(entity: &str) -> Result<Vec<&'static str>, HandlerError> {
    let specific = match parse_entity(entity)? {
        MediaKind::Anime => ANIME_QUERIES,
        MediaKind::Manga => MANGA_QUERIES,
    };
    Ok(specific.iter().chain(COMMON_QUERIES).copied().collect())
}

/// Compiles a named repository query.
pub fn handle_query(
    state: &PreviewState,
    entity: &str,
    name: &str,
    request: &QueryRequest,
) -> Result<QueryResponse, HandlerError> {
    let kind = parse_entity(entity)?;
    let for_search = parse_backend(request.backend.as_deref())?;
    debug!(entity = %kind, name, for_search, "compiling named query");

    let target = match kind {
        MediaKind::Anime => anime_query(&state.anime, name, for_search, request)?,
        MediaKind::Manga => manga_query(&state.manga, name, for_search)?,
    };
    let target = match target {
        Some(target) => target,
        None => common_query(state.repository(kind), state, name, for_search, request)?,
    };

    Ok(QueryResponse {
        entity: kind,
        name: name.to_string(),
        backend: target.backend(),
        query: target.build_paged(&state.config.pagination(None, None))?,
    })
}

/// Compiles a listing request.
///
/// `backend`, `page` and `limit` select the backend and page; `q` is the
/// search term; everything else goes through the entity's filter registry.
pub fn handle_listing(
    state: &PreviewState,
    entity: &str,
    mut params: ListingParams,
) -> Result<ListingResponse, HandlerError> {
    let kind = parse_entity(entity)?;
    let for_search = parse_backend(params.get("backend"))?;
    params.remove("backend");

    let page = parse_count(&params, "page")?;
    let limit = parse_count(&params, "limit")?;
    let pagination = state.config.pagination(page, limit);

    let repository = state.repository(kind);
    let term = params.get("q").unwrap_or_default().to_string();
    let target = repository.queryable_with(for_search, &term, &state.config.search);
    let target = repository.base().registry().apply(target, &params)?;

    Ok(ListingResponse {
        entity: kind,
        backend: target.backend(),
        pagination,
        query: target.build_paged(&pagination)?,
    })
}

fn anime_query(
    repo: &DefaultAnimeRepository,
    name: &str,
    for_search: bool,
    request: &QueryRequest,
) -> Result<Option<QueryTarget>, HandlerError> {
    let anime_type = parse_optional::<AnimeType>(request.media_type.as_deref())?;
    let fresh = || repo.queryable(for_search);

    let target = match name {
        "top_airing" => top_airing(repo.exclude_nsfw_items(fresh())),
        "top_upcoming" => top_upcoming_anime(repo.exclude_nsfw_items(fresh())),
        "currently_airing" => {
            let filter = parse_optional::<ScheduleFilter>(request.filter.as_deref())?;
            currently_airing(fresh(), filter)
        }
        "upcoming_season" => upcoming_season(fresh(), anime_type),
        "aired_between" if for_search => {
            return Err(QueryError::unsupported("aired_between", BackendKind::SearchIndex).into());
        }
        "aired_between" => {
            let from = required_date("from", request.from.as_deref())?;
            let to = required_date("to", request.to.as_deref())?;
            repo.aired_between(from, to, anime_type)?
        }
        _ => return Ok(None),
    };
    Ok(Some(target))
}

fn manga_query(
    repo: &DefaultMangaRepository,
    name: &str,
    for_search: bool,
) -> Result<Option<QueryTarget>, HandlerError> {
    let fresh = || repo.exclude_nsfw_items(repo.queryable(for_search));
    let target = match name {
        "top_publishing" => top_publishing(fresh()),
        "top_upcoming" => top_upcoming_manga(fresh()),
        _ => return Ok(None),
    };
    Ok(Some(target))
}

fn common_query(
    repo: &dyn Repository,
    state: &PreviewState,
    name: &str,
    for_search: bool,
    request: &QueryRequest,
) -> Result<QueryTarget, HandlerError> {
    let sfw = || repo.exclude_nsfw_items(repo.queryable(for_search));
    let target = match name {
        "sfw" => sfw(),
        "popular" => filters::order_by_popularity(sfw()),
        "favorites" => filters::order_by_favorite_count(sfw()),
        "ranked" => filters::order_by_rank(sfw()),
        "search" => repo.search(request.q.as_deref().unwrap_or_default(), &state.config.search)?,
        other => {
            return Err(HandlerError::NotFound(format!(
                "no query named '{}' for {}",
                other,
                repo.base().kind()
            )));
        }
    };
    Ok(target)
}

fn parse_entity(entity: &str) -> Result<MediaKind, HandlerError> {
    MediaKind::from_str(entity)
        .map_err(|_| HandlerError::NotFound(format!("unknown entity '{}'", entity)))
}

fn parse_backend(value: Option<&str>) -> Result<bool, HandlerError> {
    match value.map(str::trim) {
        None | Some("") | Some("store") | Some("document-store") => Ok(false),
        Some("search") | Some("search-index") => Ok(true),
        Some(other) => Err(QueryError::invalid(
            "backend",
            format!("expected 'store' or 'search', got '{}'", other),
        )
        .into()),
    }
}

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, HandlerError>
where
    T: FromStr<Err = QueryError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}

fn required_date(
    parameter: &str,
    value: Option<&str>,
) -> Result<chrono::DateTime<chrono::FixedOffset>, HandlerError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| QueryError::invalid(parameter, "a date is required"))?;
    Ok(parse_date(parameter, value)?)
}

fn parse_count(params: &ListingParams, name: &str) -> Result<Option<u32>, HandlerError> {
    match params.get(name).map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| QueryError::invalid(name, format!("'{}' is not a count", value)).into()),
        None => Ok(None),
    }
}
