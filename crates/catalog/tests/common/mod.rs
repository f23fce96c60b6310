//! Shared test infrastructure: record fixtures and an executor harness.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;

use std::collections::BTreeSet;

use serde_json::Value;

use catalog_query::backends::memory::MemoryExecutor;
use catalog_query::config::CatalogConfig;
use catalog_query::core::QueryExecutor;
use catalog_query::query::QueryTarget;
use catalog_query::repository::{DefaultAnimeRepository, DefaultMangaRepository};
use catalog_query::types::Pagination;

/// Large enough to return every fixture in one page.
pub const ALL: Pagination = Pagination {
    page: 1,
    limit: 1_000,
};

/// An executor holding `documents` in the `anime` collection.
pub fn anime_executor(documents: Vec<Value>) -> MemoryExecutor {
    let executor = MemoryExecutor::new();
    executor.extend("anime", documents);
    executor
}

/// An executor holding `documents` in the `manga` collection.
pub fn manga_executor(documents: Vec<Value>) -> MemoryExecutor {
    let executor = MemoryExecutor::new();
    executor.extend("manga", documents);
    executor
}

/// The anime repository over default collections.
pub fn anime_repository() -> DefaultAnimeRepository {
    DefaultAnimeRepository::from_config(&CatalogConfig::default())
}

/// The manga repository over default collections.
pub fn manga_repository() -> DefaultMangaRepository {
    DefaultMangaRepository::from_config(&CatalogConfig::default())
}

/// Runs the target and returns the ids of every match, in result order.
pub async fn fetch_ids(executor: &MemoryExecutor, target: &QueryTarget) -> Vec<i64> {
    let page = executor
        .execute(target, &ALL)
        .await
        .expect("target executes");
    page.data
        .iter()
        .map(|doc| doc["mal_id"].as_i64().expect("fixture has an id"))
        .collect()
}

/// Runs the target and returns the set of matching ids.
pub async fn fetch_id_set(executor: &MemoryExecutor, target: &QueryTarget) -> BTreeSet<i64> {
    fetch_ids(executor, target).await.into_iter().collect()
}

/// Runs the target and returns the matching documents.
pub async fn fetch_documents(executor: &MemoryExecutor, target: &QueryTarget) -> Vec<Value> {
    executor
        .execute(target, &ALL)
        .await
        .expect("target executes")
        .data
}
