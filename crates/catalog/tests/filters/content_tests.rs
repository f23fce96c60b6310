//! Content exclusion filters.

use std::collections::BTreeSet;

use serde_json::Value;

use catalog_query::filters::{
    ContentFlags, ListingParams, except_items_with_adult_rating, exclude_kids_items,
    exclude_unapproved_items, only_kids_items,
};
use catalog_query::model::{MangaType, MediaKind, categories};
use catalog_query::repository::Repository;

use crate::common::*;

fn relation_ids(doc: &Value, field: &str) -> Vec<i64> {
    doc[field]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["mal_id"].as_i64()).collect())
        .unwrap_or_default()
}

fn is_adult_anime(doc: &Value) -> bool {
    let demographics = relation_ids(doc, "demographics");
    doc["rating"] == "Rx - Hentai"
        || demographics.contains(&categories::HENTAI)
        || demographics.contains(&categories::EROTICA)
        || relation_ids(doc, "genres").contains(&categories::HENTAI)
}

#[tokio::test]
async fn test_kids_filters_partition_the_catalog() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    let all = fetch_id_set(&executor, &repo.queryable(false)).await;
    let without_kids = fetch_id_set(&executor, &exclude_kids_items(repo.queryable(false))).await;
    let only_kids = fetch_id_set(&executor, &only_kids_items(repo.queryable(false))).await;

    assert!(without_kids.is_disjoint(&only_kids));
    let union: BTreeSet<i64> = without_kids.union(&only_kids).copied().collect();
    assert_eq!(union, all);
    assert_eq!(only_kids, BTreeSet::from([6]));
}

#[tokio::test]
async fn test_adult_exclusion_matches_rating_and_categories() {
    let catalog = anime_catalog();
    let expected: BTreeSet<i64> = catalog
        .iter()
        .filter(|doc| !is_adult_anime(doc))
        .filter_map(|doc| doc["mal_id"].as_i64())
        .collect();

    let executor = anime_executor(catalog);
    let repo = anime_repository();
    let actual = fetch_id_set(&executor, &repo.except_items_with_adult_rating()).await;

    assert_eq!(actual, expected);
    assert_eq!(actual, BTreeSet::from([1, 6, 7, 8, 9, 10]));
}

#[tokio::test]
async fn test_adult_exclusion_for_manga_drops_doujinshi() {
    let executor = manga_executor(vec![
        MangaFixture::new(1, "Berserk").build(),
        MangaFixture::new(2, "Circle Book")
            .with_type(MangaType::Doujinshi)
            .build(),
        MangaFixture::new(3, "Erotica Magazine Serial")
            .with_demographic(categories::EROTICA)
            .build(),
        MangaFixture::new(4, "Hentai Genre").with_genre(categories::HENTAI).build(),
    ]);
    let repo = manga_repository();

    let ids = fetch_ids(
        &executor,
        &except_items_with_adult_rating(repo.queryable(false), MediaKind::Manga),
    )
    .await;
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_unapproved_entries_are_hidden() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    let ids = fetch_id_set(&executor, &exclude_unapproved_items(repo.queryable(false))).await;
    assert!(!ids.contains(&8));
    assert_eq!(ids.len(), 9);
}

#[tokio::test]
async fn test_content_flags_from_listing_parameters() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    let defaults = ContentFlags::from_params(&ListingParams::new()).unwrap();
    let ids = fetch_id_set(&executor, &repo.apply_content_flags(repo.queryable(false), defaults))
        .await;
    assert!(!ids.contains(&6), "kids entries are hidden by default");
    assert!(!ids.contains(&8), "unapproved entries are hidden by default");
    assert!(ids.contains(&2), "adult entries are shown unless sfw is set");

    let params = ListingParams::new()
        .with("sfw", "")
        .with("kids", "true")
        .with("unapproved", "1");
    let flags = ContentFlags::from_params(&params).unwrap();
    let ids = fetch_id_set(&executor, &repo.apply_content_flags(repo.queryable(false), flags)).await;
    assert_eq!(ids, BTreeSet::from([1, 6, 7, 8, 9, 10]));
}
