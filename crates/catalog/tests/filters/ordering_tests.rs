//! Standard orderings.

use catalog_query::filters::{order_by_popularity, order_by_rank};
use catalog_query::query::{CompiledQuery, SortSpec};
use catalog_query::repository::Repository;

use crate::common::*;

#[tokio::test]
async fn test_order_by_rank_drops_unranked_and_sorts_ascending() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    let documents = fetch_documents(&executor, &order_by_rank(repo.queryable(false))).await;
    let ranks: Vec<i64> = documents
        .iter()
        .map(|doc| doc["rank"].as_i64().expect("ranked entries have a rank"))
        .collect();

    assert!(ranks.iter().all(|rank| *rank > 0));
    assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(ranks.len(), 7);
}

#[tokio::test]
async fn test_order_by_rank_is_idempotent() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    let once = fetch_ids(&executor, &order_by_rank(repo.queryable(false))).await;
    let twice = fetch_ids(&executor, &order_by_rank(order_by_rank(repo.queryable(false)))).await;
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_rank_zero_is_excluded() {
    let executor = manga_executor(vec![
        MangaFixture::new(1, "Unranked").with_rank(Some(0)).build(),
        MangaFixture::new(2, "Ranked").with_rank(Some(5)).build(),
    ]);
    let repo = manga_repository();

    assert_eq!(fetch_ids(&executor, &repo.order_by_rank()).await, vec![2]);
}

#[tokio::test]
async fn test_popularity_and_favorites_exclude_adult_entries() {
    let executor = anime_executor(anime_catalog());
    let repo = anime_repository();

    assert_eq!(
        fetch_ids(&executor, &repo.order_by_popularity()).await,
        vec![1, 7, 6, 10, 9, 8]
    );
    let by_favorites = fetch_ids(&executor, &repo.order_by_favorite_count()).await;
    assert_eq!(&by_favorites[..3], &[1, 7, 6]);
}

#[tokio::test]
async fn test_last_applied_ordering_is_primary() {
    let executor = manga_executor(vec![
        MangaFixture::new(1, "Best Ranked").with_rank(Some(1)).with_members(100).build(),
        MangaFixture::new(2, "Most Followed").with_rank(Some(2)).with_members(500).build(),
    ]);
    let repo = manga_repository();

    let target = order_by_popularity(order_by_rank(repo.queryable(false)));
    let CompiledQuery::Find(spec) = target.build().unwrap() else {
        panic!("expected a find");
    };
    assert_eq!(spec.sort, vec![SortSpec::new("members", -1), SortSpec::new("rank", 1)]);
    assert_eq!(fetch_ids(&executor, &target).await, vec![2, 1]);

    let target = order_by_rank(order_by_popularity(repo.queryable(false)));
    assert_eq!(fetch_ids(&executor, &target).await, vec![1, 2]);
}
