//! Magazine, producer and genre filters.

use std::collections::BTreeSet;

use catalog_query::QueryError;
use catalog_query::filters::{
    filter_by_genres, filter_by_magazine, filter_by_magazines, filter_by_producers,
};
use catalog_query::repository::Repository;

use crate::common::*;

fn magazine_catalog() -> Vec<serde_json::Value> {
    vec![
        MangaFixture::new(1, "Weekly Five").serialized_in(5).build(),
        MangaFixture::new(2, "Monthly Seven").serialized_in(7).build(),
        MangaFixture::new(3, "Both").serialized_in(5).serialized_in(7).build(),
        MangaFixture::new(4, "Elsewhere").serialized_in(9).build(),
        MangaFixture::new(5, "Unserialized").build(),
    ]
}

#[tokio::test]
async fn test_blank_magazines_is_noop() {
    let executor = manga_executor(magazine_catalog());
    let repo = manga_repository();

    let all = fetch_id_set(&executor, &repo.queryable(false)).await;
    for blank in ["", "   ", ",,"] {
        let target = filter_by_magazines(repo.queryable(false), blank).unwrap();
        assert_eq!(fetch_id_set(&executor, &target).await, all, "{:?}", blank);
    }
}

#[tokio::test]
async fn test_magazine_list_is_union_of_single_magazines() {
    let executor = manga_executor(magazine_catalog());
    let repo = manga_repository();

    let listed = fetch_id_set(
        &executor,
        &filter_by_magazines(repo.queryable(false), "5,,7").unwrap(),
    )
    .await;
    let five = fetch_id_set(&executor, &filter_by_magazine(repo.queryable(false), "5").unwrap()).await;
    let seven = fetch_id_set(&executor, &filter_by_magazine(repo.queryable(false), "7").unwrap()).await;

    let union: BTreeSet<i64> = five.union(&seven).copied().collect();
    assert_eq!(listed, union);
    assert_eq!(listed, BTreeSet::from([1, 2, 3]));
}

#[tokio::test]
async fn test_non_numeric_magazine_is_rejected() {
    let repo = manga_repository();
    let err = filter_by_magazines(repo.queryable(false), "5,jump").unwrap_err();
    assert!(matches!(err, QueryError::InvalidParameter { .. }));
}

#[tokio::test]
async fn test_producers_and_genres() {
    let executor = anime_executor(vec![
        AnimeFixture::new(1, "Studio A").with_producer(10).with_genre(1).with_genre(4).build(),
        AnimeFixture::new(2, "Studio B").with_producer(11).with_genre(1).build(),
        AnimeFixture::new(3, "Studio C").with_producer(12).with_genre(4).build(),
    ]);
    let repo = anime_repository();

    let target = filter_by_producers(repo.queryable(false), "10, 11").unwrap();
    assert_eq!(fetch_ids(&executor, &target).await, vec![1, 2]);

    let target = filter_by_genres(repo.queryable(false), "1,4").unwrap();
    assert_eq!(fetch_ids(&executor, &target).await, vec![1]);
}
