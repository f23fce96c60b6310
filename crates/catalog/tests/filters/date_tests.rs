//! Date-range filters.

use chrono::{DateTime, FixedOffset};

use catalog_query::filters::{aired_between, filter_by_end_date, filter_by_start_date, midnight_utc};
use catalog_query::model::MediaKind;
use catalog_query::repository::Repository;

use crate::common::*;

fn instant(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

#[test]
fn test_midnight_of_own_calendar_date() {
    let normalised = midnight_utc(instant("2024-03-15T14:30:00+09:00"));
    assert_eq!(normalised.to_rfc3339(), "2024-03-15T00:00:00+00:00");

    // 01:00 in Tokyo is the previous evening in UTC; the local date wins.
    let normalised = midnight_utc(instant("2024-03-15T01:00:00+09:00"));
    assert_eq!(normalised.to_rfc3339(), "2024-03-15T00:00:00+00:00");
}

#[tokio::test]
async fn test_start_date_bound_is_inclusive_midnight() {
    let executor = anime_executor(vec![
        AnimeFixture::new(1, "Day Before")
            .aired_from("2024-03-14T23:00:00+00:00")
            .build(),
        AnimeFixture::new(2, "Midnight")
            .aired_from("2024-03-15T00:00:00+00:00")
            .build(),
        AnimeFixture::new(3, "Afternoon")
            .aired_from("2024-03-15T15:00:00+00:00")
            .build(),
        AnimeFixture::new(4, "No Date").build(),
    ]);
    let repo = anime_repository();

    let target = filter_by_start_date(
        repo.queryable(false),
        MediaKind::Anime,
        instant("2024-03-15T14:30:00+09:00"),
    );
    assert_eq!(fetch_ids(&executor, &target).await, vec![2, 3]);
}

#[tokio::test]
async fn test_end_date_bound() {
    let executor = anime_executor(vec![
        AnimeFixture::new(1, "Ended Early")
            .aired_to("2020-01-01T00:00:00+00:00")
            .build(),
        AnimeFixture::new(2, "Ended Late")
            .aired_to("2021-06-01T00:00:00+00:00")
            .build(),
    ]);
    let repo = anime_repository();

    let target = filter_by_end_date(
        repo.queryable(false),
        MediaKind::Anime,
        instant("2020-12-31T18:00:00+00:00"),
    );
    assert_eq!(fetch_ids(&executor, &target).await, vec![1]);
}

#[tokio::test]
async fn test_aired_between_reaches_end_of_month() {
    let executor = anime_executor(vec![
        AnimeFixture::new(1, "New Year")
            .aired_from("2024-01-01T00:00:00+00:00")
            .build(),
        AnimeFixture::new(2, "Leap Day Late")
            .aired_from("2024-02-29T23:30:00+00:00")
            .build(),
        AnimeFixture::new(3, "March")
            .aired_from("2024-03-01T00:00:00+00:00")
            .build(),
        AnimeFixture::new(4, "December")
            .aired_from("2023-12-31T22:00:00+00:00")
            .build(),
    ]);
    let repo = anime_repository();

    let target = aired_between(
        repo.queryable(false),
        instant("2024-01-01T09:00:00+00:00"),
        instant("2024-02-01T00:00:00+00:00"),
    )
    .unwrap();
    assert_eq!(fetch_ids(&executor, &target).await, vec![1, 2]);
}
