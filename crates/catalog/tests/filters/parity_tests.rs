//! Both backends select the same records.
//!
//! Store results come from the in-memory executor. Search results come from
//! evaluating the compiled `filter_by` against the indexed form of the same
//! records.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use catalog_query::filters::{filter_by_end_date, filter_by_start_date, order_by_rank};
use catalog_query::model::MediaKind;
use catalog_query::query::{CompiledQuery, QueryOps, QueryTarget};
use catalog_query::repository::Repository;
use catalog_query::schema::{DefaultTitleSimplifier, Searchable};
use catalog_query::types::fields;

use crate::common::*;

fn instant(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

fn records() -> Vec<AnimeFixture> {
    vec![
        AnimeFixture::new(1, "Finished In 2020")
            .aired_from("2019-10-01T00:00:00+00:00")
            .aired_to("2020-06-01T00:00:00+00:00")
            .with_score(Some(8.5))
            .with_episodes(Some(12))
            .with_rank(Some(10)),
        AnimeFixture::new(2, "Still Airing")
            .aired_from("2021-01-01T00:00:00+00:00")
            .with_score(None)
            .with_episodes(None)
            .with_rank(None),
        AnimeFixture::new(3, "Finished In 2021")
            .aired_from("2020-04-01T00:00:00+00:00")
            .aired_to("2021-03-01T00:00:00+00:00")
            .with_score(Some(6.0))
            .with_episodes(Some(24))
            .with_rank(Some(0)),
        AnimeFixture::new(4, "Unscheduled")
            .with_score(None)
            .with_rank(None),
    ]
}

/// Evaluates a `filter_by` made of `&&`-joined numeric terms.
fn index_matches(document: &Value, filter_by: &str) -> bool {
    filter_by.split(" && ").all(|term| {
        let (name, condition) = term.split_once(':').expect("term names a field");
        let value = document[name].as_f64().expect("indexed field is numeric");
        let number = |text: &str| text.parse::<f64>().expect("numeric literal");

        if let Some(range) = condition.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (lo, hi) = range.split_once("..").expect("range has two bounds");
            return number(lo) <= value && value <= number(hi);
        }
        let (op, bound) = ["!=", ">=", "<=", "=", ">", "<"]
            .into_iter()
            .find_map(|op| condition.strip_prefix(op).map(|rest| (op, number(rest))))
            .expect("known comparison");
        match op {
            "!=" => value != bound,
            ">=" => value >= bound,
            "<=" => value <= bound,
            "=" => value == bound,
            ">" => value > bound,
            _ => value < bound,
        }
    })
}

fn search_ids(target: &QueryTarget) -> BTreeSet<i64> {
    let CompiledQuery::Search(request) = target.build().unwrap() else {
        panic!("expected a search");
    };
    records()
        .into_iter()
        .map(|record| record.document().to_searchable_document(&DefaultTitleSimplifier))
        .filter(|doc| {
            request
                .filter_by
                .as_deref()
                .is_none_or(|filter_by| index_matches(doc, filter_by))
        })
        .map(|doc| doc["mal_id"].as_i64().expect("indexed id"))
        .collect()
}

async fn assert_backends_agree(
    pipeline: impl Fn(QueryTarget) -> QueryTarget,
    expected: &[i64],
) {
    let executor = anime_executor(records().into_iter().map(AnimeFixture::build).collect());
    let repo = anime_repository();

    let store = fetch_id_set(&executor, &pipeline(repo.queryable(false))).await;
    let search = search_ids(&pipeline(repo.queryable(true)));
    assert_eq!(store, expected.iter().copied().collect::<BTreeSet<_>>());
    assert_eq!(search, store);
}

#[tokio::test]
async fn test_end_date_bound_skips_records_without_end_date() {
    assert_backends_agree(
        |t| filter_by_end_date(t, MediaKind::Anime, instant("2020-12-31T00:00:00+00:00")),
        &[1],
    )
    .await;
}

#[tokio::test]
async fn test_start_date_bound_agrees() {
    assert_backends_agree(
        |t| filter_by_start_date(t, MediaKind::Anime, instant("2020-01-01T00:00:00+00:00")),
        &[2, 3],
    )
    .await;
}

#[tokio::test]
async fn test_upper_score_bounds_skip_unscored_records() {
    assert_backends_agree(|t| t.filter_lte(fields::SCORE, 8.0), &[3]).await;
    assert_backends_agree(|t| t.filter_range(fields::SCORE, 0.0, 9.0), &[1, 3]).await;
    assert_backends_agree(|t| t.filter_lt(fields::EPISODES, 13i64), &[1]).await;
}

#[tokio::test]
async fn test_presence_and_rank_filters_agree() {
    assert_backends_agree(|t| t.filter_not_null(fields::SCORE), &[1, 3]).await;
    assert_backends_agree(order_by_rank, &[1]).await;
}

#[tokio::test]
async fn test_negations_keep_records_without_a_value() {
    assert_backends_agree(|t| t.filter_ne(fields::EPISODES, 12i64), &[2, 3, 4]).await;
    assert_backends_agree(|t| t.filter_gt(fields::SCORE, 7.0), &[1]).await;
}
