//! Integration tests for the record sources using wiremock

use futures_util::TryStreamExt;
use prstats::source::{Detail, GithubSource, MirrorSource, PullRecord, RecordSource, RequestCounter, RequestTopic};
use prstats::stats::StatsError;
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_pull(number: u64, created_at: &str, state: &str, merged_at: Option<&str>, login: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "created_at": created_at,
        "state": state,
        "merged_at": merged_at,
        "base": { "ref": "master" },
        "user": { "login": login }
    })
}

fn github_source(server: &MockServer, counter: RequestCounter) -> GithubSource {
    GithubSource::new(Some("test_token"), server.uri(), HashSet::new(), counter).expect("Failed to create source")
}

async fn collect(source: &impl RecordSource, repo: &str, detail: Detail) -> Result<Vec<PullRecord>, StatsError> {
    source.fetch(repo, detail).try_collect().await
}

#[tokio::test]
async fn test_github_pagination_follows_link_header() {
    let server = MockServer::start().await;

    let next_link = format!("<{}/repos/acme/widget/pulls?state=all&per_page=100&page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next_link.as_str())
                .set_body_json(serde_json::json!([
                    listing_pull(1, "2020-06-15T08:30:00Z", "closed", Some("2020-06-16T00:00:00Z"), "alice"),
                    listing_pull(2, "2020-06-20T08:30:00Z", "closed", None, "bob"),
                ])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(3, "2020-07-01T08:30:00Z", "open", None, "carol"),
        ])))
        .mount(&server)
        .await;

    let counter = RequestCounter::new();
    let source = github_source(&server, counter.clone());
    let records = collect(&source, "acme/widget", Detail::List).await.expect("Failed to fetch records");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].number, 1);
    assert_eq!(records[2].number, 3);
    assert_eq!(counter.count(RequestTopic::Pages), 2);
    assert_eq!(counter.count(RequestTopic::Details), 0);
}

#[tokio::test]
async fn test_github_waits_out_rate_limit() {
    let server = MockServer::start().await;

    // First request is rate limited with a reset time already in the past,
    // so the retry is immediate.
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "0"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(1, "2020-06-15T08:30:00Z", "open", None, "alice"),
        ])))
        .mount(&server)
        .await;

    let source = github_source(&server, RequestCounter::new());
    let records = collect(&source, "acme/widget", Detail::List).await.expect("Failed to fetch records");

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_github_resolves_changed_lines_on_demand() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(7, "2020-06-15T08:30:00Z", "open", None, "alice"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "number": 7,
            "additions": 100,
            "deletions": 20
        })))
        .mount(&server)
        .await;

    let counter = RequestCounter::new();
    let source = github_source(&server, counter.clone());
    let records = collect(&source, "acme/widget", Detail::Full).await.expect("Failed to fetch records");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].changed_lines, Some(120));
    assert_eq!(counter.count(RequestTopic::Pages), 1);
    assert_eq!(counter.count(RequestTopic::Details), 1);
}

#[tokio::test]
async fn test_github_list_detail_skips_detail_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(7, "2020-06-15T08:30:00Z", "open", None, "alice"),
        ])))
        .mount(&server)
        .await;

    let counter = RequestCounter::new();
    let source = github_source(&server, counter.clone());
    let records = collect(&source, "acme/widget", Detail::List).await.expect("Failed to fetch records");

    assert_eq!(records[0].changed_lines, None);
    assert_eq!(counter.count(RequestTopic::Details), 0);
}

#[tokio::test]
async fn test_github_failed_detail_is_missing_metric() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(9, "2020-06-15T08:30:00Z", "open", None, "alice"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = github_source(&server, RequestCounter::new());
    let err = collect(&source, "acme/widget", Detail::Full).await.expect_err("Expected a missing metric error");

    assert!(matches!(err, StatsError::MissingMetric { number: 9 }));
}

#[tokio::test]
async fn test_github_server_error_is_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = github_source(&server, RequestCounter::new());
    let err = collect(&source, "acme/widget", Detail::List).await.expect_err("Expected a source error");

    assert!(matches!(err, StatsError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn test_mirror_offset_pagination_stops_on_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            listing_pull(1, "2020-06-15T08:30:00Z", "open", None, "alice"),
            listing_pull(2, "2020-06-20T08:30:00Z", "closed", None, "bob"),
        ])))
        .mount(&server)
        .await;

    let counter = RequestCounter::new();
    let source = MirrorSource::new(server.uri(), HashSet::new(), counter.clone()).expect("Failed to create source");
    let records = collect(&source, "acme/widget", Detail::List).await.expect("Failed to fetch records");

    assert_eq!(records.len(), 2);
    assert_eq!(counter.count(RequestTopic::Pages), 1);
}

#[tokio::test]
async fn test_mirror_error_status_is_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = MirrorSource::new(server.uri(), HashSet::new(), RequestCounter::new()).expect("Failed to create source");
    let err = collect(&source, "acme/widget", Detail::List).await.expect_err("Expected a source error");

    assert!(matches!(err, StatsError::SourceUnavailable { .. }));
}
