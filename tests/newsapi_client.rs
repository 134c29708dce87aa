// tests/newsapi_client.rs
//
// Wire behavior of the reqwest NewsAPI client against a local mock server.

use std::time::Duration;

use headline_relay::error::{FailureClass, UpstreamError};
use headline_relay::upstream::newsapi::NewsApiClient;
use headline_relay::upstream::{Endpoint, UpstreamClient, UpstreamQuery};
use httpmock::prelude::*;
use serde_json::json;

const TIMEOUT: Duration = Duration::from_secs(5);

fn client(server: &MockServer) -> NewsApiClient {
    NewsApiClient::new(server.url("/v2"), "secret-key").expect("client")
}

#[tokio::test]
async fn sends_key_and_query_and_decodes_page() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/top-headlines")
                .query_param("apiKey", "secret-key")
                .query_param("country", "de")
                .query_param("category", "science")
                .query_param("page", "1")
                .query_param("pageSize", "5");
            then.status(200).json_body(json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {"source": {"id": null, "name": "Spiegel"}, "title": "A", "url": "https://a", "publishedAt": "2024-01-01T00:00:00Z"},
                    {"source": {"name": "Zeit"}, "title": "B", "url": "https://b", "publishedAt": "2024-01-02T00:00:00Z", "content": "..."}
                ]
            }));
        })
        .await;

    let q = UpstreamQuery::region("de", Some("science"), None, 5);
    let page = client(&server)
        .fetch(Endpoint::TopHeadlines, &q, TIMEOUT)
        .await
        .expect("page");

    mock.assert_async().await;
    assert_eq!(page.status, "ok");
    assert_eq!(page.total_results, 2);
    assert_eq!(page.articles.len(), 2);
    assert_eq!(page.articles[0].source.name.as_deref(), Some("Spiegel"));
    assert_eq!(page.articles[1].content.as_deref(), Some("..."));
}

#[tokio::test]
async fn search_parameters_reach_everything() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("q", "rust lang")
                .query_param("language", "en")
                .query_param("sortBy", "publishedAt");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        })
        .await;

    let q = UpstreamQuery {
        q: Some("rust lang".into()),
        language: Some("en".into()),
        sort_by: Some("publishedAt".into()),
        page: 1,
        page_size: 20,
        ..Default::default()
    };
    let page = client(&server)
        .fetch(Endpoint::Everything, &q, TIMEOUT)
        .await
        .expect("page");
    mock.assert_async().await;
    assert!(page.articles.is_empty());
}

#[tokio::test]
async fn plan_restriction_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(426).json_body(json!({
                "status": "error",
                "code": "parameterInvalid",
                "message": "You are trying to request results too far in the past."
            }));
        })
        .await;

    let err = client(&server)
        .fetch(Endpoint::Everything, &UpstreamQuery::default(), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(426));
    assert_eq!(err.class(), FailureClass::PermissionRestricted);
    assert!(err.to_string().contains("parameterInvalid"), "{err}");
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(503).body("maintenance");
        })
        .await;

    let err = client(&server)
        .fetch(Endpoint::TopHeadlines, &UpstreamQuery::region("us", None, None, 5), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.class(), FailureClass::Transient);
}

#[tokio::test]
async fn error_body_with_success_status_is_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200)
                .json_body(json!({"status": "error", "code": "unexpectedError", "message": "boom"}));
        })
        .await;

    let err = client(&server)
        .fetch(Endpoint::TopHeadlines, &UpstreamQuery::region("us", None, None, 5), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let err = client(&server)
        .fetch(Endpoint::TopHeadlines, &UpstreamQuery::region("us", None, None, 5), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        })
        .await;

    let err = client(&server)
        .fetch(
            Endpoint::TopHeadlines,
            &UpstreamQuery::region("us", None, None, 5),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn client_built_from_config_uses_configured_key_and_base() {
    use headline_relay::config::AppConfig;

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/top-headlines")
                .query_param("apiKey", "cfg-key");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        })
        .await;

    let cfg = AppConfig::default()
        .with_api_key("cfg-key")
        .with_base_url(server.url("/v2/"));
    let client = NewsApiClient::from_config(&cfg).expect("client");
    client
        .fetch(Endpoint::TopHeadlines, &UpstreamQuery::region("ca", None, None, 5), TIMEOUT)
        .await
        .expect("page");
    mock.assert_async().await;
}
