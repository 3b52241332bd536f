//! Integration tests using mock HTTP server
//!
//! Tests the full flow: HTTP client as page fetcher → paged sequence chain → CLI output

use futures::StreamExt;
use pipedrive_pager::cli::{list, OutputFormat};
use pipedrive_pager::{
    ClientConfig, Error, HttpClient, HttpClientConfig, PageFetcher, PageOptions, PagedSequence,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Deal {
    id: u64,
    title: String,
}

fn client(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(format!("{}/v1", server.uri()))
        .api_token("test-token")
        .max_retries(0)
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

async fn mount_page(server: &MockServer, start: &str, limit: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/deals"))
        .and(query_param("start", start))
        .and(query_param("limit", limit))
        .and(query_param("api_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn deals(ids: &[u64]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({"id": id, "title": format!("Deal {id}")}))
            .collect(),
    )
}

// ============================================================================
// Paging Over HTTP
// ============================================================================

#[tokio::test]
async fn test_end_to_end_chain_over_http() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "0",
        "2",
        json!({
            "success": true,
            "data": deals(&[1, 2, 3]),
            "additional_data": {"pagination": {
                "start": 0,
                "limit": 2,
                "more_items_in_collection": true,
                "next_start": 3
            }}
        }),
    )
    .await;
    mount_page(
        &server,
        "3",
        "2",
        json!({
            "success": true,
            "data": deals(&[4, 5]),
            "additional_data": {"pagination": {
                "start": 3,
                "limit": 2,
                "more_items_in_collection": false,
                "next_start": null
            }}
        }),
    )
    .await;

    let fetcher: Arc<dyn PageFetcher<Deal>> = Arc::new(client(&server));
    let first = PagedSequence::fetch_first("deals", PageOptions::with_page_size(2), fetcher)
        .await
        .unwrap();

    let ids: Vec<u64> = first.iter().map(|deal| deal.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let second = first.next_page().await.unwrap().expect("second page");
    let ids: Vec<u64> = second.iter().map(|deal| deal.id).collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(second[1].title, "Deal 5");

    assert!(second.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_collect_all_over_http() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "0",
        "100",
        json!({"data": deals(&[1]), "additional_data": {"pagination": {"next_start": 1}}}),
    )
    .await;
    mount_page(
        &server,
        "1",
        "100",
        json!({
            "data": null,
            "additional_data": {"pagination": {"more_items_in_collection": false}}
        }),
    )
    .await;

    let fetcher: Arc<dyn PageFetcher<Deal>> = Arc::new(client(&server));
    let all = PagedSequence::fetch_first("deals", PageOptions::default(), fetcher)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(
        all,
        vec![Deal {
            id: 1,
            title: "Deal 1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_failed_page_aborts_traversal() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "0",
        "100",
        json!({"data": deals(&[1]), "additional_data": {"pagination": {"next_start": 1}}}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v1/deals"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let fetcher: Arc<dyn PageFetcher<Deal>> = Arc::new(client(&server));
    let first = PagedSequence::fetch_first("deals", PageOptions::default(), fetcher)
        .await
        .unwrap();

    let results: Vec<_> = first.pages().collect().await;
    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[1],
        Err(Error::HttpStatus { status: 401, .. })
    ));
}

// ============================================================================
// CLI Listing
// ============================================================================

#[tokio::test]
async fn test_cli_list_writes_json_lines() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "10",
        "1",
        json!({"data": deals(&[11]), "additional_data": {"pagination": {"next_start": 11}}}),
    )
    .await;
    mount_page(
        &server,
        "11",
        "1",
        json!({"data": deals(&[12]), "additional_data": {"pagination": {"next_start": 12}}}),
    )
    .await;

    let mut config = ClientConfig::new(format!("{}/v1", server.uri()));
    config.api_token = Some("test-token".to_string());
    config.http.max_retries = 0;
    config.http.requests_per_second = 0;

    let options = PageOptions::with_page_size(1).start_page(10).page_count(2);
    let mut out = Vec::new();
    let count = list(&config, "deals", options, OutputFormat::Json, &mut out)
        .await
        .unwrap();

    assert_eq!(count, 2);
    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0]["id"], 11);
    assert_eq!(lines[1]["id"], 12);
}
