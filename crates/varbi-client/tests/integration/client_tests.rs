use std::time::Duration;

use varbi_core::error::Absent;
use varbi_core::traits::ApiClient;

use crate::integration::common::{
    SLOW_ROUTE_DELAY, client_for, client_with_timeout, closed_addr, spawn_upstream,
};

#[tokio::test]
async fn fetch_returns_parsed_json() {
    let addr = spawn_upstream().await;
    let client = client_for(addr);

    let body = client
        .fetch("/jobs/taxonomies/occupation-field")
        .await
        .unwrap();

    assert_eq!(body["data"][0]["id"], "1");
    assert_eq!(body["data"][0]["attributes"]["name"], "IT");
}

#[tokio::test]
async fn fetch_sends_fixed_headers() {
    let addr = spawn_upstream().await;
    let client = client_for(addr);

    let body = client.fetch("/echo").await.unwrap();

    assert_eq!(body["path"], "/v1/echo");
    assert_eq!(body["accept"], "application/json");
    assert_eq!(body["accept_language"], "en, *;q=0.5");
    assert!(
        body["user_agent"]
            .as_str()
            .unwrap()
            .starts_with("varbi-mcp/")
    );
}

#[tokio::test]
async fn fetch_keeps_percent_encoded_query() {
    let addr = spawn_upstream().await;
    let client = client_for(addr);

    let body = client
        .fetch("/jobs?filter%5Btaxonomy%5D=17&limit=3")
        .await
        .unwrap();

    assert_eq!(body["query"], "filter%5Btaxonomy%5D=17&limit=3");
}

#[tokio::test]
async fn non_2xx_status_is_absent() {
    let addr = spawn_upstream().await;
    let client = client_for(addr);

    assert_eq!(client.fetch("/error").await, Err(Absent));
    assert_eq!(client.fetch("/does-not-exist").await, Err(Absent));
}

#[tokio::test]
async fn invalid_json_is_absent() {
    let addr = spawn_upstream().await;
    let client = client_for(addr);

    assert_eq!(client.fetch("/not-json").await, Err(Absent));
}

#[tokio::test]
async fn connection_refused_is_absent() {
    let client = client_for(closed_addr().await);

    assert_eq!(
        client.fetch("/jobs/taxonomies/occupation-field").await,
        Err(Absent)
    );
}

#[tokio::test]
async fn timeout_is_absent() {
    let addr = spawn_upstream().await;
    let client = client_with_timeout(addr, Duration::from_millis(200));

    let started = std::time::Instant::now();
    assert_eq!(client.fetch("/slow").await, Err(Absent));
    assert!(started.elapsed() < SLOW_ROUTE_DELAY);
}
