mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn server_endpoints_work() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{}/", server.base)).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "refdata-server");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["cache"], "local");

    // GET /healthz
    let resp = client
        .get(format!("{}/healthz", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let resp = client
        .get(format!("{}/readyz", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    server.stop().await;
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/healthz", server.base))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "abc-123");

    let resp = client
        .get(format!("{}/healthz", server.base))
        .send()
        .await
        .unwrap();
    let minted = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(minted).is_ok());

    server.stop().await;
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = TestServer::start().await;
    let resp = reqwest::get(server.url("planet")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    server.stop().await;
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_text() {
    refdata_server::metrics::init_metrics();
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    client
        .post(server.url("region"))
        .json(&serde_json::json!({"id": "EU"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .get(format!("{}/metrics", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body = resp.text().await.unwrap();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("record_operations_total"));

    server.stop().await;
}
