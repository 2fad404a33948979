mod common;

use common::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn seed_geography(server: &TestServer, client: &reqwest::Client) {
    let (status, _) = post(client, server.url("region"), json!({"id": "EU"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        client,
        server.url("sub-region"),
        json!({"id": "WEU", "subregion_id": "EU"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        client,
        server.url("country"),
        json!({"id": "FR", "subregion_id": "WEU", "name": "France"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn region_is_bare_and_country_is_enveloped() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, server.url("region"), json!({"id": "EU"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "EU", "subregions": []}));

    let (_, body) = post(
        &client,
        server.url("sub-region"),
        json!({"id": "WEU", "subregion_id": "EU"}),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "WEU");
    assert_eq!(body["data"]["countries"], json!([]));

    let (_, body) = post(
        &client,
        server.url("country"),
        json!({"id": "FR", "subregion_id": "WEU", "name": "France"}),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "France");

    server.stop().await;
}

#[tokio::test]
async fn reads_embed_children_recursively() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let (status, body) = get(&client, server.url("region/EU")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subregions"][0]["id"], "WEU");
    assert_eq!(body["subregions"][0]["countries"][0]["name"], "France");

    let (status, body) = get(&client, server.url("sub-region/WEU")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["countries"][0]["id"], "FR");

    // Lists bypass the mirror and come back bare for regions
    let (status, body) = get(&client, server.url("region")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "EU");
    assert_eq!(body[0]["subregions"][0]["id"], "WEU");
    assert_eq!(body[0]["subregions"][0]["countries"][0]["id"], "FR");

    // Sub-region lists are bare too
    let (_, body) = get(&client, server.url("sub-region/")).await;
    assert!(body.is_array());
    assert_eq!(body[0]["id"], "WEU");

    server.stop().await;
}

#[tokio::test]
async fn missing_rows_report_family_status() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, server.url("country/ZZ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "message": "Country not found"}));

    let (status, body) = get(&client, server.url("region/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Region not found");

    let (status, _) = get(&client, server.url("sector/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Update and delete of a missing country are plain 404s
    let resp = client
        .put(server.url("country/ZZ"))
        .json(&json!({"name": "Nowhere"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = client.delete(server.url("country/ZZ")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn duplicate_and_orphan_creates_are_rejected() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let (status, body) = post(
        &client,
        server.url("country"),
        json!({"id": "FR", "name": "France again"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Country with this ID already exists");

    let (status, _) = post(
        &client,
        server.url("country"),
        json!({"id": "XX", "subregion_id": "ATLANTIS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn malformed_keys_are_unprocessable() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, server.url("country-contact/abc")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, _) = get(&client, server.url("country-document/not-a-uuid")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    server.stop().await;
}

#[tokio::test]
async fn serial_keys_are_assigned_on_create() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let (status, body) = post(
        &client,
        server.url("country-contact"),
        json!({"country_id": "FR", "govt_contact": "Elysee"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_i64().expect("assigned id");

    let (status, body) = get(&client, server.url(&format!("country-contact/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["govt_contact"], "Elysee");

    server.stop().await;
}

#[tokio::test]
async fn update_replaces_the_row() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let resp = client
        .put(server.url("country/FR"))
        .json(&json!({"name": "French Republic", "capital_city": "Paris"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "FR");
    assert_eq!(body["data"]["name"], "French Republic");
    // Columns missing from the body are cleared
    assert_eq!(body["data"]["subregion_id"], Value::Null);

    server.stop().await;
}

#[tokio::test]
async fn deleting_a_region_cascades() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let resp = client.delete(server.url("region/EU")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"id": "EU"}));

    let (status, _) = get(&client, server.url("sub-region/WEU")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&client, server.url("country/FR")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    server.stop().await;
}

#[tokio::test]
async fn country_delete_answers_an_empty_envelope() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_geography(&server, &client).await;

    let resp = client.delete(server.url("country/FR")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "data": null}));

    server.stop().await;
}

#[tokio::test]
async fn list_window_honours_skip_and_limit() {
    let server = TestServer::start_with(|cfg| {
        cfg.list.default_limit = 2;
        cfg.list.max_limit = 3;
    })
    .await;
    let client = reqwest::Client::new();

    for id in ["A", "B", "C", "D"] {
        let (status, _) = post(
            &client,
            server.url("sector-industry"),
            json!({"id": id, "name": format!("Industry {id}")}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = get(&client, server.url("sector-industry")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = get(&client, server.url("sector-industry?limit=50")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = get(&client, server.url("sector-industry?skip=3&limit=3")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    server.stop().await;
}
