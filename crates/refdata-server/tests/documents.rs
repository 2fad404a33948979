mod common;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

async fn seed_country(server: &TestServer, client: &reqwest::Client) {
    let resp = client
        .post(server.url("country"))
        .json(&json!({"id": "FR", "name": "France"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn upload(client: &reqwest::Client, server: &TestServer, body: Value) -> (StatusCode, Value) {
    let resp = client
        .post(server.url("country-document"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn upload_then_download() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;

    let (status, body) = upload(
        &client,
        &server,
        json!({
            "country_id": "FR",
            "name": "Annual Report",
            "document_type": "Economy",
            "filetype": "pdf",
            "filesize": 1,
            "filename": STANDARD.encode(PDF),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let id = data["id"].as_str().expect("generated id").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(data["filesize"], PDF.len() as i64);
    assert!(data.get("filename").is_none(), "payload is never echoed");

    let on_disk = server
        .documents
        .path()
        .join(&id[..1])
        .join(&id);
    assert_eq!(std::fs::read(on_disk).unwrap(), PDF);

    let resp = client
        .get(server.url(&format!("country-document/{id}/file")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(
        resp.headers()["content-disposition"].to_str().unwrap(),
        format!("attachment; filename=\"Annual Report {id} - Attachment - Economy.pdf\"")
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PDF);

    server.stop().await;
}

#[tokio::test]
async fn documents_are_listed_per_country() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;
    client
        .post(server.url("country"))
        .json(&json!({"id": "DE", "name": "Germany"}))
        .send()
        .await
        .unwrap();

    for country in ["FR", "FR", "DE"] {
        let (status, _) = upload(
            &client,
            &server,
            json!({"country_id": country, "filename": STANDARD.encode(PDF)}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let resp = client
        .get(server.url("country-document/FR/list"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d["country_id"] == "FR"));

    let resp = client.get(server.url("country-document")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn invalid_uploads_are_rejected() {
    let server = TestServer::start_with(|cfg| cfg.documents.max_upload_bytes = 64).await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;

    let (status, body) = upload(
        &client,
        &server,
        json!({"country_id": "FR", "filename": "%%% not base64"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "not valid base64");

    let (status, body) = upload(&client, &server, json!({"country_id": "FR"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "not valid base64");

    let (status, body) = upload(
        &client,
        &server,
        json!({"country_id": "FR", "filename": STANDARD.encode(b"GIF89a....")}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "not a valid PDF");

    let mut big = PDF.to_vec();
    big.resize(65, b' ');
    let (status, body) = upload(
        &client,
        &server,
        json!({"country_id": "FR", "filename": STANDARD.encode(&big)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "file too large");

    // Unknown country: nothing may be left behind on disk
    let (status, _) = upload(
        &client,
        &server,
        json!({"country_id": "ZZ", "filename": STANDARD.encode(PDF)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let leftovers = walk(server.documents.path());
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");

    server.stop().await;
}

#[tokio::test]
async fn failed_reupload_keeps_existing_file() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;

    let id = uuid::Uuid::new_v4().to_string();
    let (status, _) = upload(
        &client,
        &server,
        json!({"id": id, "country_id": "FR", "filename": STANDARD.encode(PDF)}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let other = b"%PDF-1.7 replacement".to_vec();
    let (status, body) = upload(
        &client,
        &server,
        json!({"id": id, "country_id": "FR", "filename": STANDARD.encode(&other)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "CountryDocument with this ID already exists");

    let resp = client
        .get(server.url(&format!("country-document/{id}/file")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PDF);

    server.stop().await;
}

async fn replace(
    client: &reqwest::Client,
    server: &TestServer,
    id: &str,
    body: Value,
) -> (StatusCode, Value) {
    let resp = client
        .put(server.url(&format!("country-document/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn update_keeps_recorded_filesize() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;

    let (_, body) = upload(
        &client,
        &server,
        json!({"country_id": "FR", "name": "Draft", "filename": STANDARD.encode(PDF)}),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = replace(
        &client,
        &server,
        &id,
        json!({"country_id": "FR", "name": "Final", "filesize": 999_999}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Final");
    assert_eq!(body["data"]["filesize"], PDF.len() as i64);

    let (status, body) = replace(&client, &server, &id, json!({"country_id": "FR"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filesize"], PDF.len() as i64);

    let resp = client
        .get(server.url(&format!("country-document/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["filesize"], PDF.len() as i64);

    server.stop().await;
}

#[tokio::test]
async fn update_cannot_change_document_id() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    seed_country(&server, &client).await;

    let (_, body) = upload(
        &client,
        &server,
        json!({"country_id": "FR", "filename": STANDARD.encode(PDF)}),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let new_id = uuid::Uuid::new_v4().to_string();

    let (status, body) = replace(
        &client,
        &server,
        &id,
        json!({"id": new_id, "country_id": "FR", "name": "Moved"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "document id cannot be changed");

    let resp = client
        .get(server.url(&format!("country-document/{id}/file")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PDF);

    let resp = client
        .get(server.url(&format!("country-document/{new_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    server.stop().await;
}

#[tokio::test]
async fn download_of_unknown_document_is_404() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(server.url(&format!(
            "country-document/{}/file",
            uuid::Uuid::new_v4()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "File not found");

    server.stop().await;
}

fn walk(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(walk(&path));
        } else {
            files.push(path);
        }
    }
    files
}
