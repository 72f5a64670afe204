//! End-to-end tests: a real relay server talking to a fake Notion API over HTTP.
//!
//! Each test spawns the fake API and a relay router on 127.0.0.1:0, then
//! drives the relay with reqwest the way a browser client would.

mod common;

use std::sync::Arc;

use caserelay_core::UploadTarget;
use caserelay_server::test_helpers::{spawn_router, test_http_settings, test_relay_config};
use caserelay_service::{HttpNotionClient, RelayService};
use common::{spawn_fake_notion, FakeNotion, FakeOptions, Recorded, FAKE_API_KEY, FAKE_VERSION};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

async fn spawn_relay_with(fake: &FakeNotion, api_key: &str, target: UploadTarget) -> String {
    let client = HttpNotionClient::new(&fake.base_url, api_key.into(), FAKE_VERSION.into());
    let mut config = test_relay_config();
    config.upload_target = target;
    let relay = RelayService::new(Arc::new(client), config);
    let app = caserelay_server::build_router(relay, &test_http_settings());
    spawn_router(app).await.base_url
}

async fn spawn_relay(fake: &FakeNotion) -> String {
    spawn_relay_with(fake, FAKE_API_KEY, UploadTarget::UploadUrl).await
}

fn file_part(name: &str, mime: &str, content: &'static [u8]) -> Part {
    Part::bytes(content)
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

fn pages(recorded: &[Recorded]) -> Vec<Value> {
    recorded
        .iter()
        .filter_map(|r| match r {
            Recorded::CreatePage(body) => Some(body.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn multipart_submission_uploads_files_then_creates_page() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay(&fake).await;

    let form = Form::new()
        .text("fileName", "Signed contract")
        .text("date", "2024-03-01")
        .text("link", "https://mail.example.com/msg/99")
        .text("linkedCase", "case-page-1")
        .text("messageId", "<99@mail.example.com>")
        .text("emailBody", "Please find the contract attached.")
        .part("files", file_part("contract.pdf", "application/pdf", b"%PDF-1.7 contract"))
        .part("files", file_part("photo.png", "image/png", b"\x89PNG"));

    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let page_id = body["pageId"].as_str().unwrap().to_string();

    let recorded = fake.recorded();
    assert_eq!(recorded.len(), 6, "{recorded:#?}");

    // Each upload slot is followed by the transfer to that same slot.
    let mut upload_ids = Vec::new();
    for (slot, send, name, mime, bytes) in [
        (&recorded[0], &recorded[1], "contract.pdf", "application/pdf", &b"%PDF-1.7 contract"[..]),
        (&recorded[2], &recorded[3], "photo.png", "image/png", &b"\x89PNG"[..]),
    ] {
        let Recorded::CreateUpload(slot_body) = slot else {
            panic!("expected upload slot, got {slot:?}");
        };
        assert_eq!(
            slot_body,
            &json!({ "mode": "single_part", "filename": name, "content_type": mime })
        );
        let Recorded::Send {
            upload_id,
            filename,
            content_type,
            content,
        } = send
        else {
            panic!("expected transfer, got {send:?}");
        };
        assert_eq!(filename, name);
        assert_eq!(content_type, mime);
        assert_eq!(content.as_slice(), bytes);
        upload_ids.push(upload_id.clone());
    }

    let Recorded::CreatePage(page) = &recorded[4] else {
        panic!("expected page creation, got {:?}", recorded[4]);
    };
    assert_eq!(page["parent"], json!({ "database_id": "dashboard-db" }));
    let props = &page["properties"];
    assert_eq!(
        props["File"]["files"],
        json!([
            { "type": "file_upload", "name": "contract.pdf", "file_upload": { "id": upload_ids[0] } },
            { "type": "file_upload", "name": "photo.png", "file_upload": { "id": upload_ids[1] } }
        ])
    );
    assert_eq!(props["File Type"], json!({ "select": { "name": "Email" } }));
    assert_eq!(props["Date"], json!({ "date": { "start": "2024-03-01" } }));
    assert_eq!(props["Link"], json!({ "url": "https://mail.example.com/msg/99" }));
    assert_eq!(props["Linked Case"], json!({ "relation": [{ "id": "case-page-1" }] }));
    assert_eq!(
        props["Message ID"]["rich_text"][0]["text"]["content"],
        "<99@mail.example.com>"
    );

    let Recorded::Append { block_id, body } = &recorded[5] else {
        panic!("expected block append, got {:?}", recorded[5]);
    };
    assert_eq!(block_id, &page_id);
    assert_eq!(
        body["children"][0]["paragraph"]["rich_text"][0]["text"]["content"],
        "Please find the contract attached."
    );
}

#[tokio::test]
async fn invoice_json_submission() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay(&fake).await;

    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .json(&json!({ "fileName": "Invoice #42", "date": "2024-01-05" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["pageId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("warning").is_none());

    let pages = pages(&fake.recorded());
    assert_eq!(pages.len(), 1);
    let props = pages[0]["properties"].as_object().unwrap();
    let mut keys: Vec<_> = props.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["Date", "File", "File Name", "File Type"]);
    assert_eq!(props["File Name"]["title"][0]["text"]["content"], "Invoice #42");
    assert_eq!(props["File"], json!({ "files": [] }));
}

#[tokio::test]
async fn failed_transfer_aborts_without_page() {
    let fake = spawn_fake_notion(FakeOptions {
        fail_upload_named: Some("broken.bin".into()),
        ..Default::default()
    })
    .await;
    let relay = spawn_relay(&fake).await;

    let form = Form::new()
        .text("fileName", "Broken")
        .part("files", file_part("broken.bin", "application/octet-stream", b"\x00\x01"));
    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "message": "The file upload could not be completed." })
    );
    assert!(pages(&fake.recorded()).is_empty());
}

#[tokio::test]
async fn send_endpoint_target_posts_to_generic_endpoint() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay_with(&fake, FAKE_API_KEY, UploadTarget::SendEndpoint).await;

    let form = Form::new()
        .text("fileName", "Endpoint upload")
        .part("files", file_part("a.txt", "text/plain", b"hello"));
    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(pages(&fake.recorded()).len(), 1);
}

#[tokio::test]
async fn bad_token_surfaces_notion_message() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay_with(&fake, "secret_wrong", UploadTarget::UploadUrl).await;

    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .json(&json!({ "fileName": "Unauthorized" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "message": "API token is invalid." })
    );
}

#[tokio::test]
async fn missing_file_name_never_reaches_notion() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay(&fake).await;

    let form = Form::new()
        .text("date", "2024-01-05")
        .part("files", file_part("a.txt", "text/plain", b"hello"));
    let resp = reqwest::Client::new()
        .post(format!("{relay}/add-task"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(fake.recorded().is_empty());
}

#[tokio::test]
async fn search_cases_over_http() {
    let fake = spawn_fake_notion(FakeOptions {
        cases: vec![
            ("case-1".into(), "Smith v. Jones".into()),
            ("case-2".into(), "Estate of Brown".into()),
            ("case-3".into(), String::new()),
        ],
        ..Default::default()
    })
    .await;
    let relay = spawn_relay(&fake).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{relay}/search-cases"))
        .query(&[("q", " smith ")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "results": [{ "id": "case-1", "title": "Smith v. Jones" }] })
    );

    let resp = client
        .get(format!("{relay}/search-cases"))
        .query(&[("q", "s")])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "results": [] }));

    let queries: Vec<_> = fake
        .recorded()
        .into_iter()
        .filter_map(|r| match r {
            Recorded::Query { database_id, body } => Some((database_id, body)),
            _ => None,
        })
        .collect();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].0, "case-db");
    assert_eq!(
        queries[0].1,
        json!({
            "filter": { "property": "File Name", "title": { "contains": "smith" } },
            "page_size": 10
        })
    );
}

#[tokio::test]
async fn health_is_ok() {
    let fake = spawn_fake_notion(FakeOptions::default()).await;
    let relay = spawn_relay(&fake).await;
    let body: Value = reqwest::get(format!("{relay}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}
