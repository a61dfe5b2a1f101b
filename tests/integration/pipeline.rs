//! End-to-end transfer runs against mock source and destination accounts

use crate::support::*;
use google_drive_transfer::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source_server(trash_fails: bool) -> MockServer {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                { "id": "f1", "name": "FY21_Audit_Acme_20230101.pdf" },
                { "id": "f2", "name": "FY21_Notes.txt" },
                { "id": "f3", "name": "FY21_Budget_Acme_20220101.xlsx" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(batch_response(&[
            (0, 200, json!({ "id": "perm-1" })),
            (1, 200, json!({ "id": "perm-3" })),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    let trash = if trash_fails {
        ResponseTemplate::new(404).set_body_json(google_error(404, "notFound", "File not found"))
    } else {
        ResponseTemplate::new(200).set_body_json(json!({ "id": "f1", "name": "x", "trashed": true }))
    };
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/drive/v3/files/f[13]$"))
        .respond_with(trash)
        .mount(&server)
        .await;

    server
}

async fn destination_server() -> MockServer {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "emailAddress": "dest@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(batch_response(&[
            (0, 200, json!({ "id": "copy-1", "name": "FY21_Audit_Acme_20230101.pdf" })),
            (1, 500, google_error(500, "backendError", "Backend Error")),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    server
}

fn config(trash: bool) -> TransferConfig {
    TransferConfig::builder()
        .patterns(["FY21"])
        .min_age_years(Some(2))
        .trash(trash)
        .copy_delay(Duration::ZERO)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_transfer_run() {
    let source = source_server(false).await;
    let destination = destination_server().await;

    let report = TransferOrchestrator::new(
        config(true),
        Arc::new(client_for(&source)),
        Arc::new(client_for(&destination)),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.discovered, 3);
    let selected: Vec<&str> = report.selected.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(selected, vec!["f1", "f3"]);
    assert_eq!(report.destination, "dest@example.com");
    assert_eq!(report.succeeded(Operation::Share), 2);
    assert_eq!(report.copies[0].new_id(), Some("copy-1"));
    assert!(matches!(
        report.copies[1].failure(),
        Some(ToleratedFailure::Item { status: Some(500), .. })
    ));
    assert_eq!(report.succeeded(Operation::Trash), 2);

    // The source sees the listing, then the grant batch, then the trash calls.
    let requests = source.received_requests().await.unwrap();
    let sequence: Vec<String> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            "GET /drive/v3/files",
            "POST /batch/drive/v3",
            "PATCH /drive/v3/files/f1",
            "PATCH /drive/v3/files/f3",
        ]
    );

    let listing = &requests[0];
    let query = listing
        .url
        .query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(query.starts_with("(name contains 'FY21') and createdTime < '"));

    let grant = String::from_utf8_lossy(&requests[1].body).to_string();
    assert!(grant.contains("POST /drive/v3/files/f1/permissions?sendNotificationEmail=false&fields=id"));
    assert!(grant.contains("POST /drive/v3/files/f3/permissions?sendNotificationEmail=false&fields=id"));
    assert!(!grant.contains("files/f2/"));
}

#[tokio::test]
async fn test_trash_failures_are_tolerated() {
    let source = source_server(true).await;
    let destination = destination_server().await;

    let report = TransferOrchestrator::new(
        config(true),
        Arc::new(client_for(&source)),
        Arc::new(client_for(&destination)),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.trashes.len(), 2);
    assert_eq!(report.failed(Operation::Trash), 2);
    assert_eq!(report.trashes[0].file_name.as_deref(), Some("FY21_Audit_Acme_20230101.pdf"));
}

#[tokio::test]
async fn test_failed_listing_aborts_run() {
    let source = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(400).set_body_json(google_error(
            400,
            "invalidQuery",
            "Invalid Value",
        )))
        .mount(&source)
        .await;
    let destination = setup_mock_server().await;

    let result = TransferOrchestrator::new(
        config(false),
        Arc::new(client_for(&source)),
        Arc::new(client_for(&destination)),
    )
    .run()
    .await;

    assert!(matches!(
        result,
        Err(TransferError::Drive(GoogleDriveError::Request(_)))
    ));
    assert!(destination.received_requests().await.unwrap().is_empty());
}
