//! Integration tests for the remote file service over HTTP

use crate::support::*;
use google_drive_transfer::batch::BatchItemError;
use google_drive_transfer::prelude::*;
use google_drive_transfer::types::PermissionRole;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_sends_query_and_fields() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("q", "name contains 'FY21'"))
        .and(query_param("pageSize", "1000"))
        .and(query_param("pageToken", "cursor-1"))
        .and(query_param("fields", "nextPageToken, files(id, name)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "cursor-2",
            "files": [
                { "id": "1", "name": "FY21_Audit_Acme_20230101.pdf" },
                { "id": "2", "name": "FY21_Notes.txt" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let list = client
        .list("name contains 'FY21'", 1000, Some("cursor-1".to_string()))
        .await
        .unwrap();

    assert_eq!(list.next_page_token.as_deref(), Some("cursor-2"));
    assert_eq!(list.files.len(), 2);
    assert_eq!(list.files[0].name, "FY21_Audit_Acme_20230101.pdf");
}

#[tokio::test]
async fn test_account_email() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/about"))
        .and(query_param("fields", "user(emailAddress)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "emailAddress": "dest@example.com", "displayName": "Dest" }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    assert_eq!(client.account_email().await.unwrap(), "dest@example.com");
}

#[tokio::test]
async fn test_unauthorized_listing_is_an_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(google_error(
            401,
            "authError",
            "Invalid Credentials",
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.list("name contains 'x'", 1000, None).await;

    assert!(matches!(result, Err(GoogleDriveError::Authentication(_))));
}

#[tokio::test]
async fn test_batch_copy_reports_each_file() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains("POST /drive/v3/files/a/copy HTTP/1.1"))
        .and(body_string_contains("POST /drive/v3/files/b/copy HTTP/1.1"))
        .and(body_string_contains("POST /drive/v3/files/c/copy HTTP/1.1"))
        .respond_with(batch_response(&[
            (2, 200, json!({ "id": "copy-c", "name": "c" })),
            (0, 200, json!({ "id": "copy-a", "name": "a" })),
            (1, 403, google_error(403, "insufficientFilePermissions", "No access")),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let results = client.batch_copy(&ids).await.unwrap();

    let keys: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(results[0].result.as_ref().unwrap().id, "copy-a");
    assert!(matches!(
        results[1].result,
        Err(BatchItemError::Failed { status, .. }) if status.as_u16() == 403
    ));
    assert_eq!(results[2].result.as_ref().unwrap().id, "copy-c");
}

#[tokio::test]
async fn test_batch_permission_request_encoding() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .and(body_string_contains(
            "POST /drive/v3/files/a/permissions?sendNotificationEmail=false&fields=id HTTP/1.1",
        ))
        .and(body_string_contains(r#""role":"writer""#))
        .and(body_string_contains(r#""emailAddress":"dest@example.com""#))
        .respond_with(batch_response(&[(0, 200, json!({ "id": "perm-1" }))]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = CreatePermissionRequest::user("dest@example.com", PermissionRole::Writer);
    let results = client
        .batch_create_permission(&["a".to_string()], &request)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result.as_ref().unwrap().id, "perm-1");
}

#[tokio::test]
async fn test_failed_batch_call_is_an_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("retry-after", "30")
                .set_body_json(google_error(503, "backendError", "Backend Error")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client.batch_copy(&["a".to_string()]).await.unwrap_err();

    assert!(matches!(error, GoogleDriveError::Server(_)));
    assert!(error.is_retryable());
    assert_eq!(error.retry_after(), Some(std::time::Duration::from_secs(30)));
}

#[tokio::test]
async fn test_trash_patches_file() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/abc"))
        .and(body_json(json!({ "trashed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc", "name": "FY21_A", "trashed": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(google_error(
            404,
            "notFound",
            "File not found: gone.",
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    assert!(client.trash("abc").await.unwrap().trashed);
    let missing = client.trash("gone").await;
    assert_eq!(
        missing.unwrap_err().status_code().map(|s| s.as_u16()),
        Some(404)
    );
}
