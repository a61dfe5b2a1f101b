//! Integration tests for cached credentials driving the client

use google_drive_transfer::config::scopes::DRIVE;
use google_drive_transfer::prelude::*;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn test_cached_token_authorizes_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/about"))
        .and(header("authorization", "Bearer cached-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "emailAddress": "src@example.com" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let credentials = write_file(
        &dir,
        "credentials.json",
        &json!({
            "installed": {
                "client_id": "client.apps.googleusercontent.com",
                "client_secret": "secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "http://127.0.0.1:9/token",
                "redirect_uris": ["http://localhost"]
            }
        })
        .to_string(),
    );
    let token = write_file(
        &dir,
        "token_user1.json",
        &json!({
            "token": "cached-access",
            "refresh_token": "refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": [DRIVE],
            "expiry": "2999-01-01T00:00:00Z"
        })
        .to_string(),
    );

    let secrets = ClientSecrets::from_file(&credentials).unwrap();
    let auth = AuthorizedUserProvider::load_or_authorize(secrets, &token, vec![DRIVE.to_string()])
        .await
        .unwrap();

    let client = GoogleDriveClient::builder()
        .auth_provider(auth)
        .base_url(format!("{}/drive/v3", mock_server.uri()))
        .build()
        .unwrap();

    assert_eq!(client.account_email().await.unwrap(), "src@example.com");
}

#[test]
fn test_missing_credentials_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ClientSecrets::from_file(dir.path().join("credentials.json")).is_err());
}
