//! Integration tests using WireMock
//!
//! These tests drive the Drive client and the transfer pipeline against mock
//! HTTP servers, covering request encoding, batch decoding, authentication
//! and error mapping.

mod auth;
mod client;
mod pipeline;

pub mod support {
    use google_drive_transfer::mocks::MockAuthProvider;
    use google_drive_transfer::GoogleDriveClient;
    use serde_json::Value;
    use wiremock::{MockServer, ResponseTemplate};

    pub const TOKEN: &str = "test-token";

    const BOUNDARY: &str = "batch_test_boundary";

    /// Helper to start a mock server
    pub async fn setup_mock_server() -> MockServer {
        MockServer::start().await
    }

    /// Helper to create a client talking to `server`
    pub fn client_for(server: &MockServer) -> GoogleDriveClient {
        GoogleDriveClient::builder()
            .auth_provider(MockAuthProvider::new(TOKEN))
            .base_url(format!("{}/drive/v3/", server.uri()))
            .batch_url(format!("{}/batch/drive/v3", server.uri()))
            .build()
            .expect("Failed to build client")
    }

    /// Helper to create a batch response with one part per `(item, status, body)`
    pub fn batch_response(parts: &[(usize, u16, Value)]) -> ResponseTemplate {
        let mut body = String::new();
        for (item, status, json) in parts {
            body.push_str(&format!(
                "--{}\r\nContent-Type: application/http\r\nContent-ID: <response-item-{}>\r\n\r\n\
                 HTTP/1.1 {} {}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
                BOUNDARY,
                item,
                status,
                if *status < 300 { "OK" } else { "Error" },
                json
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        ResponseTemplate::new(200).set_body_raw(
            body,
            &format!("multipart/mixed; boundary={}", BOUNDARY),
        )
    }

    /// Helper to create a Google API error body
    pub fn google_error(code: u16, reason: &str, message: &str) -> Value {
        serde_json::json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{ "domain": "global", "reason": reason, "message": message }]
            }
        })
    }
}
