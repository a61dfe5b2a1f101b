//! Request executor with auth and error handling.

use crate::auth::AuthProvider;
use crate::batch::{correlate, parse_batch_response, BatchItemResult, BatchRequest};
use crate::config::GoogleDriveConfig;
use crate::errors::{GoogleDriveError, GoogleDriveResult};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use url::Url;

/// Request executor that handles HTTP requests with authentication and error mapping.
///
/// This is the core component that:
/// - Adds authentication headers to requests
/// - Executes requests through the HTTP transport
/// - Maps HTTP errors to domain errors
/// - Sends and decodes batch calls
pub struct RequestExecutor {
    /// Configuration
    config: GoogleDriveConfig,
    /// HTTP transport
    transport: Arc<dyn HttpTransport>,
    /// Authentication provider
    auth: Arc<dyn AuthProvider>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: GoogleDriveConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            auth,
        }
    }

    /// Executes a request and deserializes the JSON response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - API path (relative to base URL), including any query string
    /// * `body` - Request body
    pub async fn execute_request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> GoogleDriveResult<T> {
        let response = self.execute_request_raw(method, path, body).await?;

        serde_json::from_slice(&response).map_err(|e| {
            GoogleDriveError::deserialization(format!("Failed to deserialize response: {}", e))
        })
    }

    /// Executes a request and returns raw bytes.
    pub async fn execute_request_raw(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> GoogleDriveResult<Bytes> {
        let url = self.build_url(path)?;
        let mut headers = self.base_headers().await?;
        if matches!(body, RequestBody::Bytes(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        tracing::debug!(method = method.as_str(), url = %url, "Sending request");

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        if !response.status.is_success() {
            return Err(Self::error_from_response(&response));
        }

        Ok(response.body)
    }

    /// Sends a batch call and matches each sub-response to its key.
    ///
    /// `keys[i]` names the sub-request pushed as `item-i`. A transport
    /// failure or a non-success status on the batch call itself is returned
    /// as `Err`; sub-request failures are reported per item.
    pub async fn execute_batch<T: DeserializeOwned>(
        &self,
        batch: &BatchRequest,
        keys: &[String],
    ) -> GoogleDriveResult<Vec<BatchItemResult<T>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut headers = self.base_headers().await?;
        headers.insert(CONTENT_TYPE, header_value(&batch.content_type())?);

        tracing::debug!(
            url = %self.config.batch_url,
            sub_requests = batch.len(),
            "Sending batch request"
        );

        let response = self
            .transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                url: self.config.batch_url.clone(),
                headers,
                body: RequestBody::Bytes(batch.encode()),
            })
            .await?;

        if !response.status.is_success() {
            return Err(Self::error_from_response(&response));
        }

        let content_type = response.content_type().unwrap_or_default();
        let parts = parse_batch_response(content_type, &response.body)?;

        Ok(correlate(keys, parts))
    }

    /// Builds a full URL from a path.
    pub fn build_url(&self, path: &str) -> GoogleDriveResult<Url> {
        let path = path.trim_start_matches('/');

        self.config
            .base_url
            .join(path)
            .map_err(|e| GoogleDriveError::request(format!("Invalid URL: {}", e)))
    }

    /// Absolute path (with query) of an API path, as a batch sub-request addresses it.
    pub fn batch_path(&self, path: &str) -> GoogleDriveResult<String> {
        let url = self.build_url(path)?;
        Ok(match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        })
    }

    /// Serializes a JSON request body.
    pub fn json_body<B: Serialize>(body: &B) -> GoogleDriveResult<RequestBody> {
        serde_json::to_vec(body)
            .map(|bytes| RequestBody::Bytes(Bytes::from(bytes)))
            .map_err(|e| GoogleDriveError::request(format!("Failed to serialize body: {}", e)))
    }

    async fn base_headers(&self) -> GoogleDriveResult<HeaderMap> {
        let token = self.auth.get_access_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&token.authorization_header())?);
        headers.insert(USER_AGENT, header_value(&self.config.user_agent)?);
        Ok(headers)
    }

    /// Maps an error response to a domain error.
    fn error_from_response(response: &HttpResponse) -> GoogleDriveError {
        let error =
            GoogleDriveError::from_response(response.status, response.retry_after(), &response.body);
        tracing::debug!(status = response.status.as_u16(), error = %error, "Request failed");
        error
    }
}

fn header_value(value: &str) -> GoogleDriveResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| GoogleDriveError::request(format!("Invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{QuotaError, ResourceError};
    use crate::mocks::{MockAuthProvider, MockHttpTransport};
    use crate::types::DriveFile;
    use reqwest::StatusCode;

    fn executor(transport: Arc<MockHttpTransport>) -> RequestExecutor {
        let config = GoogleDriveConfig::builder()
            .auth_provider(MockAuthProvider::new("test-token"))
            .build()
            .unwrap();
        let auth = config.auth_provider.clone();
        RequestExecutor::new(config, transport, auth)
    }

    #[test]
    fn test_build_url() {
        let executor = executor(Arc::new(MockHttpTransport::new()));

        let url = executor.build_url("/files").unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files");

        let url = executor.build_url("files/123").unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files/123");
    }

    #[test]
    fn test_batch_path() {
        let executor = executor(Arc::new(MockHttpTransport::new()));

        let path = executor.batch_path("files/abc/copy?fields=id").unwrap();
        assert_eq!(path, "/drive/v3/files/abc/copy?fields=id");
    }

    #[tokio::test]
    async fn test_execute_request_adds_auth() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json(StatusCode::OK, r#"{"id":"1","name":"a.txt"}"#);
        let executor = executor(transport.clone());

        let file: DriveFile = executor
            .execute_request(HttpMethod::Get, "files/1", RequestBody::Empty)
            .await
            .unwrap();

        assert_eq!(file.name, "a.txt");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].headers.get(AUTHORIZATION).unwrap(),
            "Bearer test-token"
        );
        assert!(requests[0].headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_execute_request_maps_errors() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"File not found: x.","errors":[{"reason":"notFound"}]}}"#,
        );
        transport.enqueue_json(StatusCode::TOO_MANY_REQUESTS, "{}");
        let executor = executor(transport);

        let result: GoogleDriveResult<DriveFile> = executor
            .execute_request(HttpMethod::Get, "files/x", RequestBody::Empty)
            .await;
        assert!(matches!(
            result,
            Err(GoogleDriveError::Resource(ResourceError::FileNotFound(_)))
        ));

        let result: GoogleDriveResult<DriveFile> = executor
            .execute_request(HttpMethod::Get, "files/x", RequestBody::Empty)
            .await;
        assert!(matches!(
            result,
            Err(GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let transport = Arc::new(MockHttpTransport::new());
        let executor = executor(transport.clone());

        let results: Vec<BatchItemResult<DriveFile>> = executor
            .execute_batch(&BatchRequest::new(), &[])
            .await
            .unwrap();

        assert!(results.is_empty());
        transport.verify_request_count(0);
    }

    #[tokio::test]
    async fn test_batch_call_failure_is_error() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json(StatusCode::SERVICE_UNAVAILABLE, "{}");
        let executor = executor(transport.clone());

        let mut batch = BatchRequest::new();
        batch
            .push("item-0", HttpMethod::Post, "/drive/v3/files/a/copy", None)
            .unwrap();

        let result: GoogleDriveResult<Vec<BatchItemResult<DriveFile>>> =
            executor.execute_batch(&batch, &["a".to_string()]).await;

        assert!(result.is_err());
        let requests = transport.requests();
        assert_eq!(requests[0].url.as_str(), "https://www.googleapis.com/batch/drive/v3");
        assert!(requests[0]
            .headers
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("multipart/mixed; boundary="));
    }
}
