//! Mock implementations for testing.
//!
//! This module provides mock implementations of the transport, auth and
//! remote file service seams so the client and the transfer pipeline can be
//! tested in isolation.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::auth::{AccessToken, AuthProvider};
use crate::batch::{BatchItemError, BatchItemResult};
use crate::errors::{
    AuthenticationError, AuthorizationError, GoogleDriveError, GoogleDriveResult, TransportError,
};
use crate::remote::RemoteFileService;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::types::{CreatePermissionRequest, DriveFile, FileList, Permission};

/// Mock HTTP transport for testing.
///
/// Tests enqueue responses and inspect the recorded requests afterwards.
///
/// # Example
///
/// ```
/// use google_drive_transfer::mocks::MockHttpTransport;
/// use reqwest::StatusCode;
///
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json(StatusCode::OK, r#"{"files": []}"#);
/// transport.verify_request_count(0);
/// ```
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Enqueue a response to be returned by the next request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Enqueue a response with explicit headers.
    pub fn enqueue(&self, status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) {
        self.enqueue_response(Ok(HttpResponse::new(status, headers, body.into())));
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json(&self, status: StatusCode, body: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.enqueue(status, headers, Bytes::copy_from_slice(body.as_bytes()));
    }

    /// Enqueue a transport error.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Get all requests that were made.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.requests.lock().unwrap().len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    /// Verify that a request was made with the expected method and path.
    pub fn verify_request(&self, index: usize, method: HttpMethod, path_contains: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.path().contains(path_contains),
            "Expected path to contain '{}', got '{}'",
            path_contains,
            request.url.path()
        );
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network(
                    "No response configured in MockHttpTransport".to_string(),
                ))
            })
    }
}

/// Mock authentication provider returning a fixed token.
#[derive(Debug, Clone)]
pub struct MockAuthProvider {
    token: String,
    fail: bool,
}

impl MockAuthProvider {
    /// Creates a provider that always hands out `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fail: false,
        }
    }

    /// Creates a provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            token: String::new(),
            fail: true,
        }
    }

    fn token(&self) -> Result<AccessToken, AuthenticationError> {
        if self.fail {
            return Err(AuthenticationError::RefreshFailed(
                "Mock credentials rejected".to_string(),
            ));
        }
        Ok(AccessToken::new(
            self.token.clone(),
            "Bearer",
            Utc::now() + Duration::hours(1),
            vec![],
        ))
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError> {
        self.token()
    }

    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError> {
        self.token()
    }

    fn is_expired(&self) -> bool {
        self.fail
    }
}

/// One call received by [`MockRemoteFileService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `list`
    List {
        /// Search query.
        query: String,
        /// Requested page size.
        page_size: u32,
        /// Continuation token.
        page_token: Option<String>,
    },
    /// `account_email`
    AccountEmail,
    /// `batch_create_permission`
    BatchCreatePermission {
        /// Files in the batch.
        file_ids: Vec<String>,
        /// Grantee.
        email_address: Option<String>,
    },
    /// `batch_copy`
    BatchCopy {
        /// Files in the batch.
        file_ids: Vec<String>,
    },
    /// `trash`
    Trash {
        /// Trashed file.
        file_id: String,
    },
}

/// Scripted remote file service that records every call.
///
/// Listing serves the queued pages in order. Once the queue is exhausted it
/// either serves an empty last page or, with
/// [`with_endless_pages`](Self::with_endless_pages), full pages forever.
pub struct MockRemoteFileService {
    email: String,
    pages: Mutex<VecDeque<GoogleDriveResult<FileList>>>,
    endless_page_size: Option<usize>,
    failing_items: HashSet<String>,
    failing_batches: HashSet<String>,
    missing_responses: HashSet<String>,
    email_error: bool,
    calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl MockRemoteFileService {
    /// Creates a service for the account `email`.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            pages: Mutex::new(VecDeque::new()),
            endless_page_size: None,
            failing_items: HashSet::new(),
            failing_batches: HashSet::new(),
            missing_responses: HashSet::new(),
            email_error: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a listing page.
    pub fn with_page(self, files: Vec<DriveFile>, next_page_token: Option<&str>) -> Self {
        self.pages.lock().unwrap().push_back(Ok(FileList {
            next_page_token: next_page_token.map(String::from),
            incomplete_search: false,
            files,
        }));
        self
    }

    /// Queues a failing listing page.
    pub fn with_page_error(self, error: GoogleDriveError) -> Self {
        self.pages.lock().unwrap().push_back(Err(error));
        self
    }

    /// Serves full pages with a cursor once the queued pages run out.
    pub fn with_endless_pages(mut self, page_size: usize) -> Self {
        self.endless_page_size = Some(page_size);
        self
    }

    /// Fails the grant, copy and trash sub-operations for `file_id`.
    pub fn with_failing_item(mut self, file_id: impl Into<String>) -> Self {
        self.failing_items.insert(file_id.into());
        self
    }

    /// Fails any whole batch call that includes `file_id`.
    pub fn with_failing_batch(mut self, file_id: impl Into<String>) -> Self {
        self.failing_batches.insert(file_id.into());
        self
    }

    /// Omits the sub-response for `file_id` from batch replies.
    pub fn with_missing_response(mut self, file_id: impl Into<String>) -> Self {
        self.missing_responses.insert(file_id.into());
        self
    }

    /// Makes the identity lookup fail.
    pub fn with_email_error(mut self) -> Self {
        self.email_error = true;
        self
    }

    /// Shares the call log with another mock so calls on both interleave in one log.
    pub fn with_call_log(mut self, calls: Arc<Mutex<Vec<RemoteCall>>>) -> Self {
        self.calls = calls;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Handle on the call log.
    pub fn call_log(&self) -> Arc<Mutex<Vec<RemoteCall>>> {
        self.calls.clone()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_page(&self) -> GoogleDriveResult<FileList> {
        if let Some(page) = self.pages.lock().unwrap().pop_front() {
            return page;
        }

        let Some(size) = self.endless_page_size else {
            return Ok(FileList::default());
        };

        let calls = self.calls.lock().unwrap().len();
        Ok(FileList {
            next_page_token: Some(format!("endless-{}", calls)),
            incomplete_search: false,
            files: (0..size)
                .map(|i| DriveFile::new(format!("endless-{}-{}", calls, i), format!("file {}", i)))
                .collect(),
        })
    }

    fn batch<T>(
        &self,
        file_ids: &[String],
        success: impl Fn(&str) -> T,
    ) -> GoogleDriveResult<Vec<BatchItemResult<T>>> {
        if let Some(id) = file_ids.iter().find(|id| self.failing_batches.contains(*id)) {
            return Err(GoogleDriveError::server(format!(
                "Mock batch failure (contains {})",
                id
            )));
        }

        Ok(file_ids
            .iter()
            .map(|id| BatchItemResult {
                key: id.clone(),
                result: if self.missing_responses.contains(id) {
                    Err(BatchItemError::Missing)
                } else if self.failing_items.contains(id) {
                    Err(BatchItemError::Failed {
                        status: StatusCode::FORBIDDEN,
                        error: GoogleDriveError::Authorization(AuthorizationError::Forbidden(
                            format!("Mock failure for {}", id),
                        )),
                    })
                } else {
                    Ok(success(id))
                },
            })
            .collect())
    }
}

#[async_trait]
impl RemoteFileService for MockRemoteFileService {
    async fn list(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> GoogleDriveResult<FileList> {
        self.record(RemoteCall::List {
            query: query.to_string(),
            page_size,
            page_token,
        });
        self.next_page()
    }

    async fn account_email(&self) -> GoogleDriveResult<String> {
        self.record(RemoteCall::AccountEmail);
        if self.email_error {
            return Err(GoogleDriveError::authentication("Mock identity lookup failure"));
        }
        Ok(self.email.clone())
    }

    async fn batch_create_permission(
        &self,
        file_ids: &[String],
        request: &CreatePermissionRequest,
    ) -> GoogleDriveResult<Vec<BatchItemResult<Permission>>> {
        self.record(RemoteCall::BatchCreatePermission {
            file_ids: file_ids.to_vec(),
            email_address: request.email_address.clone(),
        });
        self.batch(file_ids, |id| Permission {
            id: format!("perm-{}", id),
            permission_type: Some(request.permission_type),
            role: Some(request.role),
            email_address: request.email_address.clone(),
        })
    }

    async fn batch_copy(
        &self,
        file_ids: &[String],
    ) -> GoogleDriveResult<Vec<BatchItemResult<DriveFile>>> {
        self.record(RemoteCall::BatchCopy {
            file_ids: file_ids.to_vec(),
        });
        self.batch(file_ids, |id| DriveFile::new(format!("copy-of-{}", id), id))
    }

    async fn trash(&self, file_id: &str) -> GoogleDriveResult<DriveFile> {
        self.record(RemoteCall::Trash {
            file_id: file_id.to_string(),
        });
        if self.failing_items.contains(file_id) {
            return Err(GoogleDriveError::not_found(format!("File not found: {}", file_id)));
        }
        let mut file = DriveFile::new(file_id, "");
        file.trashed = true;
        Ok(file)
    }
}
