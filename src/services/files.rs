//! Files service for Google Drive API.
//!
//! This module provides the file operations the transfer needs:
//! - Listing with search queries and pagination
//! - Metadata updates (including trashing)
//! - Batched copies

use crate::batch::{content_id, BatchItemResult, BatchRequest};
use crate::client::RequestExecutor;
use crate::errors::{GoogleDriveError, GoogleDriveResult, RequestError};
use crate::transport::{HttpMethod, RequestBody};
use crate::types::*;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;

/// Largest page size the files.list endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Service for file operations.
pub struct FilesService {
    executor: Arc<RequestExecutor>,
}

impl FilesService {
    /// Creates a new files service.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Lists files with optional query parameters.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use google_drive_transfer::*;
    /// # use google_drive_transfer::types::ListFilesParams;
    /// # async fn example(client: GoogleDriveClient) -> GoogleDriveResult<()> {
    /// let params = ListFilesParams {
    ///     q: Some("name contains 'report'".to_string()),
    ///     page_size: Some(100),
    ///     ..Default::default()
    /// };
    ///
    /// let file_list = client.files().list(params).await?;
    /// for file in file_list.files {
    ///     println!("{}: {}", file.name, file.id);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(&self, params: ListFilesParams) -> GoogleDriveResult<FileList> {
        if let Some(page_size) = params.page_size {
            if page_size < 1 || page_size > MAX_PAGE_SIZE {
                return Err(GoogleDriveError::Request(RequestError::InvalidParameter(
                    format!("pageSize must be between 1 and {}", MAX_PAGE_SIZE),
                )));
            }
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| GoogleDriveError::request(format!("Invalid list parameters: {}", e)))?;
        let path = if query.is_empty() {
            "files".to_string()
        } else {
            format!("files?{}", query)
        };

        self.executor
            .execute_request(HttpMethod::Get, &path, RequestBody::Empty)
            .await
    }

    /// Updates file metadata.
    pub async fn update(
        &self,
        file_id: &str,
        request: UpdateFileRequest,
        fields: Option<&str>,
    ) -> GoogleDriveResult<DriveFile> {
        let mut path = file_path(file_id)?;
        if let Some(fields) = fields {
            path.push_str(&format!("?fields={}", encode(fields)));
        }

        let body = RequestExecutor::json_body(&request)?;
        self.executor
            .execute_request(HttpMethod::Patch, &path, body)
            .await
    }

    /// Moves a file to the trash.
    pub async fn trash(&self, file_id: &str) -> GoogleDriveResult<DriveFile> {
        let request = UpdateFileRequest {
            trashed: Some(true),
            ..Default::default()
        };
        self.update(file_id, request, Some("id, name, trashed")).await
    }

    /// Copies up to 100 files in one batch call.
    ///
    /// Each copy uses an empty body, so the copy keeps the source name and
    /// lands in the authenticated user's "My Drive".
    pub async fn batch_copy(
        &self,
        file_ids: &[String],
    ) -> GoogleDriveResult<Vec<BatchItemResult<DriveFile>>> {
        let mut batch = BatchRequest::new();
        for (index, file_id) in file_ids.iter().enumerate() {
            let path = self
                .executor
                .batch_path(&format!("{}/copy", file_path(file_id)?))?;
            batch.push(
                content_id(index),
                HttpMethod::Post,
                path,
                Some(Bytes::from_static(b"{}")),
            )?;
        }

        self.executor.execute_batch(&batch, file_ids).await
    }
}

// RFC 3986 unreserved characters stay as they are.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

pub(crate) fn file_path(file_id: &str) -> GoogleDriveResult<String> {
    if file_id.is_empty() {
        return Err(GoogleDriveError::missing_parameter("file_id is required"));
    }
    Ok(format!("files/{}", encode(file_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchItemError;
    use crate::config::GoogleDriveConfig;
    use crate::mocks::{MockAuthProvider, MockHttpTransport};
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use reqwest::StatusCode;

    fn service(transport: Arc<MockHttpTransport>) -> FilesService {
        let config = GoogleDriveConfig::builder()
            .auth_provider(MockAuthProvider::new("token"))
            .build()
            .unwrap();
        let auth = config.auth_provider.clone();
        FilesService::new(Arc::new(RequestExecutor::new(config, transport, auth)))
    }

    #[tokio::test]
    async fn test_list_encodes_query() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json(StatusCode::OK, r#"{"files":[{"id":"1","name":"FY21_a"}]}"#);
        let files = service(transport.clone());

        let list = files
            .list(ListFilesParams {
                q: Some("name contains 'FY21'".to_string()),
                page_size: Some(1000),
                fields: Some("nextPageToken, files(id, name)".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(list.files.len(), 1);
        let url = transport.requests()[0].url.clone();
        assert_eq!(url.path(), "/drive/v3/files");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "name contains 'FY21'".to_string())));
        assert!(pairs.contains(&("pageSize".to_string(), "1000".to_string())));
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_page() {
        let transport = Arc::new(MockHttpTransport::new());
        let files = service(transport.clone());

        let result = files
            .list(ListFilesParams {
                page_size: Some(1001),
                ..Default::default()
            })
            .await;

        assert!(matches!(
            result,
            Err(GoogleDriveError::Request(RequestError::InvalidParameter(_)))
        ));
        transport.verify_request_count(0);
    }

    #[tokio::test]
    async fn test_trash_patches_flag() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json(StatusCode::OK, r#"{"id":"a b","name":"x","trashed":true}"#);
        let files = service(transport.clone());

        let file = files.trash("a b").await.unwrap();

        assert!(file.trashed);
        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.url.path(), "/drive/v3/files/a%20b");
        match &request.body {
            RequestBody::Bytes(body) => assert_eq!(&body[..], br#"{"trashed":true}"#),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_file_id_rejected() {
        let files = service(Arc::new(MockHttpTransport::new()));
        assert!(matches!(
            files.trash("").await,
            Err(GoogleDriveError::Request(RequestError::MissingParameter(_)))
        ));
    }

    #[tokio::test]
    async fn test_batch_copy() {
        let transport = Arc::new(MockHttpTransport::new());
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/mixed; boundary=batch_r"),
        );
        let body = "--batch_r\r\nContent-Type: application/http\r\nContent-ID: <response-item-1>\r\n\r\n\
HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"id\":\"new-b\",\"name\":\"b\"}\r\n--batch_r--\r\n";
        transport.enqueue(StatusCode::OK, headers, body);
        let files = service(transport.clone());

        let results = files
            .batch_copy(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].result, Err(BatchItemError::Missing)));
        assert_eq!(results[1].result.as_ref().unwrap().id, "new-b");

        let request = &transport.requests()[0];
        let sent = match &request.body {
            RequestBody::Bytes(body) => String::from_utf8(body.to_vec()).unwrap(),
            other => panic!("unexpected body: {:?}", other),
        };
        assert!(sent.contains("Content-ID: <item-0>\r\n\r\nPOST /drive/v3/files/a/copy HTTP/1.1"));
        assert!(sent.contains("Content-ID: <item-1>\r\n\r\nPOST /drive/v3/files/b/copy HTTP/1.1"));
    }
}
