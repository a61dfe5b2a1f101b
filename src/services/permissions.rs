//! Permission operations service.

use crate::batch::{content_id, BatchItemResult, BatchRequest};
use crate::client::RequestExecutor;
use crate::errors::{GoogleDriveError, GoogleDriveResult};
use crate::transport::HttpMethod;
use crate::types::*;
use bytes::Bytes;
use std::sync::Arc;

use super::files::file_path;

/// Service for permission operations.
pub struct PermissionsService {
    executor: Arc<RequestExecutor>,
}

impl PermissionsService {
    /// Creates a new permissions service.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Creates the same permission on up to 100 files in one batch call.
    pub async fn batch_create(
        &self,
        file_ids: &[String],
        request: &CreatePermissionRequest,
        params: &CreatePermissionParams,
    ) -> GoogleDriveResult<Vec<BatchItemResult<Permission>>> {
        let body = serde_json::to_vec(request)
            .map(Bytes::from)
            .map_err(|e| GoogleDriveError::request(format!("Failed to serialize body: {}", e)))?;

        let mut batch = BatchRequest::new();
        for (index, file_id) in file_ids.iter().enumerate() {
            let path = self.executor.batch_path(&permissions_path(file_id, params)?)?;
            batch.push(content_id(index), HttpMethod::Post, path, Some(body.clone()))?;
        }

        self.executor.execute_batch(&batch, file_ids).await
    }
}

fn permissions_path(file_id: &str, params: &CreatePermissionParams) -> GoogleDriveResult<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| GoogleDriveError::request(format!("Invalid permission parameters: {}", e)))?;

    let mut path = format!("{}/permissions", file_path(file_id)?);
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query);
    }
    Ok(path)
}
