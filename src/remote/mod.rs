//! The remote file service seen by the transfer pipeline.
//!
//! The pipeline never talks HTTP directly; it goes through
//! [`RemoteFileService`], which [`GoogleDriveClient`] implements and
//! [`crate::mocks::MockRemoteFileService`] scripts in tests.

use crate::batch::BatchItemResult;
use crate::client::GoogleDriveClient;
use crate::errors::GoogleDriveResult;
use crate::types::{
    CreatePermissionParams, CreatePermissionRequest, DriveFile, FileList, ListFilesParams,
    Permission,
};
use async_trait::async_trait;

/// Partial-response selector for listings: the transfer only needs ids and names.
pub const LIST_FIELDS: &str = "nextPageToken, files(id, name)";

/// Per-account operations the transfer pipeline depends on.
#[async_trait]
pub trait RemoteFileService: Send + Sync {
    /// Fetches one page of files matching `query`.
    async fn list(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> GoogleDriveResult<FileList>;

    /// Email address of the authenticated account.
    async fn account_email(&self) -> GoogleDriveResult<String>;

    /// Creates `request` on every file in one batch call, without notifying
    /// the grantee.
    async fn batch_create_permission(
        &self,
        file_ids: &[String],
        request: &CreatePermissionRequest,
    ) -> GoogleDriveResult<Vec<BatchItemResult<Permission>>>;

    /// Copies every file into this account in one batch call.
    async fn batch_copy(
        &self,
        file_ids: &[String],
    ) -> GoogleDriveResult<Vec<BatchItemResult<DriveFile>>>;

    /// Moves one file to the trash.
    async fn trash(&self, file_id: &str) -> GoogleDriveResult<DriveFile>;
}

#[async_trait]
impl RemoteFileService for GoogleDriveClient {
    async fn list(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> GoogleDriveResult<FileList> {
        let params = ListFilesParams {
            q: (!query.is_empty()).then(|| query.to_string()),
            page_size: Some(page_size),
            page_token,
            fields: Some(LIST_FIELDS.to_string()),
            ..Default::default()
        };
        self.files().list(params).await
    }

    async fn account_email(&self) -> GoogleDriveResult<String> {
        self.about().account_email().await
    }

    async fn batch_create_permission(
        &self,
        file_ids: &[String],
        request: &CreatePermissionRequest,
    ) -> GoogleDriveResult<Vec<BatchItemResult<Permission>>> {
        let params = CreatePermissionParams {
            send_notification_email: Some(false),
            fields: Some("id".to_string()),
        };
        self.permissions()
            .batch_create(file_ids, request, &params)
            .await
    }

    async fn batch_copy(
        &self,
        file_ids: &[String],
    ) -> GoogleDriveResult<Vec<BatchItemResult<DriveFile>>> {
        self.files().batch_copy(file_ids).await
    }

    async fn trash(&self, file_id: &str) -> GoogleDriveResult<DriveFile> {
        self.files().trash(file_id).await
    }
}
