//! About API service.

use crate::client::RequestExecutor;
use crate::errors::{GoogleDriveError, GoogleDriveResult};
use crate::transport::{HttpMethod, RequestBody};
use crate::types::*;
use std::sync::Arc;

/// Service for account information.
pub struct AboutService {
    executor: Arc<RequestExecutor>,
}

impl AboutService {
    /// Creates a new about service.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Gets information about the user's Drive account.
    pub async fn get(&self, fields: &str) -> GoogleDriveResult<About> {
        let path = format!("about?fields={}", super::files::encode(fields));
        self.executor
            .execute_request(HttpMethod::Get, &path, RequestBody::Empty)
            .await
    }

    /// Gets the email address of the authenticated user.
    pub async fn account_email(&self) -> GoogleDriveResult<String> {
        let about = self.get("user(emailAddress)").await?;
        about
            .user
            .and_then(|user| user.email_address)
            .ok_or_else(|| GoogleDriveError::unexpected_format("About response has no user email address"))
    }
}
