//! Type definitions for the Google Drive API resources used by the transfer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Google Drive file representation.
///
/// Only `id` and `name` are guaranteed; listings request the partial
/// response `files(id, name)` and every other field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID.
    pub id: String,

    /// File name.
    #[serde(default)]
    pub name: String,

    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    /// Whether the file is in trash.
    #[serde(default)]
    pub trashed: bool,
}

impl DriveFile {
    /// Creates a file record with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: None,
            created_time: None,
            trashed: false,
        }
    }
}

/// File list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    /// Next page token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,

    /// Whether the search was incomplete.
    #[serde(default)]
    pub incomplete_search: bool,

    /// List of files.
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// User representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    /// Permission ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<String>,

    /// Whether this is the requesting user.
    #[serde(default)]
    pub me: bool,
}

/// About resource (user information).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    /// User information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Permission representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Permission ID.
    pub id: String,

    /// Permission type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<PermissionType>,

    /// Permission role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PermissionRole>,

    /// Email address (for user/group type).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Permission type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    /// Specific user.
    User,
    /// Google Group.
    Group,
    /// Entire domain.
    Domain,
    /// Anyone with link.
    Anyone,
}

/// Permission role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionRole {
    /// Full ownership.
    Owner,
    /// Shared drive organizer.
    Organizer,
    /// File organizer.
    FileOrganizer,
    /// Can edit.
    Writer,
    /// Can comment.
    Commenter,
    /// Can view.
    Reader,
}

// ============================================================================
// Request Types
// ============================================================================

/// Parameters for listing files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesParams {
    /// Query string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Page token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    /// Order by clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Spaces to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spaces: Option<String>,

    /// Fields to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// Request to create a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    /// Permission role.
    pub role: PermissionRole,

    /// Permission type.
    #[serde(rename = "type")]
    pub permission_type: PermissionType,

    /// Email address (for user/group type).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl CreatePermissionRequest {
    /// Grants `role` to a single user.
    pub fn user(email_address: impl Into<String>, role: PermissionRole) -> Self {
        Self {
            role,
            permission_type: PermissionType::User,
            email_address: Some(email_address.into()),
        }
    }
}

/// Query parameters for creating a permission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionParams {
    /// Whether to send a notification email to the grantee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notification_email: Option<bool>,

    /// Fields to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// Request to update a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether trashed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
}
