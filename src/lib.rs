//! Google Drive bulk transfer
//!
//! Moves files from one Google Drive account to another: the source account
//! is searched by name fragments and file age, the results are narrowed with
//! a filename expression, the destination account is given write access in
//! batches, the files are copied into the destination account in batches,
//! and the originals can then be trashed.
//!
//! # Features
//!
//! - **Transfer pipeline**: discovery, filtering, batched grants and copies, trash
//! - **Partial-failure tolerance**: per-file outcomes instead of aborted runs
//! - **Batch requests**: Google's `multipart/mixed` batch protocol, up to 100 calls per round trip
//! - **Authentication**: installed-app OAuth 2.0 with a cached, refreshed authorized-user token
//!
//! # Example
//!
//! ```no_run
//! use google_drive_transfer::{
//!     AuthorizedUserProvider, ClientSecrets, GoogleDriveClient, TransferConfig,
//!     TransferOrchestrator,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scopes = vec!["https://www.googleapis.com/auth/drive".to_string()];
//! let secrets = ClientSecrets::from_file("credentials.json")?;
//!
//! let source = AuthorizedUserProvider::load_or_authorize(
//!     secrets.clone(),
//!     "token_user1.json",
//!     scopes.clone(),
//! )
//! .await?;
//! let destination =
//!     AuthorizedUserProvider::load_or_authorize(secrets, "token_user2.json", scopes).await?;
//!
//! let source = GoogleDriveClient::builder().auth_provider(source).build()?;
//! let destination = GoogleDriveClient::builder().auth_provider(destination).build()?;
//!
//! let config = TransferConfig::builder()
//!     .patterns(["FY21"])
//!     .min_age_years(Some(2))
//!     .build()?;
//!
//! let report = TransferOrchestrator::new(config, Arc::new(source), Arc::new(destination))
//!     .run()
//!     .await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod auth;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod pagination;
pub mod remote;
pub mod services;
pub mod transfer;
pub mod transport;
pub mod types;

// Test doubles, also used by the integration tests
pub mod mocks;

// Re-exports for convenience
pub use auth::{AccessToken, AuthProvider, AuthorizedUserProvider, ClientSecrets};
pub use client::GoogleDriveClient;
pub use config::{GoogleDriveConfig, GoogleDriveConfigBuilder};
pub use errors::{GoogleDriveError, GoogleDriveResult};
pub use remote::RemoteFileService;
pub use transfer::{
    TransferConfig, TransferError, TransferOrchestrator, TransferOutcome, TransferReport,
};
pub use types::{DriveFile, FileList, Permission};

/// Prelude module with commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits from the library,
/// making it convenient to use with a single import:
///
/// ```no_run
/// use google_drive_transfer::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::GoogleDriveClient;

    // Configuration
    pub use crate::config::{GoogleDriveConfig, GoogleDriveConfigBuilder};

    // Authentication
    pub use crate::auth::{AccessToken, AuthProvider, AuthorizedUserProvider, ClientSecrets};

    // Services
    pub use crate::remote::RemoteFileService;
    pub use crate::services::{AboutService, FilesService, PermissionsService};

    // Common types
    pub use crate::types::{About, DriveFile, FileList, Permission, User};

    // Request types
    pub use crate::types::{CreatePermissionRequest, ListFilesParams, UpdateFileRequest};

    // Transfer
    pub use crate::transfer::{
        FileQuery, NameFilter, Operation, OutcomeStatus, SelectionCriteria, ToleratedFailure,
        TransferConfig, TransferError, TransferOrchestrator, TransferOutcome, TransferReport,
    };

    // Errors
    pub use crate::errors::{GoogleDriveError, GoogleDriveResult};

    // Pagination
    pub use crate::pagination::{Page, PageIterator};
}
