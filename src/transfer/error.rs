//! Error types for the transfer pipeline.
//!
//! Two kinds are kept apart: [`TransferError`] aborts a run, while
//! [`ToleratedFailure`] is recorded against one file and the run goes on.

use crate::batch::BatchItemError;
use crate::errors::GoogleDriveError;
use thiserror::Error;

/// Result type for transfer runs.
pub type TransferResult<T> = Result<T, TransferError>;

/// Fatal error that ends a transfer run.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The transfer configuration is unusable.
    #[error("Invalid transfer configuration: {0}")]
    Configuration(String),

    /// A remote call the run cannot continue without failed.
    #[error(transparent)]
    Drive(#[from] GoogleDriveError),

    /// The filename expression does not compile.
    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl TransferError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Failure of one operation on one file. Logged and recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToleratedFailure {
    /// The operation on this file was rejected.
    #[error("{message}")]
    Item {
        /// Error message.
        message: String,
        /// HTTP status, when the provider answered.
        status: Option<u16>,
    },

    /// The batch call carrying this file failed as a whole.
    #[error("Batch call failed: {message}")]
    Chunk {
        /// Error message of the batch call.
        message: String,
    },

    /// The batch response had no part for this file.
    #[error("No response for this file in the batch reply")]
    MissingResponse,
}

impl ToleratedFailure {
    /// Records a failed call for one file.
    pub fn item(error: &GoogleDriveError) -> Self {
        Self::Item {
            message: error.to_string(),
            status: error.status_code().map(|s| s.as_u16()),
        }
    }

    /// Records a failed batch call for every file it carried.
    pub fn chunk(error: &GoogleDriveError) -> Self {
        Self::Chunk {
            message: error.to_string(),
        }
    }
}

impl From<BatchItemError> for ToleratedFailure {
    fn from(error: BatchItemError) -> Self {
        match error {
            BatchItemError::Failed { status, error } => Self::Item {
                message: error.to_string(),
                status: Some(status.as_u16()),
            },
            BatchItemError::Missing => Self::MissingResponse,
        }
    }
}
