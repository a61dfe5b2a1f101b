//! Per-file outcomes and run reports.

use super::error::ToleratedFailure;
use crate::batch::BatchItemResult;
use crate::types::DriveFile;
use std::fmt;
use tracing::{info, warn};

/// Names shown in a sweep summary.
pub const SWEEP_PREVIEW: usize = 10;

/// Operation applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Write access granted to the destination account.
    Share,
    /// Copied into the destination account.
    Copy,
    /// Moved to the trash in the source account.
    Trash,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Share => "share",
            Self::Copy => "copy",
            Self::Trash => "trash",
        };
        f.write_str(name)
    }
}

/// How an operation on a file ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The operation succeeded. `new_id` is set for copies.
    Succeeded {
        /// Identifier of the created file.
        new_id: Option<String>,
    },
    /// The operation failed and the run moved on.
    Failed(ToleratedFailure),
}

/// Result of one operation on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Source file id.
    pub file_id: String,
    /// Source file name, when known.
    pub file_name: Option<String>,
    /// Operation applied.
    pub operation: Operation,
    /// How it ended.
    pub status: OutcomeStatus,
}

impl TransferOutcome {
    /// Creates a successful outcome.
    pub fn succeeded(
        file_id: impl Into<String>,
        operation: Operation,
        new_id: Option<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: None,
            operation,
            status: OutcomeStatus::Succeeded { new_id },
        }
    }

    /// Creates a failed outcome.
    pub fn failed(
        file_id: impl Into<String>,
        operation: Operation,
        failure: ToleratedFailure,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: None,
            operation,
            status: OutcomeStatus::Failed(failure),
        }
    }

    /// Attaches the source file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Builds an outcome from one batch sub-response.
    pub(crate) fn from_batch_item<T>(
        operation: Operation,
        item: BatchItemResult<T>,
        new_id: impl FnOnce(T) -> Option<String>,
    ) -> Self {
        match item.result {
            Ok(value) => Self::succeeded(item.key, operation, new_id(value)),
            Err(error) => Self::failed(item.key, operation, error.into()),
        }
    }

    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    /// Identifier of the file created by the operation.
    pub fn new_id(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { new_id } => new_id.as_deref(),
            OutcomeStatus::Failed(_) => None,
        }
    }

    /// The failure, if the operation failed.
    pub fn failure(&self) -> Option<&ToleratedFailure> {
        match &self.status {
            OutcomeStatus::Failed(failure) => Some(failure),
            OutcomeStatus::Succeeded { .. } => None,
        }
    }

    /// Writes the progress line for this outcome.
    pub(crate) fn log(&self) {
        let name = self.file_name.as_deref().unwrap_or("");
        match &self.status {
            OutcomeStatus::Succeeded { new_id: Some(new_id) } => {
                info!(file_id = %self.file_id, new_id = %new_id, "{} succeeded", self.operation)
            }
            OutcomeStatus::Succeeded { new_id: None } => {
                info!(file_id = %self.file_id, name, "{} succeeded", self.operation)
            }
            OutcomeStatus::Failed(failure) => {
                warn!(file_id = %self.file_id, name, error = %failure, "{} failed", self.operation)
            }
        }
    }
}

/// What a transfer run did.
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// Number of files the search returned.
    pub discovered: usize,
    /// Files that passed the name filter, in discovery order.
    pub selected: Vec<DriveFile>,
    /// Destination account the files were shared with and copied into.
    pub destination: String,
    /// Grant outcomes, in input order.
    pub shares: Vec<TransferOutcome>,
    /// Copy outcomes, in input order.
    pub copies: Vec<TransferOutcome>,
    /// Trash outcomes. Empty unless trashing was requested.
    pub trashes: Vec<TransferOutcome>,
}

impl TransferReport {
    /// Outcomes of one operation.
    pub fn outcomes(&self, operation: Operation) -> &[TransferOutcome] {
        match operation {
            Operation::Share => &self.shares,
            Operation::Copy => &self.copies,
            Operation::Trash => &self.trashes,
        }
    }

    /// Number of successful outcomes of `operation`.
    pub fn succeeded(&self, operation: Operation) -> usize {
        self.outcomes(operation)
            .iter()
            .filter(|o| o.is_success())
            .count()
    }

    /// Number of failed outcomes of `operation`.
    pub fn failed(&self, operation: Operation) -> usize {
        self.outcomes(operation).len() - self.succeeded(operation)
    }

    /// Every failed outcome across all stages.
    pub fn failures(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.shares
            .iter()
            .chain(&self.copies)
            .chain(&self.trashes)
            .filter(|o| !o.is_success())
    }
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} selected; shared {}/{}, copied {}/{}",
            self.discovered,
            self.selected.len(),
            self.succeeded(Operation::Share),
            self.shares.len(),
            self.succeeded(Operation::Copy),
            self.copies.len(),
        )?;
        if !self.trashes.is_empty() {
            write!(
                f,
                ", trashed {}/{}",
                self.succeeded(Operation::Trash),
                self.trashes.len()
            )?;
        }
        Ok(())
    }
}

/// What a sweep did.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Files the search returned.
    pub files: Vec<DriveFile>,
    /// Trash outcomes. Empty unless trashing was requested.
    pub trashes: Vec<TransferOutcome>,
}

impl SweepReport {
    /// Names of the first `n` files found.
    pub fn first_names(&self, n: usize) -> Vec<&str> {
        self.files.iter().take(n).map(|f| f.name.as_str()).collect()
    }

    /// Names shown in the sweep summary.
    pub fn preview(&self) -> Vec<&str> {
        self.first_names(SWEEP_PREVIEW)
    }
}
