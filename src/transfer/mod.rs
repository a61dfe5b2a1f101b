//! The file transfer pipeline.
//!
//! A run searches the source account, keeps the files whose names fit the
//! configured grammar, shares them with the destination account, copies them
//! there and optionally trashes the originals:
//!
//! ```text
//! discover -> filter -> resolve-destination -> grant -> copy -> [trash] -> done
//! ```
//!
//! Failures of single files are recorded as [`TransferOutcome`]s and never
//! stop a run. Everything else is a [`TransferError`].

mod config;
mod copy;
mod discovery;
mod error;
mod filter;
mod grant;
mod orchestrator;
mod outcome;
mod query;
mod trash;

pub use config::{
    SelectionCriteria, TransferConfig, TransferConfigBuilder, DEFAULT_MIN_AGE_YEARS,
    DEFAULT_NAME_REGEX, DEFAULT_PATTERNS, DEFAULT_TRANSFER_BATCH_SIZE,
};
pub use copy::{copy_files, DEFAULT_COPY_DELAY};
pub use discovery::{discover_files, DEFAULT_PAGE_CEILING, PAGE_SIZE};
pub use error::{ToleratedFailure, TransferError, TransferResult};
pub use filter::NameFilter;
pub use grant::grant_access;
pub use orchestrator::{TransferOrchestrator, TransferStage};
pub use outcome::{
    Operation, OutcomeStatus, SweepReport, TransferOutcome, TransferReport, SWEEP_PREVIEW,
};
pub use query::{cutoff, FileQuery};
pub use trash::trash_files;

use crate::batch::MAX_BATCH_SIZE;
use tracing::warn;

/// Files per batch call for grants and copies unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = MAX_BATCH_SIZE;

/// Clamps a requested chunk size into what one batch call can carry.
pub(crate) fn effective_chunk_size(requested: usize) -> usize {
    let size = requested.clamp(1, MAX_BATCH_SIZE);
    if size != requested {
        warn!(requested, used = size, "Chunk size out of range");
    }
    size
}
