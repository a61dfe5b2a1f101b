//! Batched copies into the destination account.

use super::outcome::{Operation, TransferOutcome};
use super::{effective_chunk_size, ToleratedFailure};
use crate::remote::RemoteFileService;
use std::time::Duration;
use tracing::{info, warn};

/// Pause before each copy batch unless configured otherwise.
pub const DEFAULT_COPY_DELAY: Duration = Duration::from_millis(500);

/// Copies every file into the account behind `service`, `chunk_size` files
/// per batch call, sleeping `delay` before each call.
///
/// Failures are recorded per file and never stop later chunks.
pub async fn copy_files<S>(
    service: &S,
    file_ids: &[String],
    chunk_size: usize,
    delay: Duration,
) -> Vec<TransferOutcome>
where
    S: RemoteFileService + ?Sized,
{
    let chunk_size = effective_chunk_size(chunk_size);
    let chunks = file_ids.len().div_ceil(chunk_size);
    let mut outcomes = Vec::with_capacity(file_ids.len());

    for (index, chunk) in file_ids.chunks(chunk_size).enumerate() {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        info!(chunk = index + 1, chunks, files = chunk.len(), "Copying files");

        match service.batch_copy(chunk).await {
            Ok(items) => {
                for item in items {
                    let outcome =
                        TransferOutcome::from_batch_item(Operation::Copy, item, |file| Some(file.id));
                    outcome.log();
                    outcomes.push(outcome);
                }
            }
            Err(e) => {
                warn!(
                    chunk = index + 1,
                    retryable = e.is_retryable(),
                    retry_after = ?e.retry_after(),
                    error = %e,
                    "Copy batch failed"
                );
                let failure = ToleratedFailure::chunk(&e);
                outcomes.extend(chunk.iter().map(|id| {
                    TransferOutcome::failed(id.as_str(), Operation::Copy, failure.clone())
                }));
            }
        }
    }

    outcomes
}
