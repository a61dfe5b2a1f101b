//! Batched permission grants on the source account.

use super::outcome::{Operation, TransferOutcome};
use super::{effective_chunk_size, ToleratedFailure};
use crate::remote::RemoteFileService;
use crate::types::{CreatePermissionRequest, PermissionRole};
use tracing::{info, warn};

/// Gives `destination_email` write access to every file, `chunk_size` files
/// per batch call.
///
/// Failures are recorded per file. A failed batch call fails every file it
/// carried and the next chunk is still sent. Nothing is retried.
pub async fn grant_access<S>(
    service: &S,
    destination_email: &str,
    file_ids: &[String],
    chunk_size: usize,
) -> Vec<TransferOutcome>
where
    S: RemoteFileService + ?Sized,
{
    let request = CreatePermissionRequest::user(destination_email, PermissionRole::Writer);
    let chunk_size = effective_chunk_size(chunk_size);
    let chunks = file_ids.len().div_ceil(chunk_size);
    let mut outcomes = Vec::with_capacity(file_ids.len());

    for (index, chunk) in file_ids.chunks(chunk_size).enumerate() {
        info!(
            chunk = index + 1,
            chunks,
            files = chunk.len(),
            "Sharing files with {}",
            destination_email
        );

        match service.batch_create_permission(chunk, &request).await {
            Ok(items) => {
                for item in items {
                    let outcome = TransferOutcome::from_batch_item(Operation::Share, item, |_| None);
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
                    "Permission batch failed"
                );
                let failure = ToleratedFailure::chunk(&e);
                outcomes.extend(chunk.iter().map(|id| {
                    TransferOutcome::failed(id.as_str(), Operation::Share, failure.clone())
                }));
            }
        }
    }

    outcomes
}
