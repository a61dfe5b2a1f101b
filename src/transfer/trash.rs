//! Trashing of source files.

use super::outcome::{Operation, TransferOutcome};
use super::ToleratedFailure;
use crate::remote::RemoteFileService;
use crate::types::DriveFile;

/// Moves each file to the trash, one call per file.
///
/// A failed call is recorded with the file's id and name and the next file
/// is still processed.
pub async fn trash_files<S>(service: &S, files: &[DriveFile]) -> Vec<TransferOutcome>
where
    S: RemoteFileService + ?Sized,
{
    let mut outcomes = Vec::with_capacity(files.len());

    for file in files {
        let outcome = match service.trash(&file.id).await {
            Ok(_) => TransferOutcome::succeeded(file.id.as_str(), Operation::Trash, None),
            Err(e) => TransferOutcome::failed(
                file.id.as_str(),
                Operation::Trash,
                ToleratedFailure::item(&e),
            ),
        }
        .with_file_name(file.name.as_str());

        outcome.log();
        outcomes.push(outcome);
    }

    outcomes
}
