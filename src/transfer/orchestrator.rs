//! Sequencing of a transfer run.

use super::config::TransferConfig;
use super::copy::copy_files;
use super::discovery::discover_files;
use super::error::TransferResult;
use super::filter::NameFilter;
use super::grant::grant_access;
use super::outcome::{Operation, SweepReport, TransferReport};
use super::query::FileQuery;
use super::trash::trash_files;
use crate::remote::RemoteFileService;
use crate::types::DriveFile;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Stages of a transfer run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    /// Listing candidate files.
    Discover,
    /// Applying the filename expression.
    Filter,
    /// Looking up the destination account address.
    ResolveDestination,
    /// Sharing the files with the destination account.
    Grant,
    /// Copying the files into the destination account.
    Copy,
    /// Trashing the source files.
    Trash,
    /// Finished.
    Done,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discover => "discover",
            Self::Filter => "filter",
            Self::ResolveDestination => "resolve-destination",
            Self::Grant => "grant",
            Self::Copy => "copy",
            Self::Trash => "trash",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Moves files from a source account to a destination account.
///
/// The source account is listed, shares the files and trashes them; the
/// destination account reports its address and makes the copies.
pub struct TransferOrchestrator {
    config: TransferConfig,
    source: Arc<dyn RemoteFileService>,
    destination: Arc<dyn RemoteFileService>,
}

impl TransferOrchestrator {
    /// Creates an orchestrator.
    pub fn new(
        config: TransferConfig,
        source: Arc<dyn RemoteFileService>,
        destination: Arc<dyn RemoteFileService>,
    ) -> Self {
        Self {
            config,
            source,
            destination,
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Runs discover, filter, resolve-destination, grant, copy and, when
    /// enabled, trash.
    ///
    /// Failures of single files are recorded in the report. Anything else
    /// ends the run with an error.
    pub async fn run(&self) -> TransferResult<TransferReport> {
        self.config.validate()?;
        let criteria = &self.config.criteria;
        let filter = NameFilter::new(&criteria.name_regex)?;
        let mut report = TransferReport::default();

        enter(TransferStage::Discover);
        let query = FileQuery::new(criteria.patterns.iter().cloned())
            .with_min_age_years(criteria.min_age_years)
            .build();
        info!(query = %query, "Searching source account");
        let discovered = discover_files(self.source.as_ref(), &query, self.config.page_ceiling).await?;
        report.discovered = discovered.len();

        enter(TransferStage::Filter);
        report.selected = filter.apply(discovered).collect();
        info!(
            selected = report.selected.len(),
            discovered = report.discovered,
            regex = filter.as_str(),
            "Filtered files"
        );
        let file_ids: Vec<String> = report.selected.iter().map(|f| f.id.clone()).collect();

        enter(TransferStage::ResolveDestination);
        report.destination = self.destination.account_email().await?;
        info!(destination = %report.destination, "Resolved destination account");

        enter(TransferStage::Grant);
        report.shares = grant_access(
            self.source.as_ref(),
            &report.destination,
            &file_ids,
            self.config.batch_size,
        )
        .await;

        enter(TransferStage::Copy);
        report.copies = copy_files(
            self.destination.as_ref(),
            &file_ids,
            self.config.batch_size,
            self.config.copy_delay,
        )
        .await;

        if self.config.trash {
            enter(TransferStage::Trash);
            report.trashes = trash_files(self.source.as_ref(), &report.selected).await;
        }

        enter(TransferStage::Done);
        info!(
            shared = report.succeeded(Operation::Share),
            copied = report.succeeded(Operation::Copy),
            trashed = report.succeeded(Operation::Trash),
            "Transfer finished"
        );

        Ok(report)
    }

    /// Lists source files matching the name patterns, without age or name
    /// expression, and trashes them when enabled.
    pub async fn sweep(&self) -> TransferResult<SweepReport> {
        self.config.validate()?;

        let query = FileQuery::new(self.config.criteria.patterns.iter().cloned()).build();
        let files: Vec<DriveFile> =
            discover_files(self.source.as_ref(), &query, self.config.page_ceiling).await?;

        let mut report = SweepReport {
            files,
            trashes: Vec::new(),
        };
        info!(
            files = report.files.len(),
            first = %report.preview().join(" "),
            "Found files"
        );

        if self.config.trash {
            info!("Trashing files");
            report.trashes = trash_files(self.source.as_ref(), &report.files).await;
            info!(
                trashed = report.trashes.iter().filter(|o| o.is_success()).count(),
                "Finished trashing files"
            );
        }

        Ok(report)
    }
}

fn enter(stage: TransferStage) {
    info!(stage = %stage, "Entering stage");
}
