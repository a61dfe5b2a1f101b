//! Command line interface of the `drive-transfer` binary.

use crate::auth::{AuthorizedUserProvider, ClientSecrets};
use crate::client::GoogleDriveClient;
use crate::config::scopes;
use crate::errors::GoogleDriveError;
use crate::remote::RemoteFileService;
use crate::transfer::{
    Operation, TransferConfig, TransferOrchestrator, TransferResult, DEFAULT_MIN_AGE_YEARS,
    DEFAULT_NAME_REGEX, DEFAULT_TRANSFER_BATCH_SIZE,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default name fragments as typed on the command line.
const DEFAULT_PATTERN_LIST: &str = "DRAFT,Technical Narrative,FY2,202";

/// Bulk transfer of Google Drive files between two accounts.
///
/// ## Examples
///
/// Transfer with the default selection:
///   drive-transfer transfer
///
/// Transfer FY21 files of any age and trash the originals:
///   drive-transfer transfer "FY21" '^FY\d{2}_.*_\d{8}.*' --any-age --trash
///
/// List files whose names contain DRAFT:
///   drive-transfer sweep DRAFT
#[derive(Parser, Debug)]
#[command(name = "drive-transfer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy matching files from the source account into the destination account.
    Transfer(TransferArgs),
    /// List matching files in the source account and optionally trash them.
    Sweep(SweepArgs),
}

/// Credential files.
#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// OAuth client secrets downloaded from the Google Cloud console
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Token cache of the source account
    #[arg(long, default_value = "token_user1.json")]
    pub source_token: PathBuf,
}

/// Arguments of `transfer`.
#[derive(Args, Debug, Clone)]
pub struct TransferArgs {
    /// Comma-separated name fragments; a file matches if its name contains any of them
    #[arg(default_value = DEFAULT_PATTERN_LIST)]
    pub patterns: String,

    /// Expression the file name must match from its first character
    #[arg(default_value = DEFAULT_NAME_REGEX)]
    pub regex: String,

    /// Minimum file age in years
    #[arg(default_value_t = DEFAULT_MIN_AGE_YEARS)]
    pub age: u32,

    /// Ignore file age
    #[arg(long)]
    pub any_age: bool,

    /// Trash the source files after copying
    #[arg(long)]
    pub trash: bool,

    /// Files per batch call (1-100)
    #[arg(long, default_value_t = DEFAULT_TRANSFER_BATCH_SIZE)]
    pub batch_size: usize,

    /// Maximum number of listing pages of 1000 files
    #[arg(long, default_value_t = crate::transfer::DEFAULT_PAGE_CEILING)]
    pub page_limit: usize,

    /// Pause before each copy batch, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub copy_delay_ms: u64,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Token cache of the destination account
    #[arg(long, default_value = "token_user2.json")]
    pub destination_token: PathBuf,
}

impl TransferArgs {
    /// Builds the transfer configuration.
    pub fn to_config(&self) -> TransferResult<TransferConfig> {
        TransferConfig::builder()
            .patterns(split_patterns(&self.patterns))
            .name_regex(self.regex.clone())
            .min_age_years((!self.any_age).then_some(self.age))
            .trash(self.trash)
            .batch_size(self.batch_size)
            .page_ceiling(self.page_limit)
            .copy_delay(Duration::from_millis(self.copy_delay_ms))
            .build()
    }
}

/// Arguments of `sweep`.
#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// Name fragments; a file matches if its name contains any of them
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Trash the files found
    #[arg(long)]
    pub trash: bool,

    /// Maximum number of listing pages of 1000 files
    #[arg(long, default_value_t = crate::transfer::DEFAULT_PAGE_CEILING)]
    pub page_limit: usize,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

impl SweepArgs {
    /// Builds the transfer configuration used by the sweep.
    pub fn to_config(&self) -> TransferResult<TransferConfig> {
        TransferConfig::builder()
            .patterns(self.patterns.iter().cloned())
            .min_age_years(None)
            .trash(self.trash)
            .page_ceiling(self.page_limit)
            .build()
    }
}

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> TransferResult<()> {
    match cli.command {
        Command::Transfer(args) => transfer(args).await,
        Command::Sweep(args) => sweep(args).await,
    }
}

async fn transfer(args: TransferArgs) -> TransferResult<()> {
    let config = args.to_config()?;
    let secrets = load_secrets(&args.credentials.credentials)?;
    let source = connect(secrets.clone(), &args.credentials.source_token).await?;
    let destination = connect(secrets, &args.destination_token).await?;

    let report = TransferOrchestrator::new(config, source, destination)
        .run()
        .await?;

    for outcome in report.failures() {
        warn!(
            file_id = %outcome.file_id,
            operation = %outcome.operation,
            "Not completed"
        );
    }
    info!(
        failed_copies = report.failed(Operation::Copy),
        "Transfer complete: {}", report
    );
    Ok(())
}

async fn sweep(args: SweepArgs) -> TransferResult<()> {
    let config = args.to_config()?;
    let secrets = load_secrets(&args.credentials.credentials)?;
    let source = connect(secrets, &args.credentials.source_token).await?;

    let report = TransferOrchestrator::new(config, source.clone(), source)
        .sweep()
        .await?;

    println!("There are {} files", report.files.len());
    println!(
        "The first ten file names are: {}",
        report.preview().join(" ")
    );
    Ok(())
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn load_secrets(path: &Path) -> TransferResult<ClientSecrets> {
    ClientSecrets::from_file(path).map_err(|e| GoogleDriveError::from(e).into())
}

async fn connect(
    secrets: ClientSecrets,
    token_path: &Path,
) -> TransferResult<Arc<dyn RemoteFileService>> {
    let auth = AuthorizedUserProvider::load_or_authorize(
        secrets,
        token_path,
        vec![scopes::DRIVE.to_string()],
    )
    .await
    .map_err(GoogleDriveError::from)?;

    let client = GoogleDriveClient::builder().auth_provider(auth).build()?;
    Ok(Arc::new(client))
}
