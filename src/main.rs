//! `drive-transfer` binary.

use clap::Parser;
use google_drive_transfer::cli::{self, Cli};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = cli::run(cli).await {
        eprintln!("An error occurred: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
