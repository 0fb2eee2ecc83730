//! DocWalrus command line entry point.

mod cli;
mod commands;

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays the command's output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting docwalrus");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project_dir = cli.project_dir;

    match cli.command {
        Command::Deploy(args) => commands::deploy(&project_dir, args).await,
        Command::Connect { address, network } => commands::connect(&project_dir, &address, network),
        Command::Disconnect => commands::disconnect(),
        Command::Status => commands::status(&project_dir),
        Command::WalletApi { port, host } => {
            commands::wallet_api(&project_dir, SocketAddr::new(host, port)).await
        }
        Command::Site {
            object_id,
            endpoint,
        } => commands::site(&project_dir, &object_id, endpoint).await,
        Command::CheckBlob {
            blob_id,
            walrus_aggregator,
        } => commands::check_blob(&project_dir, &blob_id, walrus_aggregator).await,
    }
}
