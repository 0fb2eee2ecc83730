//! Subcommand handlers.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use docwalrus_anchor::{ManifestAnchor, SuiConfig, SuiRpcClient};
use docwalrus_deploy::{CONFIG_FILE_NAME, DeployCommand, DeployError, DeployReport, SiteConfig};
use docwalrus_protocol::Network;
use docwalrus_wallet_auth::serve_wallet_api;
use docwalrus_wallet_state::{AuthStore, ConnectionStatus, FileAuthStore};
use docwalrus_walrus::{PublishEvent, WalrusConfig, WalrusUploader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::DeployArgs;

fn auth_store() -> anyhow::Result<Arc<dyn AuthStore>> {
    let store = FileAuthStore::default_location().context("locating wallet state")?;
    Ok(Arc::new(store))
}

/// Project config if present, defaults otherwise.
fn config_or_default(project_dir: &Path) -> anyhow::Result<SiteConfig> {
    if !project_dir.join(CONFIG_FILE_NAME).exists() {
        return Ok(SiteConfig::default());
    }
    Ok(SiteConfig::load(project_dir)?)
}

/// Cancels `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
}

pub async fn deploy(project_dir: &Path, args: DeployArgs) -> anyhow::Result<()> {
    let mut config = SiteConfig::load(project_dir)?;
    args.apply(&mut config);

    let Some(key) = args.key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("a private key is required: pass --key or set DOCWALRUS_PRIVATE_KEY");
    };

    let auth = config.auth.orchestrator(auth_store()?);
    let (tx, mut rx) = mpsc::channel(64);
    let command = DeployCommand::new(config, project_dir, auth).with_events(tx);
    cancel_on_ctrl_c(command.cancel_token());

    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PublishEvent::Started { total } => println!("Uploading {total} files to Walrus..."),
                PublishEvent::FileUploaded { path, blob_id } => {
                    println!("  ✓ {path} -> {blob_id}")
                }
                PublishEvent::FileFailed { path, error } => println!("  ✗ {path}: {error}"),
            }
        }
    });

    let result = command.run(key, args.build).await;
    drop(command);
    let _ = progress.await;

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(DeployError::Anchor { source, entries }) => {
            println!();
            println!("Uploaded files were not anchored. Blob ids for a manual retry:");
            for entry in &entries {
                println!("  - {}: {}", entry.relative_path, entry.content_id);
            }
            Err(anyhow::Error::new(source).context("failed to anchor site manifest"))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &DeployReport) {
    println!();
    println!("Deployment complete!");
    println!("Deployer:                {}", report.deployer);
    println!("Site metadata object ID: {}", report.anchor.manifest_object_id);
    println!("Transaction digest:      {}", report.anchor.transaction_digest);
    println!("Files stored on Walrus:");
    for entry in &report.entries {
        println!("  - {}: {}", entry.relative_path, entry.content_id);
    }
}

pub fn connect(project_dir: &Path, address: &str, network: Network) -> anyhow::Result<()> {
    let config = config_or_default(project_dir)?;
    let validator = config.auth.validator(auth_store()?);
    let record = validator.connect(address, network)?;
    println!("Wallet connected: {} ({})", record.address, record.network);
    Ok(())
}

pub fn disconnect() -> anyhow::Result<()> {
    auth_store()?.remove()?;
    println!("Wallet disconnected");
    Ok(())
}

pub fn status(project_dir: &Path) -> anyhow::Result<()> {
    let config = config_or_default(project_dir)?;
    let validator = config.auth.validator(auth_store()?);

    match validator.status() {
        ConnectionStatus::Connected(record) => {
            println!("Connected: {} ({})", record.address, record.network);
            println!("Authorized at: {}", record.authorized_at.to_rfc3339());
        }
        ConnectionStatus::Stale { age } => {
            println!(
                "Authorization expired {}s ago and was cleared; run `docwalrus deploy` to reconnect",
                age.as_secs().saturating_sub(validator.staleness_window().as_secs())
            );
        }
        ConnectionStatus::FutureDated { ahead } => {
            println!(
                "Authorization was dated {}s in the future and was cleared; run `docwalrus deploy` to reconnect",
                ahead.as_secs()
            );
        }
        ConnectionStatus::NotConnected => println!("No wallet connected"),
        ConnectionStatus::Unreadable(reason) => {
            bail!("wallet state is unreadable: {reason}");
        }
    }
    Ok(())
}

pub async fn wallet_api(project_dir: &Path, addr: SocketAddr) -> anyhow::Result<()> {
    let config = config_or_default(project_dir)?;
    let validator = config.auth.validator(auth_store()?);

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());
    println!("Wallet API listening on http://{addr}/api/wallet");
    serve_wallet_api(addr, validator, shutdown).await?;
    Ok(())
}

pub async fn site(project_dir: &Path, object_id: &str, endpoint: Option<String>) -> anyhow::Result<()> {
    let mut sui: SuiConfig = config_or_default(project_dir)?.sui;
    if let Some(endpoint) = endpoint {
        sui.endpoint = endpoint;
    }

    let client = SuiRpcClient::new(sui.endpoint.clone())?;
    let anchor = ManifestAnchor::new(Arc::new(client), sui);
    let site = anchor.get_site_metadata(object_id).await?;

    println!("{} - {}", site.name, site.description);
    println!("Object ID: {}", site.object_id);
    println!("Published: {}", site.metadata.timestamp);
    println!("Storage:   {}", site.metadata.storage_provider);
    for entry in site.files() {
        println!("  - {}: {}", entry.relative_path, entry.content_id);
    }
    Ok(())
}

pub async fn check_blob(
    project_dir: &Path,
    blob_id: &str,
    aggregator: Option<String>,
) -> anyhow::Result<()> {
    let mut walrus: WalrusConfig = config_or_default(project_dir)?.walrus;
    if let Some(url) = aggregator {
        walrus.aggregator_url = url;
    }

    let uploader = WalrusUploader::new(walrus)?;
    if uploader.check_blob_availability(blob_id).await? {
        println!("{blob_id} is available");
        Ok(())
    } else {
        bail!("{blob_id} is not available from the aggregator")
    }
}
