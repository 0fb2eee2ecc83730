//! Command line definition.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docwalrus_deploy::SiteConfig;
use docwalrus_protocol::Network;

#[derive(Debug, Parser)]
#[command(name = "docwalrus", version)]
#[command(about = "DocWalrus - deploy documentation sites to Walrus", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root containing docwalrus.toml
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the site to Walrus and anchor it on Sui
    Deploy(DeployArgs),

    /// Record a wallet authorization without the browser handshake
    Connect {
        /// Wallet address
        address: String,

        /// mainnet or testnet
        #[arg(short, long, default_value = "mainnet")]
        network: Network,
    },

    /// Forget the stored wallet authorization
    Disconnect,

    /// Show the stored wallet authorization
    Status,

    /// Run the local wallet status API for the browser bridge
    WalletApi {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,
    },

    /// Show the manifest anchored at a Sui object
    Site {
        object_id: String,

        /// Sui endpoint
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Check whether the aggregator serves a blob
    CheckBlob {
        blob_id: String,

        /// Walrus aggregator URL
        #[arg(long)]
        walrus_aggregator: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Build the site before deploying
    #[arg(short, long)]
    pub build: bool,

    /// Private key for the Sui wallet (base64 or hex)
    #[arg(short, long, env = "DOCWALRUS_PRIVATE_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Sui endpoint
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Walrus publisher URL
    #[arg(long)]
    pub walrus_publisher: Option<String>,

    /// Walrus aggregator URL
    #[arg(long)]
    pub walrus_aggregator: Option<String>,

    /// Number of storage epochs
    #[arg(long)]
    pub epochs: Option<u32>,
}

impl DeployArgs {
    /// Applies command line overrides on top of the project file.
    pub fn apply(&self, config: &mut SiteConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.sui.endpoint = endpoint.clone();
        }
        if let Some(url) = &self.walrus_publisher {
            config.walrus.publisher_url = url.clone();
        }
        if let Some(url) = &self.walrus_aggregator {
            config.walrus.aggregator_url = url.clone();
        }
        if let Some(epochs) = self.epochs {
            config.walrus.epochs = epochs;
        }
    }
}
