//! Site project configuration.
//!
//! Stored as `docwalrus.toml` at the project root:
//!
//! ```toml
//! title = "My Site"
//! build_dir = "build"
//!
//! [walrus]
//! epochs = 5
//!
//! [sui]
//! endpoint = "https://fullnode.testnet.sui.io:443"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use docwalrus_anchor::SuiConfig;
use docwalrus_protocol::constants::{
    DEFAULT_CONNECT_URL, DEFAULT_STALENESS_WINDOW, HANDSHAKE_TIMEOUT,
};
use docwalrus_wallet_auth::AuthOrchestrator;
use docwalrus_wallet_state::{AuthStore, ConnectionValidator};
use docwalrus_walrus::WalrusConfig;
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "docwalrus.toml";

/// Site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, anchored as the manifest name.
    #[serde(default = "default_title")]
    pub title: String,

    /// Anchored as the manifest description.
    #[serde(default)]
    pub tagline: String,

    /// Build output directory, relative to the project root.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Shell command run by `deploy --build`.
    #[serde(default = "default_build_command")]
    pub build_command: String,

    #[serde(default)]
    pub walrus: WalrusConfig,

    #[serde(default)]
    pub sui: SuiConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_title() -> String {
    "DocWalrus Site".into()
}

fn default_build_dir() -> String {
    "build".into()
}

fn default_build_command() -> String {
    "npm run build".into()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            tagline: String::new(),
            build_dir: default_build_dir(),
            build_command: default_build_command(),
            walrus: WalrusConfig::default(),
            sui: SuiConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Loads `docwalrus.toml` from `project_dir`.
    ///
    /// A missing file means the directory is not a DocWalrus project.
    pub fn load(project_dir: &Path) -> Result<Self, DeployError> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(DeployError::Config(format!(
                "{} not found, is this a DocWalrus project?",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), title = %config.title, "configuration loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, DeployError> {
        toml::from_str(content).map_err(|e| DeployError::Config(e.to_string()))
    }

    /// Absolute path of the build output.
    pub fn build_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.build_dir)
    }
}

/// Wallet handshake settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_connect_url")]
    pub connect_url: String,

    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,

    /// Maximum age of a stored authorization.
    #[serde(default = "default_staleness")]
    pub staleness_secs: u64,
}

fn default_connect_url() -> String {
    DEFAULT_CONNECT_URL.into()
}

fn default_handshake_timeout() -> u64 {
    HANDSHAKE_TIMEOUT.as_secs()
}

fn default_staleness() -> u64 {
    DEFAULT_STALENESS_WINDOW.as_secs()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            connect_url: default_connect_url(),
            handshake_timeout_secs: default_handshake_timeout(),
            staleness_secs: default_staleness(),
        }
    }
}

impl AuthConfig {
    pub fn validator(&self, store: Arc<dyn AuthStore>) -> ConnectionValidator {
        ConnectionValidator::new(store)
            .with_staleness_window(Duration::from_secs(self.staleness_secs))
    }

    pub fn orchestrator(&self, store: Arc<dyn AuthStore>) -> AuthOrchestrator {
        AuthOrchestrator::new(self.validator(store))
            .with_connect_url(self.connect_url.clone())
            .with_timeout(Duration::from_secs(self.handshake_timeout_secs))
    }
}
