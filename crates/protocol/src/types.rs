use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sui network a wallet was authorized on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[default]
    #[serde(rename = "mainnet", alias = "main")]
    Mainnet,
    #[serde(rename = "testnet", alias = "test")]
    Testnet,
}

/// Returned when a network name is neither mainnet nor testnet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locally persisted proof that a browser-held wallet authorized this machine.
///
/// Older CLI versions wrote the timestamp as `lastConnected`; it is still
/// accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRecord {
    pub address: String,
    #[serde(default)]
    pub network: Network,
    #[serde(alias = "lastConnected")]
    pub authorized_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validated_at: Option<DateTime<Utc>>,
}

impl AuthorizationRecord {
    /// Creates a record authorized now.
    pub fn new(address: impl Into<String>, network: Network) -> Self {
        Self::authorized_at(address, network, Utc::now())
    }

    /// Creates a record with an explicit authorization time.
    pub fn authorized_at(
        address: impl Into<String>,
        network: Network,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            network,
            authorized_at: at,
            last_validated_at: None,
        }
    }

    /// A record denotes an authorized session only if it carries an address.
    pub fn is_authorized(&self) -> bool {
        !self.address.trim().is_empty()
    }

    /// Age of the authorization relative to `now` (zero if in the future).
    ///
    /// A future timestamp never ages; see [`ahead_of`](Self::ahead_of).
    pub fn age_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.authorized_at).to_std().unwrap_or_default()
    }

    /// How far the authorization timestamp lies after `now` (zero if not).
    pub fn ahead_of(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.authorized_at - now).to_std().unwrap_or_default()
    }
}

/// One successfully uploaded file.
///
/// Serialized as `{ "path", "blobId" }`, the shape embedded in the
/// anchored site metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEntry {
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(rename = "blobId")]
    pub content_id: String,
}

impl UploadEntry {
    pub fn new(relative_path: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content_id: content_id.into(),
        }
    }
}

/// Returned when a manifest would contain no files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("manifest has no entries")]
pub struct EmptyManifest;

/// Immutable mapping of a site's files to their content identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    site_name: String,
    description: String,
    entries: Vec<UploadEntry>,
}

impl Manifest {
    /// Builds a manifest from the settled upload results.
    pub fn new(
        site_name: impl Into<String>,
        description: impl Into<String>,
        entries: Vec<UploadEntry>,
    ) -> Result<Self, EmptyManifest> {
        if entries.is_empty() {
            return Err(EmptyManifest);
        }
        Ok(Self {
            site_name: site_name.into(),
            description: description.into(),
            entries,
        })
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }
}

/// Outcome of anchoring a manifest on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorResult {
    pub manifest_object_id: String,
    pub transaction_digest: String,
}

/// Outcome of a wallet authorization attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResult {
    pub fn authorized(address: impl Into<String>) -> Self {
        Self {
            success: true,
            address: Some(address.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            address: None,
            error: Some(error.into()),
        }
    }
}
