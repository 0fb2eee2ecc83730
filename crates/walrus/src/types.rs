//! Data types for the publish flow.

use docwalrus_protocol::constants::{DEFAULT_AGGREGATOR_URL, DEFAULT_EPOCHS, DEFAULT_PUBLISHER_URL};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::UploadError;

/// Publisher and aggregator endpoints plus storage options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalrusConfig {
    #[serde(default = "default_publisher_url")]
    pub publisher_url: String,
    #[serde(default = "default_aggregator_url")]
    pub aggregator_url: String,
    /// Storage duration in Walrus epochs.
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    #[serde(default)]
    pub deletable: bool,
}

fn default_publisher_url() -> String {
    DEFAULT_PUBLISHER_URL.to_string()
}

fn default_aggregator_url() -> String {
    DEFAULT_AGGREGATOR_URL.to_string()
}

fn default_epochs() -> u32 {
    DEFAULT_EPOCHS
}

impl Default for WalrusConfig {
    fn default() -> Self {
        Self {
            publisher_url: default_publisher_url(),
            aggregator_url: default_aggregator_url(),
            epochs: default_epochs(),
            deletable: false,
        }
    }
}

/// Body of a successful publisher `PUT`.
///
/// Only the blob id is kept; the rest of the blob object is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreResponse {
    NewlyCreated(NewlyCreated),
    AlreadyCertified(AlreadyCertified),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewlyCreated {
    pub blob_object: BlobObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObject {
    pub blob_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyCertified {
    pub blob_id: String,
}

impl StoreResponse {
    pub fn blob_id(&self) -> &str {
        match self {
            Self::NewlyCreated(created) => &created.blob_object.blob_id,
            Self::AlreadyCertified(certified) => &certified.blob_id,
        }
    }
}

/// Content identifier extracted from a publisher response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentId {
    /// Parsed from a structured store response.
    Structured(String),
    /// The publisher answered with plain text; the trimmed body is the id.
    RawFallback(String),
}

impl ContentId {
    /// Decodes a 2xx publisher body.
    ///
    /// JSON that is not a store response is rejected. Non-JSON text is
    /// taken verbatim (trimmed) as the id.
    pub fn from_body(body: &str) -> Result<Self, UploadError> {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => {
                let response: StoreResponse =
                    serde_json::from_value(value).map_err(|_| UploadError::MissingContentId)?;
                let id = response.blob_id().trim();
                if id.is_empty() {
                    return Err(UploadError::MissingContentId);
                }
                Ok(Self::Structured(id.to_string()))
            }
            Err(_) => {
                let raw = body.trim();
                if raw.is_empty() {
                    return Err(UploadError::MissingContentId);
                }
                warn!(body = %raw, "publisher response is not JSON, using raw body as blob id");
                Ok(Self::RawFallback(raw.to_string()))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Structured(id) | Self::RawFallback(id) => id,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Structured(id) | Self::RawFallback(id) => id,
        }
    }
}

/// Progress event emitted while publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    /// Scan finished; `total` files will be attempted.
    Started { total: usize },
    FileUploaded { path: String, blob_id: String },
    FileFailed { path: String, error: String },
}
