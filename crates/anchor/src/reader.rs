//! Manifest metadata encoding and read-back.

use chrono::{DateTime, SecondsFormat, Utc};
use docwalrus_protocol::constants::STORAGE_PROVIDER;
use docwalrus_protocol::{Manifest, UploadEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::AnchorError;
use crate::rpc::LedgerClient;

/// JSON document embedded as the third call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub files: Vec<UploadEntry>,
    pub storage_provider: String,
    /// RFC 3339, millisecond precision.
    pub timestamp: String,
}

impl ManifestMetadata {
    pub fn new(manifest: &Manifest, at: DateTime<Utc>) -> Self {
        Self {
            files: manifest.entries().to_vec(),
            storage_provider: STORAGE_PROVIDER.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A site manifest as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMetadata {
    pub object_id: String,
    pub name: String,
    pub description: String,
    pub metadata: ManifestMetadata,
}

impl SiteMetadata {
    pub fn files(&self) -> &[UploadEntry] {
        &self.metadata.files
    }
}

/// Fetches an anchored manifest object and decodes its fields.
pub async fn get_site_metadata(
    ledger: &dyn LedgerClient,
    object_id: &str,
) -> Result<SiteMetadata, AnchorError> {
    debug!(object_id, "fetching site metadata");
    let resp = ledger.get_object(object_id).await?;

    let data = match (resp.data, resp.error) {
        (Some(data), _) => data,
        (None, Some(err)) => return Err(AnchorError::Metadata(format!("object lookup failed: {err}"))),
        (None, None) => return Err(AnchorError::Metadata("object not found".into())),
    };
    let content = data
        .content
        .ok_or_else(|| AnchorError::Metadata("object has no content".into()))?;

    let name = string_field(&content.fields, "name")?;
    let description = string_field(&content.fields, "description")?;
    let raw = string_field(&content.fields, "metadata")?;
    let metadata: ManifestMetadata = serde_json::from_str(&raw)
        .map_err(|e| AnchorError::Metadata(format!("metadata is not a manifest: {e}")))?;

    Ok(SiteMetadata {
        object_id: data.object_id,
        name,
        description,
        metadata,
    })
}

fn string_field(fields: &Value, key: &str) -> Result<String, AnchorError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AnchorError::Metadata(format!("missing field `{key}`")))
}
