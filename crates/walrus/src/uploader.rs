//! Walrus publisher client.
//!
//! Async HTTP client using `reqwest`. One `PUT` per file; the response is
//! decoded into a [`ContentId`].

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use docwalrus_protocol::constants::UPLOAD_TIMEOUT;
use percent_encoding::{CONTROLS, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::types::{ContentId, WalrusConfig};

/// Uploads one file and returns its content identifier.
///
/// The pipeline is written against this trait so tests can stand in
/// for the publisher.
pub trait ContentUploader: Send + Sync {
    fn upload<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + 'a>>;
}

/// Uploader backed by a Walrus HTTP publisher.
pub struct WalrusUploader {
    http: reqwest::Client,
    config: WalrusConfig,
    wallet_address: Option<String>,
    bearer_token: Option<String>,
}

impl WalrusUploader {
    /// Creates an uploader with the default upload timeout.
    pub fn new(config: WalrusConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            wallet_address: None,
            bearer_token: None,
        })
    }

    /// Sent as `X-Wallet-Address`.
    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    /// Sent as `Authorization: Bearer <token>`.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn config(&self) -> &WalrusConfig {
        &self.config
    }

    /// Uploads the file at `path` and decodes the publisher's answer.
    pub async fn upload_file(&self, path: &Path) -> Result<ContentId, UploadError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut req = self
            .http
            .put(&self.config.publisher_url)
            .query(&[
                ("epochs", self.config.epochs.to_string()),
                ("deletable", self.config.deletable.to_string()),
            ])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(
                "X-File-Name",
                utf8_percent_encode(&file_name, CONTROLS).to_string(),
            )
            .header(
                "X-Wallet-Address",
                self.wallet_address.as_deref().unwrap_or_default(),
            );

        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| UploadError::InvalidHeader("Authorization"))?;
            req = req.header(AUTHORIZATION, value);
        }

        debug!(file = %file_name, bytes = data.len(), "uploading to publisher");
        let resp = req.body(data).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(file = %file_name, status = status.as_u16(), "publisher rejected upload");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        ContentId::from_body(&body)
    }

    /// Returns whether the aggregator serves `blob_id`.
    pub async fn check_blob_availability(&self, blob_id: &str) -> Result<bool, UploadError> {
        let url = format!(
            "{}/blobs/{}",
            self.config.aggregator_url.trim_end_matches('/'),
            blob_id
        );
        let resp = self.http.get(&url).send().await?;
        Ok(resp.status().is_success())
    }
}

impl ContentUploader for WalrusUploader {
    fn upload<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + 'a>> {
        Box::pin(async move { self.upload_file(path).await.map(ContentId::into_string) })
    }
}
