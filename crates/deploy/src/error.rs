//! Deploy error types.

use std::path::PathBuf;
use std::time::Duration;

use docwalrus_anchor::{AnchorError, KeyDecodeError};
use docwalrus_protocol::UploadEntry;
use docwalrus_wallet_auth::AuthError;
use docwalrus_wallet_state::StoreError;
use docwalrus_walrus::{PublishError, UploadError};

/// Errors produced during a site deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("build output not found at {}", .0.display())]
    BuildMissing(PathBuf),

    #[error("build command failed: {0}")]
    Build(String),

    #[error("invalid private key: {0}")]
    KeyDecode(#[from] KeyDecodeError),

    #[error("wallet authorization denied: {0}")]
    AuthDenied(String),

    #[error("wallet authorization timed out after {}s", .0.as_secs())]
    AuthTimeout(Duration),

    #[error("wallet handshake failed: {0}")]
    Auth(String),

    #[error("cancelled")]
    Cancelled,

    #[error("wallet state error: {0}")]
    Store(#[from] StoreError),

    #[error("uploader setup failed: {0}")]
    Upload(#[from] UploadError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    #[error("ledger client setup failed: {0}")]
    Ledger(#[source] AnchorError),

    #[error("no files were uploaded, nothing to anchor")]
    PipelineExhausted,

    /// Uploads succeeded but the manifest was not anchored. `entries` lets
    /// the caller retry anchoring without uploading again.
    #[error("failed to anchor manifest: {source}")]
    Anchor {
        #[source]
        source: AnchorError,
        entries: Vec<UploadEntry>,
    },
}

impl From<AuthError> for DeployError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Denied(reason) => Self::AuthDenied(reason),
            AuthError::Timeout(after) => Self::AuthTimeout(after),
            AuthError::Cancelled => Self::Cancelled,
            AuthError::Io(e) => Self::Auth(e.to_string()),
        }
    }
}
