//! Wallet state error types.

/// Errors from reading or writing the authorization record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("wallet address is empty")]
    EmptyAddress,
}
