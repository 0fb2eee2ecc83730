//! Key and anchoring error types.

/// Errors from decoding a private key string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyDecodeError {
    #[error("private key is neither base64 nor hex")]
    Encoding,

    #[error("invalid private key length: {0} bytes")]
    InvalidLength(usize),
}

/// Errors from submitting or reading a manifest on the ledger.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid RPC endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("RPC endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("invalid transaction bytes: {0}")]
    TxBytes(#[from] base64::DecodeError),

    #[error("transaction failed: {0}")]
    Execution(String),

    #[error("transaction created no object")]
    NoCreatedObject,

    #[error("invalid site metadata: {0}")]
    Metadata(String),
}
