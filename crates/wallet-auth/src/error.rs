//! Handshake error types.

use std::time::Duration;

/// Errors produced while authorizing a wallet.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wallet authorization denied: {0}")]
    Denied(String),

    #[error("no wallet callback received within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}
