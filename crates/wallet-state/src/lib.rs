//! Wallet authorization state for the DocWalrus CLI.
//!
//! The authorization record written after a successful browser handshake
//! is the single source of truth for "is this machine allowed to publish".
//! [`AuthStore`] abstracts where it lives so the handshake server, the
//! validator and the deploy command can share one injected instance.

pub mod error;
pub mod store;
pub mod validator;

pub use error::StoreError;
pub use store::{AuthStore, FileAuthStore, MemoryAuthStore, default_wallet_path};
pub use validator::{ConnectionStatus, ConnectionValidator};
