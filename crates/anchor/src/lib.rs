//! Sui manifest anchoring.
//!
//! Decodes the deployer's Ed25519 key, builds a Move call embedding the
//! site manifest, signs it with the transaction intent and submits it over
//! JSON-RPC. The created object id is the site's permanent address; it can
//! be read back with [`get_site_metadata`].

pub mod anchor;
pub mod error;
pub mod key;
pub mod memory;
pub mod reader;
pub mod rpc;
pub mod signer;
pub mod types;

pub use anchor::ManifestAnchor;
pub use error::{AnchorError, KeyDecodeError};
pub use key::{decode_key_bytes, decode_private_key};
pub use memory::MemoryLedger;
pub use reader::{ManifestMetadata, SiteMetadata, get_site_metadata};
pub use rpc::{LedgerClient, LedgerFuture, SuiRpcClient};
pub use signer::{SuiSigner, derive_address};
pub use types::SuiConfig;

pub use ed25519_dalek::SigningKey;
