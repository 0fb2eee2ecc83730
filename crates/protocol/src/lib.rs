//! Shared data model for the DocWalrus deployment pipeline.
//!
//! Every other crate in the workspace speaks in these types: the wallet
//! authorization record persisted on disk, the per-file upload entries,
//! the site manifest anchored on the ledger, and the results handed back
//! to the CLI.

pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use types::{
    AnchorResult, AuthResult, AuthorizationRecord, EmptyManifest, Manifest, Network,
    UnknownNetwork, UploadEntry,
};
