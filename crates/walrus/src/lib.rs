//! Walrus publish pipeline: scan, upload, collect.
//!
//! This crate turns a built site directory into a list of
//! [`UploadEntry`](docwalrus_protocol::UploadEntry)s, one per file the
//! Walrus publisher accepted. It has no wallet or ledger dependencies;
//! the deploy command wires it between the auth gate and the anchor.
//!
//! # Pipeline
//!
//! 1. **Scan**: walk the build directory in a stable order
//! 2. **Upload**: `PUT` each file to the publisher, one at a time
//! 3. **Collect**: keep the blob ids of successes, log and skip failures

pub mod error;
pub mod pipeline;
pub mod scanner;
pub mod types;
pub mod uploader;

pub use error::{PublishError, UploadError};
pub use pipeline::PublishPipeline;
pub use scanner::{ScannedFile, scan_build_dir};
pub use types::{ContentId, PublishEvent, StoreResponse, WalrusConfig};
pub use uploader::{ContentUploader, WalrusUploader};
