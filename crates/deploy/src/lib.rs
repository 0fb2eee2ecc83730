//! Site deploy flow: build, wallet gate, publish, anchor.
//!
//! # Pipeline
//!
//! 1. **Key**: decode the deploy key before touching the network
//! 2. **Build**: optionally run the project's build command
//! 3. **Gate**: require a fresh wallet authorization (browser handshake)
//! 4. **Publish**: upload the build output to Walrus, skipping failures
//! 5. **Anchor**: commit the manifest to Sui in one transaction

pub mod build;
pub mod command;
pub mod config;
pub mod error;

pub use build::run_build_command;
pub use command::{DeployCommand, DeployReport};
pub use config::{AuthConfig, CONFIG_FILE_NAME, SiteConfig};
pub use error::DeployError;
