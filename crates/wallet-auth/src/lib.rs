//! Browser wallet handshake for the DocWalrus CLI.
//!
//! The CLI never holds the user's wallet session itself. Instead it binds
//! a short-lived HTTP listener on localhost, sends the user's browser to
//! the hosted connect page with a callback URL, and waits for the page to
//! redirect back with the authorized address.
//!
//! # Flow
//!
//! 1. **Gate**: skip everything if the stored record is still usable
//! 2. **Listen**: bind `127.0.0.1:0` and serve `/auth/callback`
//! 3. **Launch**: open the connect page (best effort)
//! 4. **Wait**: until the callback lands or the timeout elapses
//! 5. **Close**: release the port; late callbacks are discarded

pub mod api;
pub mod browser;
pub mod error;
pub mod orchestrator;
mod pages;
pub mod server;
pub mod types;

pub use api::{serve_wallet_api, wallet_api_router};
pub use browser::{BrowserLauncher, SystemBrowser};
pub use error::AuthError;
pub use orchestrator::{AuthOrchestrator, build_connect_url};
pub use server::{HandshakeServer, HandshakeSession};
pub use types::HandshakeState;
