//! End-to-end wallet authorization.
//!
//! Short-circuits when the stored record is still usable; otherwise runs
//! one handshake session and maps its terminal state to a result.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docwalrus_protocol::AuthResult;
use docwalrus_protocol::constants::{
    BROWSER_OPEN_TIMEOUT, CALLBACK_GRACE_PERIOD, DEFAULT_CONNECT_URL, HANDSHAKE_TIMEOUT,
};
use docwalrus_wallet_state::ConnectionValidator;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::browser::{self, BrowserLauncher, SystemBrowser};
use crate::error::AuthError;
use crate::server::HandshakeServer;
use crate::types::HandshakeState;

/// Drives the browser handshake.
pub struct AuthOrchestrator {
    validator: ConnectionValidator,
    browser: Arc<dyn BrowserLauncher>,
    connect_url: String,
    callback_addr: SocketAddr,
    timeout: Duration,
    grace_period: Duration,
    browser_timeout: Duration,
}

impl AuthOrchestrator {
    pub fn new(validator: ConnectionValidator) -> Self {
        Self {
            validator,
            browser: Arc::new(SystemBrowser),
            connect_url: DEFAULT_CONNECT_URL.to_string(),
            callback_addr: ([127, 0, 0, 1], 0).into(),
            timeout: HANDSHAKE_TIMEOUT,
            grace_period: CALLBACK_GRACE_PERIOD,
            browser_timeout: BROWSER_OPEN_TIMEOUT,
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_connect_url(mut self, url: impl Into<String>) -> Self {
        self.connect_url = url.into();
        self
    }

    /// Address the callback listener binds; port 0 picks a free one.
    pub fn with_callback_addr(mut self, addr: SocketAddr) -> Self {
        self.callback_addr = addr;
        self
    }

    /// How long to wait for the browser callback.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn validator(&self) -> &ConnectionValidator {
        &self.validator
    }

    /// Runs the handshake and returns the `{success, address?, error?}` view.
    pub async fn authenticate(&self) -> AuthResult {
        match self.authorize(CancellationToken::new()).await {
            Ok(address) => AuthResult::authorized(address),
            Err(AuthError::Timeout(_)) => {
                AuthResult::failed("Authentication timeout. Please try connecting manually.")
            }
            Err(e) => AuthResult::failed(e.to_string()),
        }
    }

    /// Returns the authorized address, running a handshake if needed.
    pub async fn authorize(&self, cancel: CancellationToken) -> Result<String, AuthError> {
        if let Some(record) = self.validator.usable_record() {
            debug!(address = %record.address, "wallet already authorized");
            return Ok(record.address);
        }

        let mut session = HandshakeServer::new(Arc::clone(self.validator.store()))
            .with_grace_period(self.grace_period)
            .start_on(self.callback_addr)
            .await?;

        let url = build_connect_url(&self.connect_url, &session.callback_url());
        info!(url = %url, "waiting for wallet connection in the browser");

        let launcher = tokio::spawn(browser::launch(
            Arc::clone(&self.browser),
            url,
            self.browser_timeout,
        ));

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            state = session.wait_terminal(self.timeout) => Some(state),
        };

        if matches!(outcome, Some(HandshakeState::Authorized { .. })) {
            tokio::time::sleep(self.grace_period).await;
        }
        session.close().await;
        launcher.abort();

        match outcome {
            None => Err(AuthError::Cancelled),
            Some(HandshakeState::Authorized { address }) => Ok(address),
            Some(HandshakeState::Denied { reason }) => Err(AuthError::Denied(reason)),
            Some(_) => Err(AuthError::Timeout(self.timeout)),
        }
    }
}

/// Appends the callback and auto-connect flag to the connect page URL.
pub fn build_connect_url(connect_url: &str, callback_url: &str) -> String {
    let separator = if connect_url.contains('?') { '&' } else { '?' };
    format!(
        "{connect_url}{separator}callback={}&autoConnect=true",
        utf8_percent_encode(callback_url, NON_ALPHANUMERIC)
    )
}
