//! Local callback server for the wallet handshake.
//!
//! Binds an ephemeral localhost port, serves a single route, and reports
//! the handshake outcome through a `watch` channel. The listener is closed
//! by the owning [`HandshakeSession`]; dropping the session also closes it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use docwalrus_protocol::constants::{CALLBACK_GRACE_PERIOD, CALLBACK_PATH};
use docwalrus_protocol::{AuthorizationRecord, Network};
use docwalrus_wallet_state::AuthStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::pages;
use crate::types::HandshakeState;

/// How long a closing listener may take to drain in-flight responses.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Builder for a handshake listener.
pub struct HandshakeServer {
    store: Arc<dyn AuthStore>,
    grace_period: Duration,
}

impl HandshakeServer {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self {
            store,
            grace_period: CALLBACK_GRACE_PERIOD,
        }
    }

    /// Delay between a successful callback and the listener shutting down.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Binds an OS-assigned localhost port and starts serving.
    pub async fn start(self) -> Result<HandshakeSession, AuthError> {
        self.start_on(([127, 0, 0, 1], 0).into()).await
    }

    /// Binds the given address and starts serving.
    pub async fn start_on(self, addr: SocketAddr) -> Result<HandshakeSession, AuthError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (state_tx, state_rx) = watch::channel(HandshakeState::Idle);
        let state_tx = Arc::new(state_tx);
        let shutdown = CancellationToken::new();

        let ctx = CallbackContext {
            store: self.store,
            state_tx: Arc::clone(&state_tx),
            shutdown: shutdown.clone(),
            grace_period: self.grace_period,
            gate: Arc::new(Mutex::new(())),
        };

        let app = Router::new()
            .route(CALLBACK_PATH, get(auth_callback))
            .with_state(ctx);

        let signal = shutdown.clone();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.cancelled().await });
            if let Err(e) = server.await {
                warn!(error = %e, "handshake listener failed");
            }
        });

        state_tx.send_replace(HandshakeState::Listening);
        info!(port = local_addr.port(), "callback server listening");

        Ok(HandshakeSession {
            addr: local_addr,
            state_tx,
            state_rx,
            shutdown,
            task: Some(task),
        })
    }
}

/// A running handshake listener.
pub struct HandshakeSession {
    addr: SocketAddr,
    state_tx: Arc<watch::Sender<HandshakeState>>,
    state_rx: watch::Receiver<HandshakeState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HandshakeSession {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// URL the browser should redirect to.
    pub fn callback_url(&self) -> String {
        format!("http://{}{}", self.addr, CALLBACK_PATH)
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        self.state_rx.borrow().clone()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<HandshakeState> {
        self.state_rx.clone()
    }

    /// Waits for a terminal state, marking the session timed out if none
    /// arrives within `timeout`.
    pub async fn wait_terminal(&mut self, timeout: Duration) -> HandshakeState {
        let mut rx = self.state_rx.clone();
        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(HandshakeState::is_terminal)
                .await
                .map(|state| state.clone())
        })
        .await;

        match waited {
            Ok(Ok(state)) => state,
            Ok(Err(_)) => HandshakeState::Denied {
                reason: "callback server stopped unexpectedly".into(),
            },
            Err(_) => {
                // A callback racing the deadline wins if it already landed.
                let mut outcome = HandshakeState::TimedOut;
                self.state_tx.send_if_modified(|state| {
                    if state.is_terminal() {
                        outcome = state.clone();
                        false
                    } else {
                        *state = HandshakeState::TimedOut;
                        true
                    }
                });
                if outcome == HandshakeState::TimedOut {
                    info!(timeout_secs = timeout.as_secs(), "handshake timed out");
                }
                outcome
            }
        }
    }

    /// Shuts the listener down and waits until the port is released.
    pub async fn close(mut self) {
        self.shutdown.cancel();
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut task).await.is_err() {
                debug!("callback server did not drain in time, aborting");
                task.abort();
                let _ = task.await;
            }
        }
        self.state_tx.send_replace(HandshakeState::Closed);
        debug!(port = self.addr.port(), "callback server closed");
    }
}

impl Drop for HandshakeSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Clone)]
struct CallbackContext {
    store: Arc<dyn AuthStore>,
    state_tx: Arc<watch::Sender<HandshakeState>>,
    shutdown: CancellationToken,
    grace_period: Duration,
    /// Serializes callbacks so only the first one decides the outcome.
    gate: Arc<Mutex<()>>,
}

impl CallbackContext {
    fn deny(&self, reason: &str) {
        warn!(reason, "wallet handshake denied");
        self.state_tx.send_replace(HandshakeState::Denied {
            reason: reason.to_string(),
        });
    }
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    address: Option<String>,
    network: Option<String>,
}

async fn auth_callback(
    State(ctx): State<CallbackContext>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> (StatusCode, Html<String>) {
    let _guard = ctx.gate.lock().await;

    if ctx.state_tx.borrow().is_terminal() {
        debug!("ignoring callback for a finished handshake");
        return (StatusCode::GONE, Html(pages::session_closed()));
    }

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            let reason = format!("Malformed callback: {}", rejection.body_text());
            ctx.deny(&reason);
            return (StatusCode::BAD_REQUEST, Html(pages::invalid_request(&reason)));
        }
    };

    let Some(address) = query
        .address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
    else {
        let reason = "No wallet address provided in the callback.";
        ctx.deny(reason);
        return (StatusCode::BAD_REQUEST, Html(pages::invalid_request(reason)));
    };

    let network = match query.network.as_deref().map(str::trim) {
        None | Some("") => Network::default(),
        Some(name) => match name.parse::<Network>() {
            Ok(network) => network,
            Err(e) => {
                let reason = e.to_string();
                ctx.deny(&reason);
                return (StatusCode::BAD_REQUEST, Html(pages::invalid_request(&reason)));
            }
        },
    };

    let record = AuthorizationRecord::new(&address, network);
    if let Err(e) = ctx.store.write(&record) {
        let reason = format!("failed to save wallet connection: {e}");
        ctx.deny(&reason);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::connection_failed(&reason)),
        );
    }

    info!(address = %address, network = %network, "wallet authorized via browser callback");
    ctx.state_tx.send_replace(HandshakeState::Authorized {
        address: address.clone(),
    });

    // Leave the listener up long enough for this page to finish serving.
    let shutdown = ctx.shutdown.clone();
    let grace = ctx.grace_period;
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        shutdown.cancel();
    });

    (StatusCode::OK, Html(pages::connected(&address)))
}
