//! Local wallet status API.
//!
//! Lets the site's browser bridge mirror its wallet session into the
//! CLI's authorization record during development.
//!
//! - `POST /api/wallet/connect` `{address, network}`
//! - `GET  /api/wallet/status` → stored record or `{}`
//! - `POST /api/wallet/disconnect`

use std::net::SocketAddr;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use docwalrus_protocol::Network;
use docwalrus_wallet_state::ConnectionValidator;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::AuthError;

type ApiResponse = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
struct ConnectRequest {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    network: Option<String>,
}

/// Builds the wallet API router.
pub fn wallet_api_router(validator: ConnectionValidator) -> Router {
    Router::new()
        .route("/api/wallet/connect", post(connect))
        .route("/api/wallet/status", get(status))
        .route("/api/wallet/disconnect", post(disconnect))
        .with_state(validator)
}

/// Serves the wallet API until `shutdown` is cancelled.
pub async fn serve_wallet_api(
    addr: SocketAddr,
    validator: ConnectionValidator,
    shutdown: CancellationToken,
) -> Result<(), AuthError> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "wallet API listening");

    axum::serve(listener, wallet_api_router(validator))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("wallet API shut down");
    Ok(())
}

async fn connect(
    State(validator): State<ConnectionValidator>,
    req: Result<Json<ConnectRequest>, JsonRejection>,
) -> ApiResponse {
    let req = match req {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            );
        }
    };

    let Some(address) = req
        .address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Address is required" })),
        );
    };

    let network = match req.network.as_deref() {
        None | Some("") => Network::default(),
        Some(name) => match name.parse::<Network>() {
            Ok(network) => network,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": e.to_string() })),
                );
            }
        },
    };

    match validator.connect(&address, network) {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => {
            error!(error = %e, "error connecting wallet");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to connect wallet" })),
            )
        }
    }
}

async fn status(State(validator): State<ConnectionValidator>) -> ApiResponse {
    match validator.store().read() {
        Ok(Some(record)) => match serde_json::to_value(&record) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                error!(error = %e, "error encoding wallet status");
                status_error()
            }
        },
        Ok(None) => (StatusCode::OK, Json(json!({}))),
        Err(e) => {
            error!(error = %e, "error getting wallet status");
            status_error()
        }
    }
}

fn status_error() -> ApiResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to get wallet status" })),
    )
}

async fn disconnect(State(validator): State<ConnectionValidator>) -> ApiResponse {
    match validator.disconnect() {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => {
            error!(error = %e, "error disconnecting wallet");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to disconnect wallet" })),
            )
        }
    }
}
