//! Sui JSON-RPC client.
//!
//! [`LedgerClient`] is the seam the anchor is written against; [`SuiRpcClient`]
//! implements it over JSON-RPC 2.0 with `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use docwalrus_protocol::constants::RPC_TIMEOUT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::AnchorError;
use crate::types::{MoveCall, ObjectResponse, TransactionBlockBytes, TransactionBlockResponse};

/// Boxed future returned by [`LedgerClient`] calls.
pub type LedgerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AnchorError>> + Send + 'a>>;

/// Ledger operations needed to anchor and read a manifest.
pub trait LedgerClient: Send + Sync {
    /// Builds unsigned transaction bytes for a Move call.
    fn move_call<'a>(&'a self, call: &'a MoveCall) -> LedgerFuture<'a, TransactionBlockBytes>;

    /// Submits signed transaction bytes and waits for local execution.
    fn execute<'a>(
        &'a self,
        tx_bytes: &'a str,
        signatures: &'a [String],
    ) -> LedgerFuture<'a, TransactionBlockResponse>;

    /// Fetches an object with its content.
    fn get_object<'a>(&'a self, object_id: &'a str) -> LedgerFuture<'a, ObjectResponse>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client for a Sui full node.
pub struct SuiRpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    /// Creates a client for `endpoint`, which must be an absolute URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AnchorError> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint).map_err(|e| AnchorError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder().timeout(RPC_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs one JSON-RPC call and decodes its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, AnchorError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "sui rpc call");
        let resp = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnchorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: RpcResponse = serde_json::from_slice(&resp.bytes().await?)?;
        if let Some(err) = body.error {
            return Err(AnchorError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = body
            .result
            .ok_or_else(|| AnchorError::InvalidResponse(format!("{method}: missing result")))?;
        Ok(serde_json::from_value(result)?)
    }
}

impl LedgerClient for SuiRpcClient {
    fn move_call<'a>(&'a self, call: &'a MoveCall) -> LedgerFuture<'a, TransactionBlockBytes> {
        Box::pin(async move {
            self.call(
                "unsafe_moveCall",
                json!([
                    call.sender,
                    call.package,
                    call.module,
                    call.function,
                    [],
                    call.arguments,
                    null,
                    call.gas_budget.to_string(),
                ]),
            )
            .await
        })
    }

    fn execute<'a>(
        &'a self,
        tx_bytes: &'a str,
        signatures: &'a [String],
    ) -> LedgerFuture<'a, TransactionBlockResponse> {
        Box::pin(async move {
            self.call(
                "sui_executeTransactionBlock",
                json!([
                    tx_bytes,
                    signatures,
                    { "showEffects": true },
                    "WaitForLocalExecution",
                ]),
            )
            .await
        })
    }

    fn get_object<'a>(&'a self, object_id: &'a str) -> LedgerFuture<'a, ObjectResponse> {
        Box::pin(async move {
            self.call("sui_getObject", json!([object_id, { "showContent": true }]))
                .await
        })
    }
}
