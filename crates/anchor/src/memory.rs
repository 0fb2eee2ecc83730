//! In-memory ledger.
//!
//! Verifies signatures the way a full node does and stores created objects
//! so manifests can be anchored and read back without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde_json::{Value, json};

use crate::error::AnchorError;
use crate::key::ED25519_FLAG;
use crate::rpc::{LedgerClient, LedgerFuture};
use crate::signer::{derive_address, intent_digest};
use crate::types::{
    ExecutionState, ExecutionStatus, MoveCall, ObjectContent, ObjectData, ObjectRef,
    ObjectResponse, OwnedObjectRef, TransactionBlockBytes, TransactionBlockResponse,
    TransactionEffects,
};

#[derive(Default)]
struct LedgerState {
    pending: HashMap<String, MoveCall>,
    objects: HashMap<String, Value>,
    executed: usize,
}

/// Ledger kept in process memory.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    failure: Option<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every execution reports `failure` with this error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            failure: Some(error.into()),
            ..Self::default()
        }
    }

    /// Stores an object with the given content fields.
    pub fn insert_object(&self, object_id: &str, fields: Value) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(object_id.to_string(), fields);
    }

    /// Number of transactions submitted so far.
    pub fn executed(&self) -> usize {
        self.state.lock().unwrap().executed
    }

    fn verify(tx_bytes: &str, signature: &str, sender: &str) -> Result<(), AnchorError> {
        let invalid = || AnchorError::Rpc {
            code: -32002,
            message: "Invalid user signature".into(),
        };

        let tx = BASE64.decode(tx_bytes)?;
        let raw = BASE64.decode(signature).map_err(|_| invalid())?;
        if raw.len() != 97 || raw[0] != ED25519_FLAG {
            return Err(invalid());
        }
        let sig_bytes: [u8; 64] = raw[1..65].try_into().map_err(|_| invalid())?;
        let pk_bytes: [u8; 32] = raw[65..].try_into().map_err(|_| invalid())?;
        let public_key = VerifyingKey::from_bytes(&pk_bytes).map_err(|_| invalid())?;

        public_key
            .verify(&intent_digest(&tx), &Signature::from_bytes(&sig_bytes))
            .map_err(|_| invalid())?;
        if derive_address(&public_key) != sender {
            return Err(invalid());
        }
        Ok(())
    }
}

impl LedgerClient for MemoryLedger {
    fn move_call<'a>(&'a self, call: &'a MoveCall) -> LedgerFuture<'a, TransactionBlockBytes> {
        Box::pin(async move {
            let body = serde_json::to_vec(&json!({
                "sender": call.sender,
                "target": format!("{}::{}::{}", call.package, call.module, call.function),
                "arguments": call.arguments,
                "gasBudget": call.gas_budget,
            }))?;
            let tx_bytes = BASE64.encode(body);
            self.state
                .lock()
                .unwrap()
                .pending
                .insert(tx_bytes.clone(), call.clone());
            Ok(TransactionBlockBytes { tx_bytes })
        })
    }

    fn execute<'a>(
        &'a self,
        tx_bytes: &'a str,
        signatures: &'a [String],
    ) -> LedgerFuture<'a, TransactionBlockResponse> {
        Box::pin(async move {
            let call = self
                .state
                .lock()
                .unwrap()
                .pending
                .remove(tx_bytes)
                .ok_or_else(|| AnchorError::Rpc {
                    code: -32602,
                    message: "unknown transaction".into(),
                })?;
            let signature = signatures.first().ok_or_else(|| AnchorError::Rpc {
                code: -32602,
                message: "missing signature".into(),
            })?;
            Self::verify(tx_bytes, signature, &call.sender)?;

            let mut state = self.state.lock().unwrap();
            state.executed += 1;
            let digest = format!("Tx{:08}", state.executed);

            if let Some(error) = &self.failure {
                return Ok(TransactionBlockResponse {
                    digest,
                    effects: Some(TransactionEffects {
                        status: ExecutionStatus {
                            status: ExecutionState::Failure,
                            error: Some(error.clone()),
                        },
                        created: Vec::new(),
                    }),
                });
            }

            let object_id = format!("0x{:064x}", state.executed);
            let arg = |i: usize| call.arguments.get(i).cloned().unwrap_or(Value::Null);
            state.objects.insert(
                object_id.clone(),
                json!({
                    "name": arg(0),
                    "description": arg(1),
                    "metadata": arg(2),
                }),
            );

            Ok(TransactionBlockResponse {
                digest,
                effects: Some(TransactionEffects {
                    status: ExecutionStatus {
                        status: ExecutionState::Success,
                        error: None,
                    },
                    created: vec![OwnedObjectRef {
                        reference: ObjectRef { object_id },
                    }],
                }),
            })
        })
    }

    fn get_object<'a>(&'a self, object_id: &'a str) -> LedgerFuture<'a, ObjectResponse> {
        Box::pin(async move {
            let fields = self.state.lock().unwrap().objects.get(object_id).cloned();
            Ok(match fields {
                Some(fields) => ObjectResponse {
                    data: Some(ObjectData {
                        object_id: object_id.to_string(),
                        content: Some(ObjectContent {
                            data_type: "moveObject".into(),
                            fields,
                        }),
                    }),
                    error: None,
                },
                None => ObjectResponse {
                    data: None,
                    error: Some(json!({"code": "notExists", "object_id": object_id})),
                },
            })
        })
    }
}
