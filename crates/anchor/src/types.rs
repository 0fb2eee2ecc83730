//! Ledger configuration and JSON-RPC wire types.

use docwalrus_protocol::constants::{DEFAULT_GAS_BUDGET, DEFAULT_SUI_ENDPOINT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where and how the manifest transaction is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default = "default_module")]
    pub module: String,
    #[serde(default = "default_function")]
    pub function: String,
    /// Gas budget in MIST.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
}

fn default_endpoint() -> String {
    DEFAULT_SUI_ENDPOINT.to_string()
}

fn default_package() -> String {
    "0x2".to_string()
}

fn default_module() -> String {
    "object_bag".to_string()
}

fn default_function() -> String {
    "new".to_string()
}

fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}

impl Default for SuiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            package: default_package(),
            module: default_module(),
            function: default_function(),
            gas_budget: default_gas_budget(),
        }
    }
}

impl SuiConfig {
    /// `package::module::function`.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// An unsigned Move call to build.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCall {
    pub sender: String,
    pub package: String,
    pub module: String,
    pub function: String,
    pub arguments: Vec<Value>,
    pub gas_budget: u64,
}

/// Result of `unsafe_moveCall`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockBytes {
    /// Base64 BCS transaction data.
    pub tx_bytes: String,
}

/// Result of `sui_executeTransactionBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockResponse {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionStatus {
    pub status: ExecutionState,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnedObjectRef {
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
}

/// Result of `sui_getObject`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: String,
    #[serde(default)]
    pub content: Option<ObjectContent>,
}

/// Parsed Move object content; `fields` keeps the raw field map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub fields: Value,
}
