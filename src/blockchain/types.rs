//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::KeyError;
use crate::lifecycle::Cancelled;

/// Chain identifier used in RPC paths (`main`, `test`, or a chain id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(String);

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self("main".to_string())
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Missing wallet, source key or other construction input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Key derivation or signing failure.
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// Connection-level failure talking to the node.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Node answered with a non-success status. `body` is verbatim.
    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Response did not have the expected JSON shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for BlockchainError {
    fn from(_: Cancelled) -> Self {
        BlockchainError::Cancelled
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Head block header fields the builder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u64>,
}

/// Contract state at a given block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub counter: u64,
    pub balance: Option<String>,
}

impl ContractInfo {
    /// Reads `counter` (a decimal string on the wire) and `balance`.
    pub fn from_json(value: &serde_json::Value) -> BlockchainResult<Self> {
        let counter = match value.get("counter") {
            Some(serde_json::Value::String(s)) => s.parse::<u64>().ok(),
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| BlockchainError::Parse(format!("missing or malformed counter in {value}")))?;

        let balance = value.get("balance").and_then(|b| match b {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(Self { counter, balance })
    }
}
