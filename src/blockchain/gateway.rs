//! Narrow node interface consumed by the builder and the pipeline.

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::operations::PendingOperation;
use crate::blockchain::types::{BlockHeader, BlockchainResult, ContractInfo};

/// Read/write access to a node. [`crate::blockchain::NodeClient`] is the
/// HTTP implementation; tests substitute scripted ones.
#[async_trait]
pub trait NodeGateway: Send + Sync {
    /// `GET chains/{chain}/blocks/head/header`
    async fn get_header(&self) -> BlockchainResult<BlockHeader>;

    /// `GET chains/{chain}/blocks/{hash}/context/contracts/{address}`
    async fn get_account_for_block(
        &self,
        block_hash: &str,
        address: &str,
    ) -> BlockchainResult<ContractInfo>;

    /// `GET .../contracts/{address}/manager_key`; `None` when unrevealed.
    async fn get_manager_key(&self, address: &str) -> BlockchainResult<Option<String>>;

    /// Forged bytes of `{branch, contents}` as hex.
    async fn forge_operations(
        &self,
        branch: &str,
        contents: &[PendingOperation],
    ) -> BlockchainResult<String>;

    /// Raw preapply response: one applied group per submitted group.
    async fn preapply_operations(
        &self,
        protocol: &str,
        branch: &str,
        contents: &[PendingOperation],
        signature: &str,
    ) -> BlockchainResult<Value>;

    /// Injects signed bytes and returns the operation hash.
    async fn inject_operation(&self, signed_bytes: &str) -> BlockchainResult<String>;
}

/// Interprets a `manager_key` response.
///
/// Nodes answer with `null`, an empty string, a bare key string, or (older
/// protocols) an object carrying `key`.
pub fn manager_key_from_json(value: &Value) -> Option<String> {
    let key = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("key").and_then(Value::as_str)?,
        _ => return None,
    };
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}
