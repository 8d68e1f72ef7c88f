//! HTTP node client with timeout and error handling.
//!
//! # Responsibilities
//! - Issue JSON requests against the node RPC over HTTP/1.1
//! - Map transport failures, non-2xx statuses and malformed bodies to
//!   distinct errors; the status body is surfaced verbatim
//! - Provide the read-only chain queries (head, blocks, balances, mempool)
//!
//! Nothing is retried here; retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::blockchain::amount::Tez;
use crate::blockchain::gateway::{manager_key_from_json, NodeGateway};
use crate::blockchain::operations::PendingOperation;
use crate::blockchain::types::{BlockHeader, BlockchainError, BlockchainResult, Chain, ContractInfo};
use crate::config::NodeConfig;
use crate::observability::metrics;

/// Validation pass that carries manager operations (transactions, reveals).
const MANAGER_PASS: u8 = 3;

/// Node RPC client.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    chain: Chain,
    timeout_secs: u64,
}

impl NodeClient {
    /// Create a new client. No request is made until the first call.
    pub fn new(config: &NodeConfig) -> BlockchainResult<Self> {
        let parsed: url::Url = config.provider_url.parse().map_err(|e| {
            BlockchainError::Configuration(format!(
                "Invalid provider URL '{}': {}",
                config.provider_url, e
            ))
        })?;

        let http = reqwest::Client::builder()
            .http1_only()
            .build()
            .map_err(|e| BlockchainError::Transport(format!("HTTP client setup failed: {e}")))?;

        tracing::debug!(
            provider_url = %parsed,
            chain = %config.chain,
            timeout_secs = config.request_timeout_secs,
            "Node client initialized"
        );

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            chain: config.chain.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET when `body` is `None`, POST with a JSON body otherwise.
    async fn query(
        &self,
        endpoint: &'static str,
        path: &str,
        body: Option<String>,
    ) -> BlockchainResult<Value> {
        let result = match timeout(Duration::from_secs(self.timeout_secs), self.send(path, body)).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(self.timeout_secs)),
        };

        if let Err(e) = &result {
            metrics::record_rpc_error(endpoint);
            tracing::warn!(endpoint, error = %e, "Node request failed");
        }
        result
    }

    async fn send(&self, path: &str, body: Option<String>) -> BlockchainResult<Value> {
        let url = self.url(path);
        let request = match body {
            None => self.http.get(&url),
            Some(body) => self
                .http
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        }
        .version(reqwest::Version::HTTP_11);

        tracing::debug!(url = %url, "Node request");

        let response = request
            .send()
            .await
            .map_err(|e| BlockchainError::Transport(e.to_string()))?;

        let status = response.status();
        let is_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/plain"));
        let text = response
            .text()
            .await
            .map_err(|e| BlockchainError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = if text.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                text
            };
            return Err(BlockchainError::Request {
                status: status.as_u16(),
                body,
            });
        }

        if is_text {
            return Ok(Value::String(text));
        }
        serde_json::from_str(&text)
            .map_err(|e| BlockchainError::Parse(format!("invalid JSON from {path}: {e}")))
    }

    fn expect_string(value: Value, what: &str) -> BlockchainResult<String> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(BlockchainError::Parse(format!("expected {what} string, got {other}"))),
        }
    }

    // Read-only queries.

    /// RPC directory; some node versions require `recurse=true`.
    pub async fn describe(&self) -> BlockchainResult<Value> {
        self.query("describe", "describe?recurse=true", None).await
    }

    pub async fn get_mempool(&self) -> BlockchainResult<Value> {
        let path = format!("chains/{}/mempool/pending_operations", self.chain);
        self.query("mempool", &path, None).await
    }

    pub async fn get_head(&self) -> BlockchainResult<Value> {
        let path = format!("chains/{}/blocks/head", self.chain);
        self.query("head", &path, None).await
    }

    pub async fn get_block(&self, level: u64) -> BlockchainResult<Value> {
        let path = format!("chains/{}/blocks/{}", self.chain, level);
        self.query("block", &path, None).await
    }

    /// All operation passes of a block.
    pub async fn get_block_operations(&self, level: u64) -> BlockchainResult<Value> {
        let path = format!("chains/{}/blocks/{}/operations", self.chain, level);
        self.query("block_operations", &path, None).await
    }

    /// Manager operations (transfers, reveals) of a block.
    pub async fn get_manager_operations(&self, level: u64) -> BlockchainResult<Value> {
        let path = format!("chains/{}/blocks/{}/operations/{}", self.chain, level, MANAGER_PASS);
        self.query("block_operations", &path, None).await
    }

    pub async fn get_manager_operation_hashes(&self, level: u64) -> BlockchainResult<Vec<String>> {
        let path = format!(
            "chains/{}/blocks/{}/operation_hashes/{}",
            self.chain, level, MANAGER_PASS
        );
        let value = self.query("operation_hashes", &path, None).await?;
        serde_json::from_value(value)
            .map_err(|e| BlockchainError::Parse(format!("operation hashes: {e}")))
    }

    pub async fn get_balance(&self, address: &str) -> BlockchainResult<Tez> {
        let path = format!(
            "chains/{}/blocks/head/context/contracts/{}/balance",
            self.chain, address
        );
        let value = self.query("balance", &path, None).await?;
        let mutez = Self::expect_string(value, "balance")?
            .parse::<u64>()
            .map_err(|e| BlockchainError::Parse(format!("balance: {e}")))?;
        Ok(Tez::from_mutez(mutez))
    }

    pub async fn get_counter(&self, address: &str) -> BlockchainResult<u64> {
        let path = format!(
            "chains/{}/blocks/head/context/contracts/{}/counter",
            self.chain, address
        );
        let value = self.query("counter", &path, None).await?;
        Self::expect_string(value, "counter")?
            .parse::<u64>()
            .map_err(|e| BlockchainError::Parse(format!("counter: {e}")))
    }

    pub async fn get_network_stat(&self) -> BlockchainResult<Value> {
        self.query("network_stat", "network/stat", None).await
    }
}

#[async_trait]
impl NodeGateway for NodeClient {
    async fn get_header(&self) -> BlockchainResult<BlockHeader> {
        let path = format!("chains/{}/blocks/head/header", self.chain);
        let value = self.query("header", &path, None).await?;
        serde_json::from_value(value).map_err(|e| BlockchainError::Parse(format!("header: {e}")))
    }

    async fn get_account_for_block(
        &self,
        block_hash: &str,
        address: &str,
    ) -> BlockchainResult<ContractInfo> {
        let path = format!(
            "chains/{}/blocks/{}/context/contracts/{}",
            self.chain, block_hash, address
        );
        let value = self.query("contract", &path, None).await?;
        ContractInfo::from_json(&value)
    }

    async fn get_manager_key(&self, address: &str) -> BlockchainResult<Option<String>> {
        let path = format!(
            "chains/{}/blocks/head/context/contracts/{}/manager_key",
            self.chain, address
        );
        let value = self.query("manager_key", &path, None).await?;
        Ok(manager_key_from_json(&value))
    }

    async fn forge_operations(
        &self,
        branch: &str,
        contents: &[PendingOperation],
    ) -> BlockchainResult<String> {
        let path = format!("chains/{}/blocks/head/helpers/forge/operations", self.chain);
        let body = json!({ "branch": branch, "contents": contents });
        let value = self.query("forge", &path, Some(body.to_string())).await?;
        Self::expect_string(value, "forged bytes")
    }

    async fn preapply_operations(
        &self,
        protocol: &str,
        branch: &str,
        contents: &[PendingOperation],
        signature: &str,
    ) -> BlockchainResult<Value> {
        let path = format!("chains/{}/blocks/head/helpers/preapply/operations", self.chain);
        let body = json!([{
            "protocol": protocol,
            "branch": branch,
            "contents": contents,
            "signature": signature,
        }]);
        self.query("preapply", &path, Some(body.to_string())).await
    }

    async fn inject_operation(&self, signed_bytes: &str) -> BlockchainResult<String> {
        let path = format!("injection/operation?chain={}", self.chain);
        let body = Value::String(signed_bytes.to_string()).to_string();
        let value = self.query("inject", &path, Some(body)).await?;
        Self::expect_string(value, "operation hash")
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("base_url", &self.base_url)
            .field("chain", &self.chain)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
