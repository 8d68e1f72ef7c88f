//! Shared utilities for pipeline integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use tzkit::blockchain::{
    BlockHeader, BlockchainError, BlockchainResult, ContractInfo, NodeGateway, PendingOperation,
    ResultHandlers, TezosRpc,
};
use tzkit::wallet::{AccountProvider, HdWallet};

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const SOURCE: &str = "tz29obcqZxy5mrB2Bm7G4YQNr1VKng5oSKVT";
pub const DESTINATION: &str = "tz1Ke2h7sDdakHJQh8WX4Z372du1KChsksyU";
pub const FORGED_HEX: &str = "a1b2c3d46c0011223344";
pub const OP_HASH: &str = "ooTestHashInjected";

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Header,
    Account { block: String, address: String },
    ManagerKey { address: String },
    Forge { branch: String, contents: Vec<PendingOperation> },
    Preapply { protocol: String, signature: String },
    Inject { signed_bytes: String },
}

/// In-memory node that answers from a script and records every call.
pub struct ScriptedGateway {
    counter: String,
    forged: String,
    manager_key: Option<String>,
    statuses: Vec<String>,
    preapply_override: Option<Value>,
    preapply_delay: Option<Duration>,
    inject_error: Option<(u16, String)>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new(counter: u64, manager_key: Option<&str>) -> Self {
        Self {
            counter: counter.to_string(),
            forged: FORGED_HEX.to_string(),
            manager_key: manager_key.map(str::to_string),
            statuses: Vec::new(),
            preapply_override: None,
            preapply_delay: None,
            inject_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Per-operation preapply statuses, in batch order; missing ones are "applied".
    pub fn with_statuses(mut self, statuses: &[&str]) -> Self {
        self.statuses = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_counter_text(mut self, counter: &str) -> Self {
        self.counter = counter.to_string();
        self
    }

    pub fn with_forged(mut self, forged: &str) -> Self {
        self.forged = forged.to_string();
        self
    }

    pub fn with_preapply_response(mut self, response: Value) -> Self {
        self.preapply_override = Some(response);
        self
    }

    pub fn with_preapply_delay(mut self, delay: Duration) -> Self {
        self.preapply_delay = Some(delay);
        self
    }

    pub fn with_inject_error(mut self, status: u16, body: &str) -> Self {
        self.inject_error = Some((status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn injected(&self) -> bool {
        self.calls().iter().any(|c| matches!(c, Call::Inject { .. }))
    }

    pub fn forged_contents(&self) -> Vec<PendingOperation> {
        self.calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Forge { contents, .. } => Some(contents),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn echo(&self, contents: &[PendingOperation]) -> Value {
        let applied: Vec<Value> = contents
            .iter()
            .enumerate()
            .map(|(i, op)| {
                let status = self.statuses.get(i).map(String::as_str).unwrap_or("applied");
                let mut value = serde_json::to_value(op).unwrap();
                value["metadata"] = json!({
                    "operation_result": {"status": status, "consumed_gas": "1420"}
                });
                value
            })
            .collect();
        json!([{ "contents": applied, "signature": "sig" }])
    }
}

#[async_trait]
impl NodeGateway for ScriptedGateway {
    async fn get_header(&self) -> BlockchainResult<BlockHeader> {
        self.record(Call::Header);
        Ok(BlockHeader {
            hash: "BLockGenesisGenesisGenesisGenesisGenesisf79b5d1CoW2".to_string(),
            protocol: "PtTestProtocol".to_string(),
            level: Some(100),
        })
    }

    async fn get_account_for_block(
        &self,
        block_hash: &str,
        address: &str,
    ) -> BlockchainResult<ContractInfo> {
        self.record(Call::Account {
            block: block_hash.to_string(),
            address: address.to_string(),
        });
        ContractInfo::from_json(&json!({ "counter": self.counter, "balance": "5000000" }))
    }

    async fn get_manager_key(&self, address: &str) -> BlockchainResult<Option<String>> {
        self.record(Call::ManagerKey {
            address: address.to_string(),
        });
        Ok(self.manager_key.clone())
    }

    async fn forge_operations(
        &self,
        branch: &str,
        contents: &[PendingOperation],
    ) -> BlockchainResult<String> {
        self.record(Call::Forge {
            branch: branch.to_string(),
            contents: contents.to_vec(),
        });
        Ok(self.forged.clone())
    }

    async fn preapply_operations(
        &self,
        protocol: &str,
        _branch: &str,
        contents: &[PendingOperation],
        signature: &str,
    ) -> BlockchainResult<Value> {
        self.record(Call::Preapply {
            protocol: protocol.to_string(),
            signature: signature.to_string(),
        });
        if let Some(delay) = self.preapply_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .preapply_override
            .clone()
            .unwrap_or_else(|| self.echo(contents)))
    }

    async fn inject_operation(&self, signed_bytes: &str) -> BlockchainResult<String> {
        self.record(Call::Inject {
            signed_bytes: signed_bytes.to_string(),
        });
        match &self.inject_error {
            Some((status, body)) => Err(BlockchainError::Request {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(OP_HASH.to_string()),
        }
    }
}

pub fn test_wallet() -> Arc<dyn AccountProvider> {
    Arc::new(HdWallet::from_mnemonic(TEST_MNEMONIC, None).unwrap())
}

pub fn rpc_with(gateway: Arc<ScriptedGateway>) -> TezosRpc {
    TezosRpc::new(gateway, ResultHandlers::default(), Some(test_wallet()))
}
