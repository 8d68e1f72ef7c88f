//! Batch construction: context fetch, conditional reveal, transfers.
//!
//! # Responsibilities
//! - Read head, source counter and manager key from the node
//! - Prepend a reveal when the source key is not yet on chain
//! - Number counters strictly +1 from the on-chain counter
//! - Convert human tez amounts and fees to mutez

use serde_json::Value;

use crate::blockchain::amount::Tez;
use crate::blockchain::gateway::NodeGateway;
use crate::blockchain::operations::{
    ActivateAccountOperation, PendingOperation, RevealOperation, TransactionOperation,
};
use crate::blockchain::types::{BlockHeader, BlockchainError, BlockchainResult};
use crate::config::WalletConfig;
use crate::crypto::check_address;
use crate::lifecycle::CancelToken;
use crate::wallet::Account;

/// Limits applied when a transfer leaves them unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDefaults {
    pub gas_limit: u64,
    pub storage_limit: u64,
}

impl Default for OperationDefaults {
    fn default() -> Self {
        Self {
            gas_limit: 200,
            storage_limit: 0,
        }
    }
}

impl From<&WalletConfig> for OperationDefaults {
    fn from(config: &WalletConfig) -> Self {
        Self {
            gas_limit: config.default_gas_limit,
            storage_limit: config.default_storage_limit,
        }
    }
}

/// Caller-supplied gas/storage limits; `None` falls back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    pub gas_limit: Option<u64>,
    pub storage_limit: Option<u64>,
}

impl Limits {
    fn resolve(&self, defaults: &OperationDefaults) -> (u64, u64) {
        (
            self.gas_limit.unwrap_or(defaults.gas_limit),
            self.storage_limit.unwrap_or(defaults.storage_limit),
        )
    }
}

/// One transfer to add to a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub destination: String,
    pub amount: Tez,
    pub fee: Tez,
    pub limits: Limits,
    /// Michelson parameters, attached verbatim.
    pub parameters: Option<Value>,
}

impl TransferRequest {
    pub fn new(destination: impl Into<String>, amount: Tez) -> Self {
        Self {
            destination: destination.into(),
            amount,
            fee: Tez::ZERO,
            limits: Limits::default(),
            parameters: None,
        }
    }

    pub fn with_fee(mut self, fee: Tez) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.limits.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_storage_limit(mut self, storage_limit: u64) -> Self {
        self.limits.storage_limit = Some(storage_limit);
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Chain state a batch is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContext {
    pub header: BlockHeader,
    pub counter: u64,
    pub manager_key: Option<String>,
}

impl BatchContext {
    pub fn is_revealed(&self) -> bool {
        self.manager_key.is_some()
    }
}

/// Ordered operations ready for forging, with the head they target.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub header: BlockHeader,
    pub operations: Vec<PendingOperation>,
}

impl PreparedBatch {
    pub fn has_reveal(&self) -> bool {
        matches!(self.operations.first(), Some(PendingOperation::Reveal(_)))
    }
}

/// Builds batches for one source account against a node.
pub struct TxBuilder<'a> {
    gateway: &'a dyn NodeGateway,
    defaults: OperationDefaults,
    cancel: CancelToken,
}

impl<'a> TxBuilder<'a> {
    pub fn new(gateway: &'a dyn NodeGateway, defaults: OperationDefaults) -> Self {
        Self {
            gateway,
            defaults,
            cancel: CancelToken::none(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Head, counter at that head, and manager key, in that order.
    pub async fn fetch_context(&self, source: &str) -> BlockchainResult<BatchContext> {
        let header = self.cancel.run(self.gateway.get_header()).await?;
        let account = self
            .cancel
            .run(self.gateway.get_account_for_block(&header.hash, source))
            .await?;
        let manager_key = self.cancel.run(self.gateway.get_manager_key(source)).await?;

        tracing::debug!(
            source,
            branch = %header.hash,
            counter = account.counter,
            revealed = manager_key.is_some(),
            "Fetched batch context"
        );

        Ok(BatchContext {
            header,
            counter: account.counter,
            manager_key,
        })
    }

    /// Single transfer; a needed reveal reuses the transfer's limits.
    pub async fn build_transfer(
        &self,
        account: &Account,
        transfer: &TransferRequest,
    ) -> BlockchainResult<PreparedBatch> {
        self.build(account, std::slice::from_ref(transfer), transfer.limits)
            .await
    }

    /// Several transfers in one group; a needed reveal uses `reveal_limits`.
    pub async fn build_batch(
        &self,
        account: &Account,
        transfers: &[TransferRequest],
        reveal_limits: Limits,
    ) -> BlockchainResult<PreparedBatch> {
        self.build(account, transfers, reveal_limits).await
    }

    async fn build(
        &self,
        account: &Account,
        transfers: &[TransferRequest],
        reveal_limits: Limits,
    ) -> BlockchainResult<PreparedBatch> {
        validate_transfers(transfers)?;

        let source = account.address();
        let context = self.fetch_context(source).await?;
        let operations = assemble_operations(
            account,
            &context,
            transfers,
            reveal_limits,
            &self.defaults,
        )?;

        tracing::info!(
            source,
            operations = operations.len(),
            reveal = !context.is_revealed(),
            "Batch prepared"
        );

        Ok(PreparedBatch {
            header: context.header,
            operations,
        })
    }
}

fn validate_transfers(transfers: &[TransferRequest]) -> BlockchainResult<()> {
    if transfers.is_empty() {
        return Err(BlockchainError::Configuration(
            "batch has no transfers".to_string(),
        ));
    }
    if let Some(bad) = transfers.iter().find(|t| !check_address(&t.destination)) {
        return Err(BlockchainError::Configuration(format!(
            "invalid destination address '{}'",
            bad.destination
        )));
    }
    Ok(())
}

/// Pure part of batch construction.
pub fn assemble_operations(
    account: &Account,
    context: &BatchContext,
    transfers: &[TransferRequest],
    reveal_limits: Limits,
    defaults: &OperationDefaults,
) -> BlockchainResult<Vec<PendingOperation>> {
    let source = account.address().to_string();
    let mut counter = context.counter;
    let mut next_counter = || {
        counter = counter
            .checked_add(1)
            .ok_or_else(|| BlockchainError::Parse("account counter overflow".to_string()))?;
        Ok::<u64, BlockchainError>(counter)
    };

    let mut operations = Vec::with_capacity(transfers.len() + 1);

    if !context.is_revealed() {
        let (gas_limit, storage_limit) = reveal_limits.resolve(defaults);
        let public_key = account.decrypted_public_key();
        operations.push(PendingOperation::Reveal(RevealOperation {
            source: source.clone(),
            fee: 0,
            counter: next_counter()?,
            gas_limit,
            storage_limit,
            public_key: public_key.as_str().to_string(),
        }));
    }

    for transfer in transfers {
        let (gas_limit, storage_limit) = transfer.limits.resolve(defaults);
        operations.push(PendingOperation::Transaction(TransactionOperation {
            source: source.clone(),
            fee: transfer.fee.to_mutez()?,
            counter: next_counter()?,
            gas_limit,
            storage_limit,
            amount: transfer.amount.to_mutez()?,
            destination: transfer.destination.clone(),
            parameters: transfer.parameters.clone(),
        }));
    }

    Ok(operations)
}

/// Activation of a fundraiser account; needs neither counter nor reveal.
pub fn activate_account_operation(pkh: &str, secret: &str) -> BlockchainResult<PendingOperation> {
    if !check_address(pkh) {
        return Err(BlockchainError::Configuration(format!(
            "invalid address to activate '{pkh}'"
        )));
    }
    if secret.is_empty() || hex::decode(secret).is_err() {
        return Err(BlockchainError::Configuration(
            "activation secret must be hex".to_string(),
        ));
    }
    Ok(PendingOperation::ActivateAccount(ActivateAccountOperation {
        pkh: pkh.to_string(),
        secret: secret.to_string(),
    }))
}
