//! High-level entry points: build a batch for a wallet account and push it
//! through the pipeline.

use std::sync::Arc;

use crate::blockchain::client::NodeClient;
use crate::blockchain::gateway::NodeGateway;
use crate::blockchain::pipeline::{BatchOutcome, OperationPipeline};
use crate::blockchain::results::ResultHandlers;
use crate::blockchain::transaction::{
    activate_account_operation, Limits, OperationDefaults, PreparedBatch, TransferRequest,
    TxBuilder,
};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::TzkitConfig;
use crate::keys::SigningCapability;
use crate::lifecycle::CancelToken;
use crate::wallet::{Account, AccountProvider};

/// Node access bound to an optional wallet.
pub struct TezosRpc {
    pipeline: OperationPipeline,
    wallet: Option<Arc<dyn AccountProvider>>,
    defaults: OperationDefaults,
}

impl TezosRpc {
    pub fn new(
        gateway: Arc<dyn NodeGateway>,
        handlers: ResultHandlers,
        wallet: Option<Arc<dyn AccountProvider>>,
    ) -> Self {
        Self {
            pipeline: OperationPipeline::new(gateway, handlers),
            wallet,
            defaults: OperationDefaults::default(),
        }
    }

    /// HTTP-backed instance with defaults taken from `config`.
    pub fn from_config(
        config: &TzkitConfig,
        wallet: Option<Arc<dyn AccountProvider>>,
    ) -> BlockchainResult<Self> {
        let client = NodeClient::new(&config.node)?;
        Ok(Self::new(Arc::new(client), ResultHandlers::default(), wallet)
            .with_defaults(OperationDefaults::from(&config.wallet)))
    }

    pub fn with_defaults(mut self, defaults: OperationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.pipeline = self.pipeline.with_cancel_token(cancel);
        self
    }

    pub fn pipeline(&self) -> &OperationPipeline {
        &self.pipeline
    }

    fn account(&self, index: u32) -> BlockchainResult<Account> {
        let wallet = self.wallet.as_ref().ok_or_else(|| {
            BlockchainError::Configuration("no wallet configured for signing".to_string())
        })?;
        Ok(wallet.account(index)?)
    }

    fn builder(&self) -> TxBuilder<'_> {
        TxBuilder::new(self.pipeline.gateway(), self.defaults)
            .with_cancel_token(self.pipeline.cancel_token().clone())
    }

    /// Builds the batch for one transfer without submitting it.
    pub async fn prepare_transaction(
        &self,
        index: u32,
        transfer: &TransferRequest,
    ) -> BlockchainResult<PreparedBatch> {
        let account = self.account(index)?;
        self.builder().build_transfer(&account, transfer).await
    }

    /// One transfer from account `index`, revealing the key first if needed.
    pub async fn send_transaction(
        &self,
        index: u32,
        transfer: &TransferRequest,
    ) -> BlockchainResult<BatchOutcome> {
        let account = self.account(index)?;
        let batch = self.builder().build_transfer(&account, transfer).await?;
        self.pipeline.submit(account.keys(), &batch).await
    }

    /// Several transfers from account `index` as one operation group.
    pub async fn send_transactions(
        &self,
        index: u32,
        transfers: &[TransferRequest],
        reveal_limits: Limits,
    ) -> BlockchainResult<BatchOutcome> {
        let account = self.account(index)?;
        let batch = self
            .builder()
            .build_batch(&account, transfers, reveal_limits)
            .await?;
        self.pipeline.submit(account.keys(), &batch).await
    }

    /// Activates the signer's own fundraiser address with `secret`.
    pub async fn activate_account(
        &self,
        signer: &dyn SigningCapability,
        secret: &str,
    ) -> BlockchainResult<BatchOutcome> {
        let operation = activate_account_operation(signer.address(), secret)?;
        let header = self
            .pipeline
            .cancel_token()
            .run(self.pipeline.gateway().get_header())
            .await?;
        let batch = PreparedBatch {
            header,
            operations: vec![operation],
        };
        self.pipeline.submit(signer, &batch).await
    }
}

impl std::fmt::Debug for TezosRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TezosRpc")
            .field("pipeline", &self.pipeline)
            .field("has_wallet", &self.wallet.is_some())
            .field("defaults", &self.defaults)
            .finish()
    }
}
