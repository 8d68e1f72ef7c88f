//! Forge, sign, preapply and inject a prepared batch.
//!
//! # Data Flow
//! ```text
//! PreparedBatch
//!     → forge (node)          hex bytes
//!     → sign (Generic wm)     SignedEnvelope
//!     → preapply (node)       per-operation results
//!     → sanitize              oversized error strings blanked
//!     → gate                  any failure: return, nothing injected
//!     → inject (node)         operation hash on the last result
//! ```
//!
//! Steps run strictly in order. Every node call is raced against the
//! pipeline's [`CancelToken`]; a cancelled batch is never injected.

use std::sync::Arc;

use crate::blockchain::gateway::NodeGateway;
use crate::blockchain::results::{OperationResult, ResultHandlers};
use crate::blockchain::transaction::PreparedBatch;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::crypto::Watermark;
use crate::keys::{SignedEnvelope, SigningCapability};
use crate::lifecycle::CancelToken;
use crate::observability::metrics;

/// Outcome of a submitted batch.
///
/// `injected` is false whenever any result failed preapply.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub results: Vec<OperationResult>,
    pub operation_hash: Option<String>,
}

impl BatchOutcome {
    pub fn injected(&self) -> bool {
        self.operation_hash.is_some()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }
}

pub struct OperationPipeline {
    gateway: Arc<dyn NodeGateway>,
    handlers: ResultHandlers,
    cancel: CancelToken,
}

impl OperationPipeline {
    pub fn new(gateway: Arc<dyn NodeGateway>, handlers: ResultHandlers) -> Self {
        Self {
            gateway,
            handlers,
            cancel: CancelToken::none(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn gateway(&self) -> &dyn NodeGateway {
        self.gateway.as_ref()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Forge and sign `batch` with the Generic watermark.
    pub async fn forge_and_sign(
        &self,
        signer: &dyn SigningCapability,
        batch: &PreparedBatch,
    ) -> BlockchainResult<SignedEnvelope> {
        let forged = self
            .cancel
            .run(self.gateway.forge_operations(&batch.header.hash, &batch.operations))
            .await?;
        tracing::debug!(
            branch = %batch.header.hash,
            forged_len = forged.len() / 2,
            "Operations forged"
        );

        let bytes = hex::decode(&forged).map_err(|e| {
            BlockchainError::Parse(format!("forged operation is not hex: {e}"))
        })?;
        let envelope = signer.sign(&bytes, Some(Watermark::Generic))?;
        Ok(envelope)
    }

    /// Runs the whole pipeline for one batch.
    pub async fn submit(
        &self,
        signer: &dyn SigningCapability,
        batch: &PreparedBatch,
    ) -> BlockchainResult<BatchOutcome> {
        if batch.operations.is_empty() {
            return Err(BlockchainError::Configuration(
                "cannot submit an empty batch".to_string(),
            ));
        }

        let envelope = self.forge_and_sign(signer, batch).await?;

        let response = self
            .cancel
            .run(self.gateway.preapply_operations(
                &batch.header.protocol,
                &batch.header.hash,
                &batch.operations,
                &envelope.encoded_signature,
            ))
            .await?;
        metrics::record_batch_submitted(batch.operations.len());

        let mut results = self.handlers.parse_preapply(&response)?;
        let blanked: usize = results.iter_mut().map(OperationResult::sanitize).sum();
        if blanked > 0 {
            tracing::debug!(blanked, "Blanked oversized error fields");
        }

        let failed = results.iter().filter(|r| !r.succeeded).count();
        if failed > 0 {
            metrics::record_batch_rejected(failed);
            tracing::warn!(
                source = signer.address(),
                failed,
                total = results.len(),
                "Preapply rejected batch, not injecting"
            );
            return Ok(BatchOutcome {
                results,
                operation_hash: None,
            });
        }

        self.cancel.check::<BlockchainError>()?;

        let hash = self
            .cancel
            .run(self.gateway.inject_operation(&envelope.signed_bytes))
            .await?;
        metrics::record_operations_injected(batch.operations.len());
        tracing::info!(
            source = signer.address(),
            operation_hash = %hash,
            operations = batch.operations.len(),
            "Operation injected"
        );

        if let Some(last) = results.last_mut() {
            last.attach_operation_hash(&hash);
        }

        Ok(BatchOutcome {
            results,
            operation_hash: Some(hash),
        })
    }
}

impl std::fmt::Debug for OperationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationPipeline")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
