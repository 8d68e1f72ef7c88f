//! Operation building, signing and injection against a node.
//!
//! # Data Flow
//! ```text
//! AccountProvider (wallet)
//!     → transaction.rs (context fetch, reveal, counters, amounts)
//!     → pipeline.rs (forge → sign → preapply → gate → inject)
//!     → results.rs (typed per-operation results)
//! gateway.rs is the node seam; client.rs implements it over HTTP.
//! ```
//!
//! # Security Constraints
//! - Signing keys ONLY from environment variables or caller-held wallets
//! - Never log private keys or public-key material being revealed
//! - All RPC calls have configurable timeouts and honour cancellation
//! - A batch with any failed preapply result is never injected

pub mod amount;
pub mod client;
pub mod gateway;
pub mod operations;
pub mod pipeline;
pub mod results;
pub mod rpc;
pub mod transaction;
pub mod types;

pub use amount::Tez;
pub use client::NodeClient;
pub use gateway::NodeGateway;
pub use operations::{OperationKind, PendingOperation};
pub use pipeline::{BatchOutcome, OperationPipeline};
pub use results::{OperationResult, ResultDetails, ResultHandlers};
pub use rpc::TezosRpc;
pub use transaction::{Limits, OperationDefaults, PreparedBatch, TransferRequest, TxBuilder};
pub use types::{BlockHeader, BlockchainError, BlockchainResult, Chain, ContractInfo};
