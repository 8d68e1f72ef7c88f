//! Tezos client library: key derivation, address encoding, and the
//! forge → sign → preapply → inject operation pipeline.

pub mod blockchain;
pub mod config;
pub mod crypto;
pub mod keys;
pub mod lifecycle;
pub mod observability;
pub mod wallet;

pub use blockchain::{BlockchainError, NodeClient, NodeGateway, TezosRpc};
pub use config::schema::TzkitConfig;
pub use crypto::{check_address, Address};
pub use keys::{KeyPair, Scheme, SigningCapability};
pub use lifecycle::{CancelToken, Cancellation};
pub use wallet::{AccountProvider, HdWallet, PassphraseWallet, SeedWallet};
