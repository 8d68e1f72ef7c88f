//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Secrets
//! (mnemonics, passphrases, master keys) are never part of the schema; they
//! come from environment variables only.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::Chain;
use crate::keys::Scheme;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TzkitConfig {
    /// Node connection settings.
    pub node: NodeConfig,

    /// Wallet and operation defaults.
    pub wallet: WalletConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Node RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node RPC (e.g., "http://localhost:8732").
    pub provider_url: String,

    /// Chain segment used in RPC paths.
    pub chain: Chain,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://localhost:8732".to_string(),
            chain: Chain::default(),
            request_timeout_secs: 30,
        }
    }
}

/// Wallet scheme and per-operation defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// `secp256k1` for HD (tz2) accounts, `ed25519` for passphrase (tz1) accounts.
    pub scheme: Scheme,

    /// Gas limit when a transfer does not set one.
    pub default_gas_limit: u64,

    /// Storage limit when a transfer does not set one.
    pub default_storage_limit: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Secp256k1,
            default_gas_limit: 200,
            default_storage_limit: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
