//! Account derivation.
//!
//! # Data Flow
//! ```text
//! Environment Variables (mnemonic, passphrase, master key)
//!     → hd.rs (BIP39 seed → BIP32 master → m/44'/1729'/0'/0/{index}, tz2)
//!     → seed.rs (BIP39 seed → Ed25519 seed, tz1)
//!     → Account (index + key pair + address)
//! ```
//!
//! # Security Constraints
//! - Secrets ONLY from environment variables or explicit arguments
//! - Seeds are wiped as soon as the master key / key pair exists
//! - Never log mnemonics, passphrases or keys

pub mod hd;
pub mod seed;

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::crypto::Watermark;
use crate::keys::{KeyPair, KeyResult, Scheme, SignedEnvelope, SigningCapability};

pub use hd::HdWallet;
pub use seed::{PassphraseWallet, SeedWallet};

/// An address together with the index it was derived at.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WalletAddress {
    pub address: String,
    pub index: u32,
}

/// A derived account: its index, key pair and address.
#[derive(Debug)]
pub struct Account {
    index: u32,
    keys: KeyPair,
}

impl Account {
    pub fn new(index: u32, keys: KeyPair) -> Self {
        Self { index, keys }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn address(&self) -> &str {
        self.keys.address()
    }

    pub fn wallet_address(&self) -> WalletAddress {
        WalletAddress {
            address: self.keys.address().to_string(),
            index: self.index,
        }
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Base58Check public key. Do not retain.
    pub fn decrypted_public_key(&self) -> Zeroizing<String> {
        self.keys.decrypted_public_key()
    }

    pub fn sign(&self, payload: &[u8], watermark: Option<Watermark>) -> KeyResult<SignedEnvelope> {
        self.keys.sign(payload, watermark)
    }
}

/// Source of per-index accounts, consumed by the RPC facade.
pub trait AccountProvider: Send + Sync {
    /// Derive the account at `index`. Same index, same keys, every time.
    fn account(&self, index: u32) -> KeyResult<Account>;

    /// `size` consecutive addresses starting at `from`.
    fn addresses(&self, from: u32, size: u32) -> KeyResult<Vec<WalletAddress>> {
        (0..size)
            .map(|i| self.account(from + i).map(|acc| acc.wallet_address()))
            .collect()
    }
}

/// Wallet for `scheme` built from environment variables.
///
/// `secp256k1` loads an [`HdWallet`], `ed25519` a [`PassphraseWallet`].
pub fn from_env(scheme: Scheme) -> KeyResult<Arc<dyn AccountProvider>> {
    let wallet: Arc<dyn AccountProvider> = match scheme {
        Scheme::Secp256k1 => Arc::new(HdWallet::from_env()?),
        Scheme::Ed25519 => Arc::new(PassphraseWallet::from_env()?),
    };
    Ok(wallet)
}

/// Lowercase, trim, and collapse runs of whitespace between words.
pub(crate) fn normalize_mnemonic(mnemonic: &str) -> Zeroizing<String> {
    Zeroizing::new(
        mnemonic
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    )
}
