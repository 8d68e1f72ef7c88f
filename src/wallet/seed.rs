//! Non-hierarchical Ed25519 wallets (`tz1`).
//!
//! The Ed25519 seed is the first 32 bytes of the BIP39 seed, the scheme used
//! by fundraiser-style wallets where the passphrase is email + password.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::keys::{Ed25519Keys, KeyError, KeyResult, SealedSecret, SigningCapability};
use crate::wallet::hd::{MNEMONIC_ENV_VAR, PASSPHRASE_ENV_VAR};
use crate::wallet::{normalize_mnemonic, Account, AccountProvider};

/// Entropy size of a freshly generated 15-word mnemonic.
const MNEMONIC_ENTROPY_BYTES: usize = 20;

/// A single Ed25519 key pair derived from one seed.
#[derive(Debug)]
pub struct SeedWallet {
    keys: Ed25519Keys,
}

impl SeedWallet {
    /// Random, non-recoverable wallet.
    pub fn random() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut seed[..]);
        Self {
            keys: Ed25519Keys::from_seed(&seed),
        }
    }

    /// New wallet with a fresh 15-word mnemonic.
    ///
    /// The mnemonic is returned once so the caller can back it up.
    pub fn generate(passphrase: &str) -> KeyResult<(Self, Zeroizing<String>)> {
        let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_BYTES]);
        OsRng.fill_bytes(&mut entropy[..]);
        let mnemonic = bip39::Mnemonic::from_entropy(&entropy[..])
            .map_err(|e| KeyError::Derivation(format!("mnemonic generation: {e}")))?;
        let phrase = Zeroizing::new(mnemonic.to_string());
        let wallet = Self::from_mnemonic(&phrase, passphrase)?;
        Ok((wallet, phrase))
    }

    /// Ed25519 wallet from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> KeyResult<Self> {
        let seed: &[u8; 32] = seed.try_into().map_err(|_| {
            KeyError::Configuration(format!("seed must be 32 bytes, got {}", seed.len()))
        })?;
        Ok(Self {
            keys: Ed25519Keys::from_seed(seed),
        })
    }

    /// Wallet from a mnemonic and a non-empty passphrase.
    pub fn from_mnemonic(mnemonic: &str, passphrase: &str) -> KeyResult<Self> {
        let normalized = normalize_mnemonic(mnemonic);
        if normalized.is_empty() {
            return Err(KeyError::Configuration("mnemonic words required".to_string()));
        }
        if passphrase.trim().is_empty() {
            return Err(KeyError::Configuration("passphrase required".to_string()));
        }

        let mnemonic = bip39::Mnemonic::parse(normalized.as_str())
            .map_err(|e| KeyError::Derivation(format!("invalid mnemonic: {e}")))?;
        let full = Zeroizing::new(mnemonic.to_seed(passphrase));
        Self::from_seed(&full[..32])
    }

    /// Fundraiser-style wallet: passphrase is `email ‖ password`.
    pub fn from_fundraiser(mnemonic: &str, email: &str, password: &str) -> KeyResult<Self> {
        let passphrase = Zeroizing::new(format!("{email}{password}"));
        Self::from_mnemonic(mnemonic, &passphrase)
    }

    /// Wallet from an encoded `edsk` seed or secret key.
    pub fn from_encoded_seed(encoded: &str) -> KeyResult<Self> {
        Ok(Self {
            keys: Ed25519Keys::from_encoded_secret(encoded)?,
        })
    }

    pub fn address(&self) -> &str {
        self.keys.address()
    }

    pub fn keys(&self) -> &Ed25519Keys {
        &self.keys
    }

    pub fn into_keys(self) -> Ed25519Keys {
        self.keys
    }
}

/// Per-index Ed25519 accounts: account `i` uses passphrase `passphrase ‖ i`.
pub struct PassphraseWallet {
    mnemonic: SealedSecret,
    passphrase: SealedSecret,
}

impl PassphraseWallet {
    pub fn new(mnemonic: &str, passphrase: &str) -> KeyResult<Self> {
        if mnemonic.trim().is_empty() {
            return Err(KeyError::Configuration("mnemonic is empty".to_string()));
        }
        Ok(Self {
            mnemonic: SealedSecret::seal(mnemonic.as_bytes()),
            passphrase: SealedSecret::seal(passphrase.as_bytes()),
        })
    }

    /// Load from `TZKIT_MNEMONIC` and `TZKIT_PASSPHRASE`; both required.
    pub fn from_env() -> KeyResult<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .map(Zeroizing::new)
                .map_err(|_| KeyError::Configuration(format!("Environment variable {name} not set")))
        };
        let mnemonic = read(MNEMONIC_ENV_VAR)?;
        let passphrase = read(PASSPHRASE_ENV_VAR)?;
        let wallet = Self::new(&mnemonic, &passphrase)?;
        tracing::info!("Passphrase wallet loaded from environment");
        Ok(wallet)
    }

    /// The wallet for the bare passphrase, without an index suffix.
    pub fn default_account(&self) -> KeyResult<SeedWallet> {
        self.wallet_for(None)
    }

    fn wallet_for(&self, index: Option<u32>) -> KeyResult<SeedWallet> {
        let mnemonic = self.mnemonic.unmask();
        let passphrase = self.passphrase.unmask();
        let mnemonic = std::str::from_utf8(&mnemonic)
            .map_err(|_| KeyError::Configuration("mnemonic is not UTF-8".to_string()))?;
        let mut passphrase = Zeroizing::new(
            std::str::from_utf8(&passphrase)
                .map_err(|_| KeyError::Configuration("passphrase is not UTF-8".to_string()))?
                .to_string(),
        );
        if let Some(index) = index {
            passphrase.push_str(&index.to_string());
        }
        SeedWallet::from_mnemonic(mnemonic, &passphrase)
    }
}

impl AccountProvider for PassphraseWallet {
    fn account(&self, index: u32) -> KeyResult<Account> {
        let wallet = self.wallet_for(Some(index))?;
        Ok(Account::new(index, wallet.into_keys().into()))
    }
}

impl std::fmt::Debug for PassphraseWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseWallet").finish_non_exhaustive()
    }
}
