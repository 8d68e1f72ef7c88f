//! Hierarchical deterministic wallet (BIP39 + BIP32, secp256k1 / `tz2`).

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::NetworkKind;

use crate::keys::{KeyError, KeyResult, Secp256k1Keys};
use crate::wallet::{normalize_mnemonic, Account, AccountProvider};

/// Environment variable holding the wallet mnemonic.
pub const MNEMONIC_ENV_VAR: &str = "TZKIT_MNEMONIC";
/// Environment variable holding the optional BIP39 passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "TZKIT_PASSPHRASE";
/// Environment variable holding an extended master key (alternative to a mnemonic).
pub const MASTER_KEY_ENV_VAR: &str = "TZKIT_MASTER_KEY";

/// Derivation path with `{index}` standing for the account index.
pub const DERIVATION_PATH_TEMPLATE: &str = "m/44'/1729'/0'/0/{index}";

/// BIP32 wallet rooted at one extended master key.
pub struct HdWallet {
    master: Xpriv,
}

impl HdWallet {
    /// Build from a BIP39 mnemonic and optional passphrase.
    pub fn from_mnemonic(mnemonic: &str, passphrase: Option<&str>) -> KeyResult<Self> {
        let normalized = normalize_mnemonic(mnemonic);
        if normalized.is_empty() {
            return Err(KeyError::Configuration("mnemonic is empty".to_string()));
        }

        let mnemonic = bip39::Mnemonic::parse(normalized.as_str())
            .map_err(|e| KeyError::Derivation(format!("invalid mnemonic: {e}")))?;
        let seed = zeroize::Zeroizing::new(mnemonic.to_seed(passphrase.unwrap_or("")));

        let master = Xpriv::new_master(NetworkKind::Main, &seed[..])
            .map_err(|e| KeyError::Derivation(format!("master key: {e}")))?;

        Ok(Self { master })
    }

    /// Build from a serialized extended master key (`xprv...`).
    pub fn from_master_key(master_key: &str) -> KeyResult<Self> {
        if master_key.trim().is_empty() {
            return Err(KeyError::Configuration("master key is empty".to_string()));
        }
        let master = Xpriv::from_str(master_key.trim())
            .map_err(|e| KeyError::Derivation(format!("invalid extended key: {e}")))?;
        Ok(Self { master })
    }

    /// Load from the environment.
    ///
    /// `TZKIT_MASTER_KEY` wins when set; otherwise `TZKIT_MNEMONIC` with the
    /// optional `TZKIT_PASSPHRASE`.
    pub fn from_env() -> KeyResult<Self> {
        if let Ok(master_key) = std::env::var(MASTER_KEY_ENV_VAR) {
            return Self::from_master_key(&master_key);
        }

        let mnemonic = zeroize::Zeroizing::new(std::env::var(MNEMONIC_ENV_VAR).map_err(|_| {
            KeyError::Configuration(format!(
                "Environment variable {} or {} not set",
                MNEMONIC_ENV_VAR, MASTER_KEY_ENV_VAR
            ))
        })?);
        let passphrase = std::env::var(PASSPHRASE_ENV_VAR).ok().map(zeroize::Zeroizing::new);

        let wallet = Self::from_mnemonic(&mnemonic, passphrase.as_ref().map(|p| p.as_str()))?;
        tracing::info!("HD wallet loaded from environment");
        Ok(wallet)
    }

    /// `m/44'/1729'/0'/0/{index}`.
    pub fn derivation_path(index: u32) -> String {
        DERIVATION_PATH_TEMPLATE.replace("{index}", &index.to_string())
    }

    /// Extended key of the account at `index`.
    pub fn derive_account_key(&self, index: u32) -> KeyResult<Xpriv> {
        let path = DerivationPath::from_str(&Self::derivation_path(index))
            .map_err(|e| KeyError::Derivation(format!("derivation path: {e}")))?;
        self.master
            .derive_priv(&Secp256k1::signing_only(), &path)
            .map_err(|e| KeyError::Derivation(format!("child derivation: {e}")))
    }
}

impl AccountProvider for HdWallet {
    fn account(&self, index: u32) -> KeyResult<Account> {
        let child = self.derive_account_key(index)?;
        let keys = Secp256k1Keys::from_secret(&child.private_key);
        Ok(Account::new(index, keys.into()))
    }
}

impl std::fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdWallet")
            .field("fingerprint", &self.master.fingerprint(&Secp256k1::signing_only()))
            .finish()
    }
}
