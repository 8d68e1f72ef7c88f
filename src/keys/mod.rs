//! Signing key material.
//!
//! # Data Flow
//! ```text
//! seed / derived secret
//!     → ed25519.rs | secp256k1.rs (build keys, encode, seal)
//!     → KeyPair (closed over both schemes)
//!     → sign(): watermark ‖ payload → Blake2b-256 → scheme signature
//! ```
//!
//! # Security Constraints
//! - Secret keys live only inside `SealedSecret`
//! - A secret is unmasked for exactly one signature, then wiped
//! - Keys are never logged or serialized

pub mod ed25519;
pub mod sealed;
pub mod secp256k1;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::{generic_hash, prefix, AddressKind, CodecError, Watermark};

pub use ed25519::Ed25519Keys;
pub use sealed::SealedSecret;
pub use secp256k1::Secp256k1Keys;

/// Errors from key construction, derivation and signing.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Required input is missing or empty.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Mnemonic, extended key or derivation path is unusable.
    #[error("Derivation error: {0}")]
    Derivation(String),

    /// Key bytes are not a valid key for the scheme.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Decode error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Supported signature schemes and their encoding prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Ed25519,
    Secp256k1,
}

impl Scheme {
    pub fn address_kind(self) -> AddressKind {
        match self {
            Scheme::Ed25519 => AddressKind::Tz1,
            Scheme::Secp256k1 => AddressKind::Tz2,
        }
    }

    pub fn public_key_prefix(self) -> &'static [u8] {
        match self {
            Scheme::Ed25519 => prefix::EDPK,
            Scheme::Secp256k1 => prefix::SPPK,
        }
    }

    pub fn secret_key_prefix(self) -> &'static [u8] {
        match self {
            Scheme::Ed25519 => prefix::EDSK,
            Scheme::Secp256k1 => prefix::SPSK,
        }
    }

    pub fn signature_prefix(self) -> &'static [u8] {
        match self {
            Scheme::Ed25519 => prefix::EDSIG,
            Scheme::Secp256k1 => prefix::SPSIG1,
        }
    }
}

/// Output of a single signing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// Exactly the bytes that were hashed: `watermark ‖ payload`.
    pub bytes: Vec<u8>,
    /// Hex of the payload without watermark (the forged operation group).
    pub forged_hex: String,
    pub watermark: Option<Watermark>,
    /// Raw 64-byte signature.
    pub signature: Vec<u8>,
    /// Base58Check signature under the scheme's prefix.
    pub encoded_signature: String,
    /// `forged_hex ‖ hex(signature)`, ready for injection.
    pub signed_bytes: String,
}

impl SignedEnvelope {
    fn new(scheme: Scheme, payload: &[u8], bytes: Vec<u8>, watermark: Option<Watermark>, signature: Vec<u8>) -> Self {
        let forged_hex = hex::encode(payload);
        let signed_bytes = format!("{}{}", forged_hex, hex::encode(&signature));
        Self {
            encoded_signature: crate::crypto::base58::encode(&signature, scheme.signature_prefix()),
            bytes,
            forged_hex,
            watermark,
            signature,
            signed_bytes,
        }
    }
}

/// `(watermarked bytes, digest to sign)`.
fn signing_digest(payload: &[u8], watermark: Option<Watermark>) -> (Vec<u8>, [u8; 32]) {
    let bytes = Watermark::apply(watermark, payload);
    let digest = generic_hash(&bytes);
    (bytes, digest)
}

/// What any signing key can do, independent of scheme.
pub trait SigningCapability: Send + Sync {
    fn scheme(&self) -> Scheme;

    /// Public key hash address, computed at construction.
    fn address(&self) -> &str;

    /// Base58Check public key in a self-wiping buffer. Do not retain.
    fn decrypted_public_key(&self) -> Zeroizing<String>;

    /// Sign `payload`, optionally prefixed by `watermark`.
    fn sign(&self, payload: &[u8], watermark: Option<Watermark>) -> KeyResult<SignedEnvelope>;

    /// Check `signature` over Blake2b-256(`payload`) against an encoded public key.
    ///
    /// Returns `false` on any decode or verification failure.
    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &str) -> bool;

    /// Sign a hex-encoded payload such as a forged operation group.
    fn sign_hex(&self, payload_hex: &str, watermark: Option<Watermark>) -> KeyResult<SignedEnvelope> {
        let payload = hex::decode(payload_hex)
            .map_err(|e| KeyError::InvalidKey(format!("payload is not hex: {e}")))?;
        self.sign(&payload, watermark)
    }
}

/// A key pair of either supported scheme.
#[derive(Debug)]
pub enum KeyPair {
    Ed25519(Ed25519Keys),
    Secp256k1(Secp256k1Keys),
}

impl SigningCapability for KeyPair {
    fn scheme(&self) -> Scheme {
        match self {
            KeyPair::Ed25519(k) => k.scheme(),
            KeyPair::Secp256k1(k) => k.scheme(),
        }
    }

    fn address(&self) -> &str {
        match self {
            KeyPair::Ed25519(k) => k.address(),
            KeyPair::Secp256k1(k) => k.address(),
        }
    }

    fn decrypted_public_key(&self) -> Zeroizing<String> {
        match self {
            KeyPair::Ed25519(k) => k.decrypted_public_key(),
            KeyPair::Secp256k1(k) => k.decrypted_public_key(),
        }
    }

    fn sign(&self, payload: &[u8], watermark: Option<Watermark>) -> KeyResult<SignedEnvelope> {
        match self {
            KeyPair::Ed25519(k) => k.sign(payload, watermark),
            KeyPair::Secp256k1(k) => k.sign(payload, watermark),
        }
    }

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &str) -> bool {
        match self {
            KeyPair::Ed25519(k) => k.verify(payload, signature, public_key),
            KeyPair::Secp256k1(k) => k.verify(payload, signature, public_key),
        }
    }
}

impl From<Ed25519Keys> for KeyPair {
    fn from(keys: Ed25519Keys) -> Self {
        KeyPair::Ed25519(keys)
    }
}

impl From<Secp256k1Keys> for KeyPair {
    fn from(keys: Secp256k1Keys) -> Self {
        KeyPair::Secp256k1(keys)
    }
}

/// Seal an encoded key string. Shared by both schemes.
fn seal_encoded(encoded: Zeroizing<String>) -> SealedSecret {
    SealedSecret::seal(encoded.as_bytes())
}

fn unseal_string(sealed: &SealedSecret) -> Zeroizing<String> {
    let bytes = sealed.unmask();
    Zeroizing::new(String::from_utf8_lossy(&bytes).into_owned())
}
