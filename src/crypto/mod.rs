//! Encodings and hashes shared by key material and the RPC layer.
//!
//! # Data Flow
//! ```text
//! raw key / hash bytes
//!     → prefix.rs (version bytes per kind: tz1, edpk, spsig1, ...)
//!     → base58.rs (prefix ‖ payload ‖ checksum → Base58)
//!     → address.rs (human-readable address validation)
//! ```

pub mod address;
pub mod base58;
pub mod hash;
pub mod prefix;

use thiserror::Error;

pub use address::{check_address, Address, AddressKind};
pub use hash::{generic_hash, Watermark};

/// Errors raised while decoding Base58Check strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input contains characters outside the Base58 alphabet.
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// Decoded data cannot hold a prefix and a checksum.
    #[error("encoded data too short ({0} bytes)")]
    TooShort(usize),

    /// Trailing 4 bytes do not match the double SHA-256 of the body.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// Version bytes differ from the expected prefix.
    #[error("prefix mismatch: expected {expected}, got {actual}")]
    PrefixMismatch { expected: String, actual: String },
}
