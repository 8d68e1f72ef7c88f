//! Base58Check encoding with explicit version prefixes.
//!
//! The checksum is the first 4 bytes of SHA-256d(prefix ‖ payload). Decoding
//! verifies the checksum before comparing prefixes, so a corrupted string
//! reports `ChecksumMismatch` rather than a misleading prefix error.

use sha2::{Digest, Sha256};

use crate::crypto::CodecError;

const CHECKSUM_LEN: usize = 4;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Encode `payload` under `prefix` as Base58Check.
pub fn encode(payload: &[u8], prefix: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58Check string and strip `expected_prefix`.
///
/// Fails on invalid characters, a bad checksum, or a prefix other than
/// `expected_prefix`.
pub fn decode(encoded: &str, expected_prefix: &[u8]) -> Result<Vec<u8>, CodecError> {
    let data = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| CodecError::InvalidBase58(e.to_string()))?;

    if data.len() < expected_prefix.len() + CHECKSUM_LEN {
        return Err(CodecError::TooShort(data.len()));
    }

    let (body, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(body) != sum {
        return Err(CodecError::ChecksumMismatch);
    }

    let (prefix, payload) = body.split_at(expected_prefix.len());
    if prefix != expected_prefix {
        return Err(CodecError::PrefixMismatch {
            expected: hex::encode(expected_prefix),
            actual: hex::encode(prefix),
        });
    }

    Ok(payload.to_vec())
}
