//! Blake2b digests and signing watermarks.

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;

/// 256-bit generic hash, the digest that gets signed.
pub fn generic_hash(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// 160-bit hash of a public key, the payload of an implicit address.
pub fn public_key_hash(public_key: &[u8]) -> [u8; 20] {
    Blake2b160::digest(public_key).into()
}

/// Domain-separation byte prepended to a payload before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Watermark {
    Block,
    Endorsement,
    /// Manager operations (reveal, transaction, ...).
    Generic,
}

impl Watermark {
    pub fn as_byte(self) -> u8 {
        match self {
            Watermark::Block => 0x01,
            Watermark::Endorsement => 0x02,
            Watermark::Generic => 0x03,
        }
    }

    /// `watermark ‖ payload`, or a copy of `payload` when no watermark applies.
    pub fn apply(watermark: Option<Watermark>, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 1);
        if let Some(w) = watermark {
            out.push(w.as_byte());
        }
        out.extend_from_slice(payload);
        out
    }
}
