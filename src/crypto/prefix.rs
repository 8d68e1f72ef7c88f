//! Base58Check version bytes.
//!
//! Each constant is prepended to the raw payload before checksumming so the
//! encoded string starts with a fixed, human-readable marker.

/// Ed25519 public key hash (`tz1`).
pub const TZ1: &[u8] = &[6, 161, 159];
/// Secp256k1 public key hash (`tz2`).
pub const TZ2: &[u8] = &[6, 161, 161];
/// P-256 public key hash (`tz3`).
pub const TZ3: &[u8] = &[6, 161, 164];
/// Originated contract (`KT1`).
pub const KT1: &[u8] = &[2, 90, 121];

/// Ed25519 public key (`edpk`).
pub const EDPK: &[u8] = &[13, 15, 37, 217];
/// Ed25519 64-byte secret key (`edsk`).
pub const EDSK: &[u8] = &[43, 246, 78, 7];
/// Ed25519 32-byte seed (`edsk`, short form).
pub const EDSK_SEED: &[u8] = &[13, 15, 58, 7];
/// Ed25519 signature (`edsig`).
pub const EDSIG: &[u8] = &[9, 245, 205, 134, 18];

/// Secp256k1 compressed public key (`sppk`).
pub const SPPK: &[u8] = &[3, 254, 226, 86];
/// Secp256k1 secret key (`spsk`).
pub const SPSK: &[u8] = &[17, 162, 224, 201];
/// Secp256k1 signature (`spsig1`).
pub const SPSIG1: &[u8] = &[13, 115, 101, 19, 63];

/// P-256 public key (`p2pk`).
pub const P2PK: &[u8] = &[3, 178, 139, 127];
/// P-256 secret key (`p2sk`).
pub const P2SK: &[u8] = &[16, 81, 238, 189];
/// P-256 signature (`p2sig`).
pub const P2SIG: &[u8] = &[54, 240, 44, 52];

/// Scheme-less signature (`sig`).
pub const SIG: &[u8] = &[4, 130, 43];

/// Block hash (`B`).
pub const BLOCK: &[u8] = &[1, 52];
/// Operation hash (`o`).
pub const OPERATION: &[u8] = &[5, 116];
/// Protocol hash (`P`).
pub const PROTOCOL: &[u8] = &[2, 170];
/// Chain id (`Net`).
pub const CHAIN_ID: &[u8] = &[87, 82, 0];
