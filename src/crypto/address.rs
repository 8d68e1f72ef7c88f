//! Implicit and originated account addresses.

use std::fmt;
use std::str::FromStr;

use crate::crypto::{base58, prefix, CodecError};

/// Address families recognised from their leading characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Ed25519 implicit account.
    Tz1,
    /// Secp256k1 implicit account.
    Tz2,
    /// P-256 implicit account.
    Tz3,
    /// Originated contract.
    KT1,
}

impl AddressKind {
    /// Pick the kind from the human-readable prefix of `address`.
    pub fn detect(address: &str) -> Option<Self> {
        if address.starts_with("tz1") {
            Some(AddressKind::Tz1)
        } else if address.starts_with("tz2") {
            Some(AddressKind::Tz2)
        } else if address.starts_with("tz3") {
            Some(AddressKind::Tz3)
        } else if address.starts_with("KT1") {
            Some(AddressKind::KT1)
        } else {
            None
        }
    }

    /// Version bytes used when encoding this kind.
    pub fn prefix(self) -> &'static [u8] {
        match self {
            AddressKind::Tz1 => prefix::TZ1,
            AddressKind::Tz2 => prefix::TZ2,
            AddressKind::Tz3 => prefix::TZ3,
            AddressKind::KT1 => prefix::KT1,
        }
    }
}

/// Check that `address` is a well-formed address of a supported kind.
///
/// Decode failures are folded into `false`; nothing propagates.
pub fn check_address(address: &str) -> bool {
    match AddressKind::detect(address) {
        Some(kind) => base58::decode(address, kind.prefix()).is_ok_and(|hash| hash.len() == 20),
        None => false,
    }
}

/// A validated Base58Check address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    encoded: String,
    kind: AddressKind,
}

impl Address {
    /// Encode a 20-byte hash under the given kind.
    pub fn from_hash(hash: &[u8; 20], kind: AddressKind) -> Self {
        Self {
            encoded: base58::encode(hash, kind.prefix()),
            kind,
        }
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The raw 20-byte hash behind the address.
    pub fn hash(&self) -> Result<Vec<u8>, CodecError> {
        base58::decode(&self.encoded, self.kind.prefix())
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = AddressKind::detect(s).ok_or_else(|| CodecError::PrefixMismatch {
            expected: "tz1|tz2|tz3|KT1".to_string(),
            actual: s.chars().take(3).collect(),
        })?;
        let hash = base58::decode(s, kind.prefix())?;
        if hash.len() != 20 {
            return Err(CodecError::TooShort(hash.len()));
        }
        Ok(Self {
            encoded: s.to_string(),
            kind,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_address_accepts_every_kind() {
        for kind in [AddressKind::Tz1, AddressKind::Tz2, AddressKind::Tz3, AddressKind::KT1] {
            let address = Address::from_hash(&[3u8; 20], kind);
            assert!(check_address(address.as_str()), "{address} should be valid");
            assert_eq!(AddressKind::detect(address.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_check_address_rejects_garbage() {
        assert!(!check_address(""));
        assert!(!check_address("tz1"));
        assert!(!check_address("tz1notbase58OOOO"));
        assert!(!check_address("xx1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"));
        // Valid base58check, but a public key rather than an address.
        let edpk = base58::encode(&[1u8; 32], prefix::EDPK);
        assert!(!check_address(&edpk));
    }

    #[test]
    fn test_parse_and_display() {
        let address = Address::from_hash(&[5u8; 20], AddressKind::Tz2);
        let parsed: Address = address.as_str().parse().unwrap();
        assert_eq!(parsed, address);
        assert_eq!(parsed.to_string(), address.as_str());
        assert_eq!(parsed.hash().unwrap(), vec![5u8; 20]);
    }

    #[test]
    fn test_parse_wrong_family_fails() {
        let tz1 = Address::from_hash(&[5u8; 20], AddressKind::Tz1).to_string();
        let spoofed = format!("tz2{}", &tz1[3..]);
        assert!(spoofed.parse::<Address>().is_err());
    }
}
