//! Secp256k1 keys (`tz2` accounts).
//!
//! Signatures are ECDSA over the Blake2b-256 digest, RFC 6979 nonces,
//! low-S normalized, serialized as compact `r ‖ s` (32 bytes each,
//! left-zero-padded).

use bitcoin::secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroizing;

use crate::crypto::hash::public_key_hash;
use crate::crypto::{base58, generic_hash, prefix, Address, Watermark};
use crate::keys::{
    seal_encoded, signing_digest, unseal_string, KeyError, KeyResult, Scheme, SealedSecret,
    SignedEnvelope, SigningCapability,
};

/// Secp256k1 key pair with sealed encodings.
#[derive(Debug)]
pub struct Secp256k1Keys {
    /// `sppk...` (33-byte compressed point)
    public_key: SealedSecret,
    /// `spsk...`
    secret_key: SealedSecret,
    address: String,
}

impl Secp256k1Keys {
    /// Build the key pair from a secret scalar.
    pub fn from_secret(secret: &SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let pk = PublicKey::from_secret_key(&secp, secret).serialize();
        let sk = Zeroizing::new(secret.secret_bytes());

        let address = Address::from_hash(&public_key_hash(&pk), Scheme::Secp256k1.address_kind());

        Self {
            public_key: seal_encoded(Zeroizing::new(base58::encode(&pk, prefix::SPPK))),
            secret_key: seal_encoded(Zeroizing::new(base58::encode(&sk[..], prefix::SPSK))),
            address: address.to_string(),
        }
    }

    /// Build the key pair from 32 raw secret bytes.
    pub fn from_secret_bytes(secret: &[u8]) -> KeyResult<Self> {
        let mut secret = SecretKey::from_slice(secret)
            .map_err(|e| KeyError::InvalidKey(format!("secp256k1 secret: {e}")))?;
        let keys = Self::from_secret(&secret);
        secret.non_secure_erase();
        Ok(keys)
    }

    /// Import an encoded `spsk` secret key.
    pub fn from_encoded_secret(encoded: &str) -> KeyResult<Self> {
        let raw = Zeroizing::new(base58::decode(encoded, prefix::SPSK)?);
        Self::from_secret_bytes(&raw)
    }
}

impl SigningCapability for Secp256k1Keys {
    fn scheme(&self) -> Scheme {
        Scheme::Secp256k1
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn decrypted_public_key(&self) -> Zeroizing<String> {
        unseal_string(&self.public_key)
    }

    fn sign(&self, payload: &[u8], watermark: Option<Watermark>) -> KeyResult<SignedEnvelope> {
        let (bytes, digest) = signing_digest(payload, watermark);
        let message = Message::from_digest(digest);

        let signature = self.secret_key.with_plaintext(|encoded| {
            let encoded = std::str::from_utf8(encoded)
                .map_err(|_| KeyError::InvalidKey("sealed secret is not text".to_string()))?;
            let raw = Zeroizing::new(base58::decode(encoded, prefix::SPSK)?);
            let mut secret = SecretKey::from_slice(&raw)
                .map_err(|e| KeyError::InvalidKey(format!("secp256k1 secret: {e}")))?;
            let signature = Secp256k1::signing_only().sign_ecdsa(&message, &secret);
            secret.non_secure_erase();
            Ok::<_, KeyError>(signature)
        })?;

        Ok(SignedEnvelope::new(
            Scheme::Secp256k1,
            payload,
            bytes,
            watermark,
            signature.serialize_compact().to_vec(),
        ))
    }

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &str) -> bool {
        verify(payload, signature, public_key)
    }
}

/// Verify a compact secp256k1 signature over Blake2b-256(`payload`).
pub fn verify(payload: &[u8], signature: &[u8], public_key: &str) -> bool {
    let Ok(pk) = base58::decode(public_key, prefix::SPPK) else {
        return false;
    };
    let Ok(pk) = PublicKey::from_slice(&pk) else {
        return false;
    };
    let Ok(signature) = ecdsa::Signature::from_compact(signature) else {
        return false;
    };
    let message = Message::from_digest(generic_hash(payload));
    Secp256k1::verification_only()
        .verify_ecdsa(&message, &signature, &pk)
        .is_ok()
}
