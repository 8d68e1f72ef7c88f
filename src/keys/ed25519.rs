//! Ed25519 keys (`tz1` accounts).

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use crate::crypto::hash::public_key_hash;
use crate::crypto::{base58, generic_hash, prefix, Address, Watermark};
use crate::keys::{
    seal_encoded, signing_digest, unseal_string, KeyError, KeyResult, Scheme, SealedSecret,
    SignedEnvelope, SigningCapability,
};

/// Ed25519 key pair with sealed encodings.
#[derive(Debug)]
pub struct Ed25519Keys {
    /// `edpk...`
    public_key: SealedSecret,
    /// `edsk...` (64-byte form: seed ‖ public key)
    secret_key: SealedSecret,
    address: String,
}

impl Ed25519Keys {
    /// Build the key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let pk = signing_key.verifying_key().to_bytes();

        let mut sk = Zeroizing::new([0u8; 64]);
        sk[..32].copy_from_slice(seed);
        sk[32..].copy_from_slice(&pk);

        let address = Address::from_hash(&public_key_hash(&pk), Scheme::Ed25519.address_kind());

        Self {
            public_key: seal_encoded(Zeroizing::new(base58::encode(&pk, prefix::EDPK))),
            secret_key: seal_encoded(Zeroizing::new(base58::encode(&sk[..], prefix::EDSK))),
            address: address.to_string(),
        }
    }

    /// Import an encoded secret key, either the 64-byte `edsk` form or the
    /// 32-byte seed form.
    pub fn from_encoded_secret(encoded: &str) -> KeyResult<Self> {
        let raw = match base58::decode(encoded, prefix::EDSK) {
            Ok(raw) => Zeroizing::new(raw),
            Err(_) => Zeroizing::new(base58::decode(encoded, prefix::EDSK_SEED)?),
        };
        if raw.len() != 64 && raw.len() != 32 {
            return Err(KeyError::InvalidKey(format!(
                "ed25519 secret must be 32 or 64 bytes, got {}",
                raw.len()
            )));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&raw[..32]);
        Ok(Self::from_seed(&seed))
    }

    fn signing_key(&self) -> KeyResult<SigningKey> {
        self.secret_key.with_plaintext(|encoded| {
            let encoded = std::str::from_utf8(encoded)
                .map_err(|_| KeyError::InvalidKey("sealed secret is not text".to_string()))?;
            let raw = Zeroizing::new(base58::decode(encoded, prefix::EDSK)?);
            let mut seed = Zeroizing::new([0u8; 32]);
            seed.copy_from_slice(&raw[..32]);
            Ok(SigningKey::from_bytes(&seed))
        })
    }
}

impl SigningCapability for Ed25519Keys {
    fn scheme(&self) -> Scheme {
        Scheme::Ed25519
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn decrypted_public_key(&self) -> Zeroizing<String> {
        unseal_string(&self.public_key)
    }

    fn sign(&self, payload: &[u8], watermark: Option<Watermark>) -> KeyResult<SignedEnvelope> {
        let (bytes, digest) = signing_digest(payload, watermark);
        // SigningKey wipes itself on drop, at the end of this statement.
        let signature = self.signing_key()?.sign(&digest);
        Ok(SignedEnvelope::new(
            Scheme::Ed25519,
            payload,
            bytes,
            watermark,
            signature.to_bytes().to_vec(),
        ))
    }

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &str) -> bool {
        verify(payload, signature, public_key)
    }
}

/// Verify an Ed25519 signature over Blake2b-256(`payload`).
pub fn verify(payload: &[u8], signature: &[u8], public_key: &str) -> bool {
    let Ok(pk) = base58::decode(public_key, prefix::EDPK) else {
        return false;
    };
    let Ok(pk) = <[u8; 32]>::try_from(pk.as_slice()) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&pk) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(&generic_hash(payload), &signature).is_ok()
}
