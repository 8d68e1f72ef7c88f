//! Masked in-memory storage for key material.
//!
//! Secrets are kept XOR-masked with a per-instance random pad. Reading one
//! unmasks it into a `Zeroizing` buffer that lives only for the duration of
//! the caller's closure, so every exit path (return, `?`, panic unwind)
//! wipes the plaintext.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// A secret byte string that is never held in the clear between uses.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SealedSecret {
    masked: Vec<u8>,
    pad: Vec<u8>,
}

impl SealedSecret {
    /// Seal `plaintext`. The caller remains responsible for wiping its copy.
    pub fn seal(plaintext: &[u8]) -> Self {
        let mut pad = vec![0u8; plaintext.len()];
        OsRng.fill_bytes(&mut pad);
        let masked = plaintext.iter().zip(&pad).map(|(p, k)| p ^ k).collect();
        Self { masked, pad }
    }

    /// Unmask into a transient buffer and hand it to `f`.
    pub fn with_plaintext<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let plaintext = self.unmask();
        f(&plaintext)
    }

    /// Unmask into an owned, self-wiping buffer.
    ///
    /// Do not keep the result around longer than the immediate use.
    pub fn unmask(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.masked.iter().zip(&self.pad).map(|(m, k)| m ^ k).collect())
    }

    pub fn len(&self) -> usize {
        self.masked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }
}

impl std::fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedSecret").field("len", &self.masked.len()).finish()
    }
}
