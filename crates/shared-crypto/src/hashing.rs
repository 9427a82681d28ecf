//! # BLAKE3 Hashing
//!
//! The opaque `hash(bytes) -> Digest` primitive consumed by the register
//! layer. Every node must compute the same digest for the same canonical
//! bytes, so this module exposes exactly one algorithm.
//!
//! ## Performance
//!
//! - 5-10x faster than SHA-256
//! - Exploits AVX-512/NEON via internal Merkle tree

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 32;

/// BLAKE3 hash output (256-bit).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest.
    pub const ZERO: Self = Self([0u8; DIGEST_LEN]);

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Creates a digest from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; DIGEST_LEN] = slice.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...", hex::encode(&self.0[..6]))
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    /// Create a domain-separated hasher.
    ///
    /// Digests produced under different contexts never collide with each
    /// other, so a register checksum can never be replayed as a
    /// transaction id.
    pub fn new_derive_key(context: &str) -> Self {
        Self {
            inner: Hasher::new_derive_key(context),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(&self) -> Digest {
        Digest(*self.inner.finalize().as_bytes())
    }

    /// Reset hasher for reuse.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Digest {
    Digest(*blake3::hash(data).as_bytes())
}

/// Hash under a derive-key context (domain separation).
pub fn hash_in_context(context: &str, data: &[u8]) -> Digest {
    let mut hasher = Blake3Hasher::new_derive_key(context);
    hasher.update(data);
    hasher.finalize()
}

/// The ledger's `hash(bytes) -> Digest` primitive.
pub fn hash(data: &[u8]) -> Digest {
    blake3_hash(data)
}
