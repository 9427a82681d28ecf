//! # Shared Crypto - Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Register post-state checksums, transaction ids |
//!
//! ## Security Properties
//!
//! - **BLAKE3**: 256-bit output, deterministic, SIMD-accelerated
//! - Checksums are never truncated; the full digest travels on the wire

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hashing;

// Re-exports
pub use hashing::{blake3_hash, hash, hash_in_context, Blake3Hasher, Digest, DIGEST_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
