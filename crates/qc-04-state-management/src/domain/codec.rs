//! # Canonical Codec
//!
//! One encoding per value. Register states, typed register objects and
//! transactions are all encoded here so that checksums computed by
//! independent nodes agree byte-for-byte.
//!
//! ## Layout
//!
//! - Integers: fixed width, little-endian
//! - Byte vectors: `u64` length prefix, then the bytes
//! - Fixed arrays (addresses, digests): raw bytes, no prefix
//! - Whole-buffer decoding rejects trailing bytes

use super::StateError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Upper bound on any single encoded value.
pub const MAX_ENCODED_SIZE: u64 = 1 << 20;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_ENCODED_SIZE)
}

/// Encode a value canonically.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StateError> {
    Ok(options().serialize(value)?)
}

/// Decode a value that must occupy the whole buffer.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StateError> {
    Ok(options().deserialize(bytes)?)
}

/// Decode a value from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_prefix<T: DeserializeOwned>(bytes: &[u8]) -> Result<(T, usize), StateError> {
    let mut reader = bytes;
    let value = options().deserialize_from(&mut reader)?;
    Ok((value, bytes.len() - reader.len()))
}
