//! # Operation Stream Codec
//!
//! The register stream a transaction carries: for each operation, in
//! order, an optional PRESTATE segment and a POSTSTATE segment.
//!
//! ```text
//! ┌──────┬────────────────────────────┬──────┬──────────────────┐
//! │ 0x01 │ canonical RegisterState    │ 0x02 │ 32-byte checksum │  ... next operation
//! └──────┴────────────────────────────┴──────┴──────────────────┘
//! ```
//!
//! The builder appends; validators consume with a read cursor. The cursor is
//! not part of the wire form.

use crate::errors::StreamError;
use qc_04_state_management::{codec, RegisterState};
use serde::{Deserialize, Serialize};
use shared_crypto::{Digest, DIGEST_LEN};

/// Segment marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Marker {
    Prestate = 0x01,
    Poststate = 0x02,
}

impl TryFrom<u8> for Marker {
    type Error = StreamError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Marker::Prestate),
            0x02 => Ok(Marker::Poststate),
            other => Err(StreamError::UnknownMarker(other)),
        }
    }
}

/// Ordered `[marker, payload]` segments with a read cursor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationStream {
    bytes: Vec<u8>,
    #[serde(skip)]
    cursor: usize,
}

impl OperationStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap received wire bytes, cursor at the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read cursor offset.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Move the read cursor back to the start.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
    }

    // === Writing ===

    pub fn push_prestate(&mut self, state: &RegisterState) -> Result<(), StreamError> {
        let encoded = state
            .encode()
            .map_err(|e| StreamError::MalformedState(e.to_string()))?;
        self.bytes.push(Marker::Prestate as u8);
        self.bytes.extend_from_slice(&encoded);
        Ok(())
    }

    pub fn push_poststate_checksum(&mut self, checksum: &Digest) {
        self.bytes.push(Marker::Poststate as u8);
        self.bytes.extend_from_slice(checksum.as_bytes());
    }

    // === Reading ===

    pub fn pop_marker(&mut self) -> Result<Marker, StreamError> {
        Marker::try_from(self.pop_byte()?)
    }

    /// Consume a marker byte that must equal `expected`.
    pub fn expect_marker(&mut self, expected: Marker) -> Result<(), StreamError> {
        let found = self.pop_byte()?;
        if found == expected as u8 {
            return Ok(());
        }
        Err(match expected {
            Marker::Prestate => StreamError::ExpectedPrestate { found },
            Marker::Poststate => StreamError::ExpectedPoststate { found },
        })
    }

    pub fn pop_state(&mut self) -> Result<RegisterState, StreamError> {
        let unread = &self.bytes[self.cursor..];
        if unread.is_empty() {
            return Err(StreamError::UnexpectedEnd {
                needed: 1,
                remaining: 0,
            });
        }
        let (state, consumed) = codec::decode_prefix::<RegisterState>(unread)
            .map_err(|e| StreamError::MalformedState(e.to_string()))?;
        self.cursor += consumed;
        Ok(state)
    }

    pub fn pop_checksum(&mut self) -> Result<Digest, StreamError> {
        let bytes = self.take(DIGEST_LEN)?;
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(bytes);
        Ok(Digest(digest))
    }

    /// Fail if any bytes remain unread.
    pub fn ensure_exhausted(&self) -> Result<(), StreamError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(StreamError::TrailingBytes { remaining }),
        }
    }

    fn pop_byte(&mut self) -> Result<u8, StreamError> {
        Ok(self.take(1)?[0])
    }

    fn take(&mut self, needed: usize) -> Result<&[u8], StreamError> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(StreamError::UnexpectedEnd { needed, remaining });
        }
        let start = self.cursor;
        self.cursor += needed;
        Ok(&self.bytes[start..self.cursor])
    }
}

/// Streams compare by wire bytes; the read cursor is local state.
impl PartialEq for OperationStream {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for OperationStream {}
