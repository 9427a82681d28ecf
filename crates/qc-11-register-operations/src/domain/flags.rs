//! # Execution Flags
//!
//! One execution path serves three roles; the flag set selects which.
//!
//! | Role | Bits | Pre-state from | Checksum | Commits |
//! |------|------|----------------|----------|---------|
//! | Builder | PRESTATE \| POSTSTATE | store, embedded in stream | embedded | no |
//! | Validator | WRITE | stream | verified | yes |
//! | Mempool | MEMPOOL | stream | verified | never |
//!
//! Any other combination is rejected when the [`Flags`] value is built, so
//! the controller never sees a half-specified role.

use crate::errors::FlagError;
use bitflags::bitflags;

bitflags! {
    /// Raw flag bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlagBits: u8 {
        /// Embed the freshly read pre-state into the stream.
        const PRESTATE = 0x01;
        /// Embed the post-state checksum into the stream.
        const POSTSTATE = 0x02;
        /// Verify against the stream and commit to the store.
        const WRITE = 0x04;
        /// Verify against the stream, never commit.
        const MEMPOOL = 0x08;
    }
}

/// Which of the three uses of the controller an execution serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Builder,
    Validator,
    Mempool,
}

/// A validated flag set. Only role combinations are constructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(FlagBits);

impl Flags {
    /// Builder role: author the stream.
    pub const BUILD: Self = Self(FlagBits::PRESTATE.union(FlagBits::POSTSTATE));
    /// Validator role: verify and commit.
    pub const WRITE: Self = Self(FlagBits::WRITE);
    /// Speculative admission: verify only.
    pub const MEMPOOL: Self = Self(FlagBits::MEMPOOL);

    /// Validate a bit combination.
    pub fn new(bits: FlagBits) -> Result<Self, FlagError> {
        [Self::BUILD, Self::WRITE, Self::MEMPOOL]
            .into_iter()
            .find(|flags| flags.0 == bits)
            .ok_or(FlagError::UnsupportedCombination(bits.bits()))
    }

    /// Validate a raw byte.
    pub fn from_byte(byte: u8) -> Result<Self, FlagError> {
        let bits = FlagBits::from_bits(byte).ok_or(FlagError::UnknownBits(byte))?;
        Self::new(bits)
    }

    pub fn bits(self) -> FlagBits {
        self.0
    }

    pub fn role(self) -> Role {
        if self.0.contains(FlagBits::WRITE) {
            Role::Validator
        } else if self.0.contains(FlagBits::MEMPOOL) {
            Role::Mempool
        } else {
            Role::Builder
        }
    }

    /// PRESTATE: read the store and embed the pre-state.
    pub fn embeds_prestate(self) -> bool {
        self.0.contains(FlagBits::PRESTATE)
    }

    /// POSTSTATE: embed the post-state checksum.
    pub fn embeds_poststate(self) -> bool {
        self.0.contains(FlagBits::POSTSTATE)
    }

    /// WRITE or MEMPOOL: consume and check the stream.
    pub fn verifies(self) -> bool {
        self.0.intersects(FlagBits::WRITE | FlagBits::MEMPOOL)
    }

    /// WRITE: commit the post-state.
    pub fn commits(self) -> bool {
        self.0.contains(FlagBits::WRITE)
    }
}

impl TryFrom<FlagBits> for Flags {
    type Error = FlagError;

    fn try_from(bits: FlagBits) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}
