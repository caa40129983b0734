//! Bit-level prefixes for stealth queries and subscriptions.

use clap::ValueEnum;
use serde::Serialize;

use super::PaymentAddress;
use crate::wire::{HASH_SIZE, SHORT_HASH_SIZE};

/// Prefixes match hashes, so no more than a full hash of bits is stored.
const STORED_BITS_LIMIT: usize = HASH_SIZE * 8;

/// What an `address.subscribe` prefix is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeType {
    /// Payment address hashes.
    Address,
    /// Stealth prefixes.
    Stealth,
}

impl From<SubscribeType> for u8 {
    fn from(kind: SubscribeType) -> Self {
        match kind {
            SubscribeType::Address => 0,
            SubscribeType::Stealth => 1,
        }
    }
}

/// A prefix measured in bits, stored most significant bit first.
///
/// The backing blocks hold `ceil(bits / 8)` bytes, capped at the size of a
/// full hash, and any bits past the prefix length are zero, so two prefixes
/// of the same length compare equal when their significant bits do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryPrefix {
    bits: usize,
    blocks: Vec<u8>,
}

impl BinaryPrefix {
    /// Take the first `bits` bits of `data`, padding with zero bits if `data`
    /// is shorter.
    ///
    /// The requested length is kept as given; the one-byte limit of the wire
    /// format is enforced when the prefix is encoded into a request.
    #[must_use]
    pub fn new(bits: usize, data: &[u8]) -> Self {
        let stored = bits.min(STORED_BITS_LIMIT);
        let block_count = stored.div_ceil(8);
        let mut blocks: Vec<u8> = data
            .iter()
            .copied()
            .chain(std::iter::repeat(0))
            .take(block_count)
            .collect();
        let spare = block_count * 8 - stored;
        if let Some(last) = blocks.last_mut() {
            *last &= u8::MAX << spare;
        }
        Self { bits, blocks }
    }

    /// A prefix covering the whole canonical hash of `address`.
    #[must_use]
    pub fn from_address(address: &PaymentAddress) -> Self {
        Self::new(SHORT_HASH_SIZE * 8, address.hash())
    }

    /// Prefix length in bits.
    #[must_use]
    pub const fn bits(&self) -> usize { self.bits }

    /// Backing bytes, most significant bit first.
    #[must_use]
    pub fn blocks(&self) -> &[u8] { &self.blocks }

    /// Whether the leading bits of `data` match this prefix.
    ///
    /// Data shorter than the prefix never matches.
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len().saturating_mul(8) < self.bits {
            return false;
        }
        Self::new(self.bits, data) == *self
    }
}
