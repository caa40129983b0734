//! Stealth rows and their expansion.
//!
//! `blockchain.fetch_stealth` replies omit the sign byte of each ephemeral
//! public key because it is fixed by convention, and send the public-key hash
//! byte-reversed. [`expand`] restores both.

use bitcoin::Txid;
use serde::Serialize;

use crate::{
    chain::{ShortHash, hex_array, reversed},
    error::DecodeError,
    wire::{HASH_SIZE, PayloadReader, PayloadWriter},
};

/// Sign byte of every stealth ephemeral public key.
pub const EPHEMERAL_KEY_SIGN: u8 = 0x02;

/// Size of a compressed ephemeral public key.
pub const EPHEMERAL_KEY_SIZE: usize = HASH_SIZE + 1;

/// A stealth row as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactStealthRow {
    /// Ephemeral public key without its sign byte.
    #[serde(serialize_with = "hex_array::serialize")]
    pub ephemeral_key_hash: [u8; HASH_SIZE],
    /// Public-key hash in wire (reversed) order.
    #[serde(serialize_with = "hex_array::serialize")]
    pub public_key_hash: ShortHash,
    /// Transaction carrying the stealth payment.
    pub transaction_hash: Txid,
}

/// A stealth row with its key material restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StealthRow {
    /// Compressed ephemeral public key.
    #[serde(serialize_with = "hex_array::serialize")]
    pub ephemeral_public_key: [u8; EPHEMERAL_KEY_SIZE],
    /// Public-key hash in canonical order.
    #[serde(serialize_with = "hex_array::serialize")]
    pub public_key_hash: ShortHash,
    /// Transaction carrying the stealth payment.
    pub transaction_hash: Txid,
}

impl CompactStealthRow {
    /// Read `[ephemeral_key_hash:32][public_key_hash:20][tx_hash:32]`.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the row is cut short.
    pub fn read(reader: &mut PayloadReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ephemeral_key_hash: reader.read_hash()?,
            public_key_hash: reader.read_short_hash()?,
            transaction_hash: reader.read_txid()?,
        })
    }

    /// Append the row in wire layout.
    pub fn write(&self, writer: &mut PayloadWriter) {
        writer.write_bytes(&self.ephemeral_key_hash);
        writer.write_bytes(&self.public_key_hash);
        writer.write_consensus(&self.transaction_hash);
    }

    /// Restore the sign byte and the canonical public-key hash order.
    #[must_use]
    pub fn expand(&self) -> StealthRow {
        let mut ephemeral_public_key = [EPHEMERAL_KEY_SIGN; EPHEMERAL_KEY_SIZE];
        if let Some((_, key)) = ephemeral_public_key.split_first_mut() {
            key.copy_from_slice(&self.ephemeral_key_hash);
        }
        StealthRow {
            ephemeral_public_key,
            public_key_hash: reversed(&self.public_key_hash),
            transaction_hash: self.transaction_hash,
        }
    }
}

/// Expand every compact row, preserving order.
#[must_use]
pub fn expand(compact: &[CompactStealthRow]) -> Vec<StealthRow> {
    compact.iter().map(CompactStealthRow::expand).collect()
}

/// Decode a `blockchain.fetch_stealth` reply.
///
/// # Errors
/// Fails on the first truncated row; no partial list is returned.
pub fn decode_stealth(payload: &[u8]) -> Result<Vec<StealthRow>, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let mut compact = Vec::new();
    while !reader.is_exhausted() {
        compact.push(CompactStealthRow::read(&mut reader)?);
    }
    Ok(expand(&compact))
}
