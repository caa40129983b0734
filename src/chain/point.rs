//! Outpoint checksums.
//!
//! Compact history replies do not repeat the hash of the output a spend
//! consumes. Each spend instead carries a 64-bit checksum of that output's
//! point. The checksum is a correlation key only: two distinct points can
//! share a checksum and the wire format offers no way to tell them apart.

use bitcoin::{OutPoint, hashes::Hash};

/// Number of low checksum bits taken from the output index.
pub const CHECKSUM_INDEX_BITS: u32 = 15;

const INDEX_MASK: u64 = (1 << CHECKSUM_INDEX_BITS) - 1;

/// Compute the correlation checksum of an outpoint.
///
/// The upper 49 bits come from the little-endian word at byte offset 12 of
/// the transaction hash; the lower 15 bits come from the output index.
#[must_use]
#[expect(
    clippy::little_endian_bytes,
    reason = "checksum is defined over a little-endian hash word"
)]
pub fn point_checksum(point: &OutPoint) -> u64 {
    let [_, _, _, _, _, _, _, _, _, _, _, _, b0, b1, b2, b3, b4, b5, b6, b7, ..] =
        *point.txid.as_byte_array();
    let word = u64::from_le_bytes([b0, b1, b2, b3, b4, b5, b6, b7]);
    (word & !INDEX_MASK) | (u64::from(point.vout) & INDEX_MASK)
}
