//! Chain-level values carried in Obelisk requests and replies.
//!
//! Transactions, headers, outpoints and hashes come straight from the
//! `bitcoin` crate. This module adds the few values that are specific to the
//! Obelisk protocol: payment addresses with their legacy wire byte order,
//! bit-level subscription prefixes and the outpoint checksum used to
//! correlate spends with outputs.

mod address;
mod point;
mod prefix;

pub use address::{AddressError, PaymentAddress};
pub use point::{CHECKSUM_INDEX_BITS, point_checksum};
pub use prefix::{BinaryPrefix, SubscribeType};

use crate::wire::SHORT_HASH_SIZE;

/// A 20-byte address or public-key hash.
pub type ShortHash = [u8; SHORT_HASH_SIZE];

/// Return `bytes` in reverse order.
///
/// Obelisk historically sends address and public-key hashes byte-reversed.
#[must_use]
pub fn reversed<const N: usize>(bytes: &[u8; N]) -> [u8; N] {
    let mut out = *bytes;
    out.reverse();
    out
}

/// Serialise fixed-size byte arrays as lowercase hex strings.
pub(crate) mod hex_array {
    use serde::Serializer;

    /// Serialise `val` as a hex string.
    pub(crate) fn serialize<const N: usize, S>(val: &[u8; N], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&hex::encode(val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_is_an_involution() {
        let hash: ShortHash = std::array::from_fn(|i| u8::try_from(i + 1).unwrap_or(0));
        let wire = reversed(&hash);
        assert_eq!(wire.first(), Some(&20));
        assert_eq!(wire.last(), Some(&1));
        assert_eq!(reversed(&wire), hash);
    }
}
