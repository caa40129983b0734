//! Server push notifications for active subscriptions.
//!
//! After `address.subscribe` the server pushes `address.update` for every
//! block touching a matching address and `address.stealth_update` for every
//! block carrying a matching stealth output. Subscriptions lapse unless
//! renewed with `address.renew`.

use bitcoin::BlockHash;
use serde::Serialize;

use crate::{
    chain::{BinaryPrefix, PaymentAddress},
    error::DecodeError,
    wire::PayloadReader,
};

/// Size of the stealth prefix carried by `address.stealth_update`.
pub const STEALTH_PREFIX_SIZE: usize = 4;

/// A block touched a subscribed payment address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressUpdate {
    /// The address, hash in canonical order.
    pub address: PaymentAddress,
    /// Height of the block.
    pub height: u32,
    /// Hash of the block.
    pub block_hash: BlockHash,
}

/// A block carried a stealth output under a subscribed prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StealthUpdate {
    /// Leading bytes of the stealth prefix.
    #[serde(serialize_with = "crate::chain::hex_array::serialize")]
    pub prefix: [u8; STEALTH_PREFIX_SIZE],
    /// Height of the block.
    pub height: u32,
    /// Hash of the block.
    pub block_hash: BlockHash,
}

impl StealthUpdate {
    /// Whether this update falls under `subscription`.
    ///
    /// Only the first 32 bits are sent, so longer subscriptions never match.
    #[must_use]
    pub fn matches(&self, subscription: &BinaryPrefix) -> bool { subscription.matches(&self.prefix) }
}

/// A decoded server push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// `address.update`
    Address(AddressUpdate),
    /// `address.stealth_update`
    Stealth(StealthUpdate),
}

/// Decode `[version:1][hash:20][height:4][block_hash:32]`.
///
/// The hash arrives byte-reversed and is returned in canonical order.
///
/// # Errors
/// Returns [`DecodeError::Truncated`] or [`DecodeError::TrailingBytes`] if
/// the payload is not exactly 57 bytes.
pub fn decode_address_update(payload: &[u8]) -> Result<AddressUpdate, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let version = reader.read_u8()?;
    let wire_hash = reader.read_short_hash()?;
    let height = reader.read_u32_le()?;
    let block_hash = reader.read_block_hash()?;
    reader.finish()?;
    Ok(AddressUpdate {
        address: PaymentAddress::from_wire(version, &wire_hash),
        height,
        block_hash,
    })
}

/// Decode `[prefix:4][height:4][block_hash:32]`.
///
/// # Errors
/// Returns [`DecodeError::Truncated`] or [`DecodeError::TrailingBytes`] if
/// the payload is not exactly 40 bytes.
pub fn decode_stealth_update(payload: &[u8]) -> Result<StealthUpdate, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let prefix = reader.read_array()?;
    let height = reader.read_u32_le()?;
    let block_hash = reader.read_block_hash()?;
    reader.finish()?;
    Ok(StealthUpdate {
        prefix,
        height,
        block_hash,
    })
}

#[cfg(test)]
mod tests {
    use bitcoin::hashes::Hash;
    use rstest::rstest;

    use super::*;
    use crate::test_helpers::sample_address;

    fn address_payload() -> Vec<u8> {
        let mut payload = vec![0u8];
        payload.extend((1..=20u8).rev());
        payload.extend_from_slice(&[0x10, 0x27, 0, 0]);
        payload.extend_from_slice(&[0x5a; 32]);
        payload
    }

    fn stealth_payload() -> Vec<u8> {
        let mut payload = vec![0xde, 0xad, 0xbe, 0xef];
        payload.extend_from_slice(&[1, 0, 0, 0]);
        payload.extend_from_slice(&[0x5a; 32]);
        payload
    }

    #[test]
    fn address_update_restores_canonical_hash() {
        let update = decode_address_update(&address_payload()).expect("valid update");
        assert_eq!(update.address, sample_address());
        assert_eq!(update.height, 10_000);
        assert_eq!(update.block_hash, BlockHash::from_byte_array([0x5a; 32]));
    }

    #[test]
    fn stealth_update_keeps_prefix_bytes() {
        let update = decode_stealth_update(&stealth_payload()).expect("valid update");
        assert_eq!(update.prefix, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(update.height, 1);
    }

    #[rstest]
    #[case(BinaryPrefix::new(0, &[]), true)]
    #[case(BinaryPrefix::new(12, &[0xde, 0xa0]), true)]
    #[case(BinaryPrefix::new(32, &[0xde, 0xad, 0xbe, 0xef]), true)]
    #[case(BinaryPrefix::new(16, &[0xde, 0xae]), false)]
    #[case(BinaryPrefix::new(40, &[0xde, 0xad, 0xbe, 0xef, 0]), false)]
    fn stealth_update_matching(#[case] subscription: BinaryPrefix, #[case] expected: bool) {
        let update = decode_stealth_update(&stealth_payload()).expect("valid update");
        assert_eq!(update.matches(&subscription), expected);
    }

    #[test]
    fn notifications_reject_trailing_bytes() {
        let mut address = address_payload();
        address.push(0);
        assert!(matches!(
            decode_address_update(&address),
            Err(DecodeError::TrailingBytes(1))
        ));

        let mut stealth = stealth_payload();
        stealth.push(0);
        assert!(matches!(
            decode_stealth_update(&stealth),
            Err(DecodeError::TrailingBytes(1))
        ));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0; 56])]
    fn short_address_updates_are_truncated(#[case] payload: &[u8]) {
        assert!(matches!(
            decode_address_update(payload),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
