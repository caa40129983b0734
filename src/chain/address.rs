//! Version-prefixed payment addresses.

use std::{fmt, str::FromStr};

use bitcoin::base58;
use serde::Serialize;
use thiserror::Error;

use super::{ShortHash, hex_array, reversed};
use crate::wire::SHORT_HASH_SIZE;

/// Errors raised while parsing a Base58Check payment address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The text is not valid Base58Check.
    #[error("invalid base58check encoding: {0}")]
    Base58(#[from] base58::Error),
    /// The decoded payload is not one version byte plus a 20-byte hash.
    #[error("expected {expected} address bytes, found {0}", expected = SHORT_HASH_SIZE + 1)]
    Length(usize),
}

/// An address version byte with its 20-byte hash in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PaymentAddress {
    version: u8,
    #[serde(serialize_with = "hex_array::serialize")]
    hash: ShortHash,
}

impl PaymentAddress {
    /// Build an address from its version byte and canonical hash.
    #[must_use]
    pub const fn new(version: u8, hash: ShortHash) -> Self { Self { version, hash } }

    /// Build an address from the byte-reversed hash used on the wire.
    #[must_use]
    pub fn from_wire(version: u8, wire_hash: &ShortHash) -> Self {
        Self::new(version, reversed(wire_hash))
    }

    /// Address version byte.
    #[must_use]
    pub const fn version(&self) -> u8 { self.version }

    /// Hash in canonical order.
    #[must_use]
    pub const fn hash(&self) -> &ShortHash { &self.hash }

    /// Hash in the reversed order used by `blockchain.fetch_history`.
    #[must_use]
    pub fn wire_hash(&self) -> ShortHash { reversed(&self.hash) }
}

impl FromStr for PaymentAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = base58::decode_check(s)?;
        match data.split_first() {
            Some((version, hash)) => {
                let hash: ShortHash = hash
                    .try_into()
                    .map_err(|_| AddressError::Length(data.len()))?;
                Ok(Self::new(*version, hash))
            }
            None => Err(AddressError::Length(0)),
        }
    }
}

impl fmt::Display for PaymentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = Vec::with_capacity(SHORT_HASH_SIZE + 1);
        data.push(self.version);
        data.extend_from_slice(&self.hash);
        f.write_str(&base58::encode_check(&data))
    }
}
