//! Cursor over a reply payload.
//!
//! Every read checks the remaining length first, so a short payload surfaces
//! as [`DecodeError::Truncated`] instead of a panic inside [`bytes::Buf`].

use bitcoin::{
    BlockHash,
    OutPoint,
    Txid,
    consensus::{Decodable, encode::deserialize_partial},
    hashes::Hash,
};
use bytes::Buf;

use super::{HASH_SIZE, SHORT_HASH_SIZE};
use crate::error::DecodeError;

/// Sequential reader over a borrowed reply payload.
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Start reading at the beginning of `payload`.
    #[must_use]
    pub const fn new(payload: &'a [u8]) -> Self { Self { buf: payload } }

    /// Number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.buf.len() }

    /// Whether every byte has been consumed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool { self.buf.is_empty() }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.buf.len() < needed {
            return Err(DecodeError::Truncated {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Read a single byte.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the payload is exhausted.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a little-endian `u32`.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if fewer than four bytes remain.
    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian `u64`.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if fewer than eight bytes remain.
    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    /// Read `N` raw bytes.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read a 32-byte digest in wire order.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the digest is cut short.
    pub fn read_hash(&mut self) -> Result<[u8; HASH_SIZE], DecodeError> { self.read_array() }

    /// Read a 20-byte digest in wire order.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the digest is cut short.
    pub fn read_short_hash(&mut self) -> Result<[u8; SHORT_HASH_SIZE], DecodeError> {
        self.read_array()
    }

    /// Read a transaction hash.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the hash is cut short.
    pub fn read_txid(&mut self) -> Result<Txid, DecodeError> {
        Ok(Txid::from_byte_array(self.read_hash()?))
    }

    /// Read a block hash.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the hash is cut short.
    pub fn read_block_hash(&mut self) -> Result<BlockHash, DecodeError> {
        Ok(BlockHash::from_byte_array(self.read_hash()?))
    }

    /// Read an outpoint: transaction hash then little-endian index.
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the point is cut short.
    pub fn read_point(&mut self) -> Result<OutPoint, DecodeError> {
        let txid = self.read_txid()?;
        let vout = self.read_u32_le()?;
        Ok(OutPoint { txid, vout })
    }

    /// Consensus-decode a value such as a transaction or block header,
    /// consuming exactly the bytes it occupies.
    ///
    /// # Errors
    /// Returns [`DecodeError::Consensus`] if the bytes do not decode.
    pub fn read_consensus<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        let (value, consumed) = deserialize_partial::<T>(self.buf)?;
        self.buf.advance(consumed);
        Ok(value)
    }

    /// Confirm the payload has been fully consumed.
    ///
    /// # Errors
    /// Returns [`DecodeError::TrailingBytes`] if any bytes remain unread.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.is_exhausted() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.remaining()))
        }
    }
}
