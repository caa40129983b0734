//! Builder for request payloads.

use bitcoin::consensus::{Encodable, encode::serialize};
use bytes::{BufMut, Bytes, BytesMut};

use crate::{chain::BinaryPrefix, error::ObeliskError};

/// Append-only buffer used to lay out a request payload field by field.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: BytesMut,
}

impl PayloadWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) { self.buf.put_u8(value); }

    /// Append a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) { self.buf.put_u32_le(value); }

    /// Append a little-endian `u64`.
    pub fn write_u64_le(&mut self, value: u64) { self.buf.put_u64_le(value); }

    /// Append raw bytes unchanged.
    pub fn write_bytes(&mut self, bytes: &[u8]) { self.buf.put_slice(bytes); }

    /// Append the consensus encoding of a transaction, hash or header.
    pub fn write_consensus<T: Encodable + ?Sized>(&mut self, value: &T) {
        self.buf.put_slice(&serialize(value));
    }

    /// Append a prefix as its one-byte bit size followed by its blocks.
    ///
    /// # Errors
    /// Returns [`ObeliskError::PrefixTooLong`] if the bit size exceeds 255;
    /// nothing is written in that case.
    pub fn write_prefix(&mut self, prefix: &BinaryPrefix) -> Result<(), ObeliskError> {
        let bits = u8::try_from(prefix.bits()).map_err(|_| ObeliskError::PrefixTooLong {
            bits: prefix.bits(),
        })?;
        self.buf.put_u8(bits);
        self.buf.put_slice(prefix.blocks());
        Ok(())
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Freeze the buffer into an immutable payload.
    #[must_use]
    pub fn finish(self) -> Bytes { self.buf.freeze() }
}
