//! Primitive field encoding for Obelisk payloads.
//!
//! Obelisk payloads are flat sequences of fixed-width little-endian integers,
//! raw hash digests and consensus-encoded transactions or headers. The
//! [`PayloadReader`] and [`PayloadWriter`] types wrap those primitives so the
//! per-command encoders and decoders read as field lists.

pub mod reader;
pub mod writer;

pub use reader::PayloadReader;
pub use writer::PayloadWriter;

/// Size of a transaction or block hash in bytes.
pub const HASH_SIZE: usize = 32;
/// Size of an address or public-key hash in bytes.
pub const SHORT_HASH_SIZE: usize = 20;
/// Size of an outpoint: transaction hash followed by a 4-byte index.
pub const POINT_SIZE: usize = HASH_SIZE + 4;
/// Size of a consensus-encoded block header.
pub const HEADER_SIZE: usize = 80;
/// Size of one compact history row: kind, point, height, value/checksum.
pub const COMPACT_HISTORY_ROW_SIZE: usize = 1 + POINT_SIZE + 4 + 8;
/// Size of one expanded history row from `address.fetch_history`.
pub const EXPANDED_HISTORY_ROW_SIZE: usize = POINT_SIZE + 8 + 8 + POINT_SIZE + 8;
/// Size of one compact stealth row.
pub const STEALTH_ROW_SIZE: usize = HASH_SIZE + SHORT_HASH_SIZE + HASH_SIZE;
/// Largest prefix, in bits, whose size fits the one-byte length field.
pub const MAX_PREFIX_BITS: usize = 255;
