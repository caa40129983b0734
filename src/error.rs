//! Error types for Obelisk request encoding and reply decoding.

use thiserror::Error;

use crate::command::Command;

/// Errors raised while parsing a reply payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload ended before a field could be read.
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes required by the field being read.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },
    /// Bytes were left over after every expected field was read.
    #[error("{0} trailing bytes after reply")]
    TrailingBytes(usize),
    /// A legacy expanded history row carried a height above `u32::MAX`.
    #[error("history height {0} does not fit in 32 bits")]
    HeightOverflow(u64),
    /// A transaction or block header failed consensus decoding.
    #[error("invalid consensus encoding: {0}")]
    Consensus(#[from] bitcoin::consensus::encode::Error),
}

/// Failures reported by the request/reply transport.
///
/// The codec never produces these itself; it forwards whatever the transport
/// reports to the caller untouched.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No reply arrived before the transport gave up.
    #[error("request timed out")]
    Timeout,
    /// The connection to the server was lost.
    #[error("connection lost")]
    ConnectionLost,
    /// Any other transport-specific failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The single failure outcome of a proxy call.
#[derive(Debug, Error)]
pub enum ObeliskError {
    /// A prefix was longer than the one-byte bit count allows. Nothing was
    /// sent.
    #[error("prefix of {bits} bits exceeds the 255-bit limit")]
    PrefixTooLong {
        /// Requested prefix size in bits.
        bits: usize,
    },
    /// The reply did not match the layout expected for its command.
    #[error("malformed response to {command}: {source}")]
    MalformedResponse {
        /// Command whose reply failed to decode.
        command: Command,
        /// Underlying parse failure.
        #[source]
        source: DecodeError,
    },
    /// The server answered with a non-zero result code.
    #[error("{command} rejected with code {code}")]
    Rejected {
        /// Command that was rejected.
        command: Command,
        /// Result code reported by the server.
        code: u32,
    },
    /// The transport failed to deliver a reply.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl ObeliskError {
    /// Wrap a decode failure for `command`.
    #[must_use]
    pub const fn malformed(command: Command, source: DecodeError) -> Self {
        Self::MalformedResponse { command, source }
    }
}
