//! Wire codec for the Obelisk blockchain query protocol.
//!
//! This crate turns typed query calls into the exact request payloads an
//! Obelisk server expects and turns reply payloads back into typed results.
//! It holds no state between calls: the request/reply transport is supplied
//! by the caller through the [`proxy::Transport`] trait, and transactions,
//! headers and hashes use the consensus encoding from the `bitcoin` crate.

pub mod chain;
pub mod cli;
pub mod command;
pub mod error;
pub mod history;
pub mod legacy;
pub mod notify;
pub mod proxy;
pub mod reply;
pub mod request;
pub mod stealth;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use command::Command;
pub use error::{DecodeError, ObeliskError, TransportError};
pub use proxy::{HistoryVariant, Proxy, Transport};
pub use request::CommandRequest;
