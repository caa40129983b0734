//! Obelisk command names.
//!
//! Every request and notification on the wire is tagged with a dotted command
//! name. [`Command`] maps those names to a closed set of variants so the
//! encoder, decoder registry and tooling agree on a single spelling.

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

/// A command understood by an Obelisk server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Command {
    /// `protocol.broadcast_transaction`
    BroadcastTransaction,
    /// `transaction_pool.validate`
    ValidateTransaction,
    /// `transaction_pool.fetch_transaction`
    PoolFetchTransaction,
    /// `blockchain.fetch_transaction`
    FetchTransaction,
    /// `blockchain.fetch_last_height`
    FetchLastHeight,
    /// `blockchain.fetch_block_header`
    FetchBlockHeader,
    /// `blockchain.fetch_transaction_index`
    FetchTransactionIndex,
    /// `blockchain.fetch_stealth`
    FetchStealth,
    /// `blockchain.fetch_history`
    FetchHistory,
    /// `address.fetch_history`, superseded by `blockchain.fetch_history`.
    AddressFetchHistory,
    /// `address.fetch_history2`
    AddressFetchHistory2,
    /// `address.subscribe`
    AddressSubscribe,
    /// `address.renew`
    AddressRenew,
    /// `address.update`, pushed by the server.
    AddressUpdate,
    /// `address.stealth_update`, pushed by the server.
    AddressStealthUpdate,
}

/// Raised when a string does not name a known command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command {0:?}")]
pub struct UnknownCommand(pub String);

impl Command {
    /// Every command, in wire-table order.
    pub const ALL: [Self; 15] = [
        Self::BroadcastTransaction,
        Self::ValidateTransaction,
        Self::PoolFetchTransaction,
        Self::FetchTransaction,
        Self::FetchLastHeight,
        Self::FetchBlockHeader,
        Self::FetchTransactionIndex,
        Self::FetchStealth,
        Self::FetchHistory,
        Self::AddressFetchHistory,
        Self::AddressFetchHistory2,
        Self::AddressSubscribe,
        Self::AddressRenew,
        Self::AddressUpdate,
        Self::AddressStealthUpdate,
    ];

    /// The dotted name sent on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BroadcastTransaction => "protocol.broadcast_transaction",
            Self::ValidateTransaction => "transaction_pool.validate",
            Self::PoolFetchTransaction => "transaction_pool.fetch_transaction",
            Self::FetchTransaction => "blockchain.fetch_transaction",
            Self::FetchLastHeight => "blockchain.fetch_last_height",
            Self::FetchBlockHeader => "blockchain.fetch_block_header",
            Self::FetchTransactionIndex => "blockchain.fetch_transaction_index",
            Self::FetchStealth => "blockchain.fetch_stealth",
            Self::FetchHistory => "blockchain.fetch_history",
            Self::AddressFetchHistory => "address.fetch_history",
            Self::AddressFetchHistory2 => "address.fetch_history2",
            Self::AddressSubscribe => "address.subscribe",
            Self::AddressRenew => "address.renew",
            Self::AddressUpdate => "address.update",
            Self::AddressStealthUpdate => "address.stealth_update",
        }
    }

    /// Whether the command only exists for older servers.
    #[must_use]
    pub const fn is_deprecated(self) -> bool { matches!(self, Self::AddressFetchHistory) }

    /// Whether the server sends this command unprompted.
    #[must_use]
    pub const fn is_notification(self) -> bool {
        matches!(self, Self::AddressUpdate | Self::AddressStealthUpdate)
    }
}

impl From<Command> for &'static str {
    fn from(command: Command) -> Self { command.name() }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_owned()))
    }
}
