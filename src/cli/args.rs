//! Command-line definitions for `obelisk-wire`.
//!
//! Kept in the library so the binary stays a thin wrapper and the parsing
//! surface can be tested without spawning a process.

#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![allow(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]
#![allow(
    unfulfilled_lint_expectations,
    reason = "derive macros conditionally generate items"
)]

use bitcoin::{BlockHash, Txid};
use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::{
    chain::{PaymentAddress, SubscribeType},
    command::Command,
    proxy::HistoryVariant,
};

/// Name used as `argv[0]` when loading configuration.
pub const BIN_NAME: &str = "obelisk-wire";

/// Settings resolved from `.obelisk.toml`, `OBELISK_*` variables and flags.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Args, OrthoConfig, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[ortho_config(prefix = "OBELISK_")]
pub struct ClientConfig {
    /// `tracing` filter directive for diagnostics written to stderr.
    #[ortho_config(default = "warn".to_owned())]
    #[arg(long, default_value_t = String::from("warn"))]
    pub log_filter: String,
    /// Pretty-print JSON output.
    #[ortho_config(default = false)]
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_owned(),
            pretty: false,
        }
    }
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Debug, Clone)]
#[command(name = BIN_NAME, version, about)]
pub struct Cli {
    /// Override the configured log filter.
    #[arg(long, global = true)]
    pub log_filter: Option<String>,
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,
    /// Action to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// Actions exposed by `obelisk-wire`.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the wire payload of a request.
    #[command(subcommand)]
    Request(RequestCommand),
    /// Decode a hex reply or notification payload and print it as JSON.
    Decode {
        /// Dotted command name the payload answers.
        command: Command,
        /// Payload bytes in hex.
        payload: String,
    },
    /// List every known command.
    Commands,
}

/// Requests `obelisk-wire request` can encode.
#[derive(Subcommand, Debug, Clone)]
pub enum RequestCommand {
    /// `protocol.broadcast_transaction`
    BroadcastTransaction {
        /// Serialised transaction in hex.
        transaction: String,
    },
    /// `transaction_pool.validate`
    ValidateTransaction {
        /// Serialised transaction in hex.
        transaction: String,
    },
    /// `transaction_pool.fetch_transaction`
    PoolFetchTransaction {
        /// Transaction id.
        hash: Txid,
    },
    /// `blockchain.fetch_transaction`
    FetchTransaction {
        /// Transaction id.
        hash: Txid,
    },
    /// `blockchain.fetch_last_height`
    FetchLastHeight,
    /// `blockchain.fetch_block_header`
    FetchBlockHeader {
        /// Block height.
        #[arg(long, conflicts_with = "hash", required_unless_present = "hash")]
        height: Option<u32>,
        /// Block hash.
        #[arg(long)]
        hash: Option<BlockHash>,
    },
    /// `blockchain.fetch_transaction_index`
    FetchTransactionIndex {
        /// Transaction id.
        hash: Txid,
    },
    /// `blockchain.fetch_stealth`
    FetchStealth {
        /// Prefix length in bits.
        bits: usize,
        /// Prefix bytes in hex, most significant bit first.
        prefix: String,
        /// First block height to search.
        #[arg(long, default_value_t = 0)]
        from_height: u32,
    },
    /// `blockchain.fetch_history` or one of its predecessors.
    FetchHistory {
        /// Base58Check payment address.
        address: PaymentAddress,
        /// First block height to search.
        #[arg(long, default_value_t = 0)]
        from_height: u32,
        /// History command to use.
        #[arg(long, value_enum, default_value_t)]
        variant: HistoryVariant,
    },
    /// `address.subscribe` for a prefix.
    Subscribe {
        /// What the prefix is matched against.
        #[arg(value_enum)]
        kind: SubscribeType,
        /// Prefix length in bits.
        bits: usize,
        /// Prefix bytes in hex, most significant bit first.
        prefix: String,
    },
    /// `address.subscribe` for a whole payment address.
    SubscribeAddress {
        /// Base58Check payment address.
        address: PaymentAddress,
    },
    /// `address.renew`
    Renew {
        /// What the prefix is matched against.
        #[arg(value_enum)]
        kind: SubscribeType,
        /// Prefix length in bits.
        bits: usize,
        /// Prefix bytes in hex, most significant bit first.
        prefix: String,
    },
}
