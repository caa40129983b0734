//! Reply payload decoding.
//!
//! One decoder per reply layout. Every decoder insists the payload is fully
//! consumed, so a reply with extra bytes is as malformed as a short one.
//! [`decode_reply`] picks the decoder for a command and wraps the result in
//! [`Reply`] for callers that handle replies generically.

use bitcoin::{Transaction, block::Header};
use serde::Serialize;

use crate::{
    command::Command,
    error::DecodeError,
    history::{HistoryRow, decode_history},
    legacy::decode_expanded_history,
    notify::{Notification, decode_address_update, decode_stealth_update},
    stealth::{StealthRow, decode_stealth},
    wire::PayloadReader,
};

/// Confirmed position of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionIndex {
    /// Height of the block containing the transaction.
    pub height: u32,
    /// Position of the transaction within that block.
    pub index: u32,
}

/// A decoded reply of any command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    /// Acknowledgement with no payload.
    Empty,
    /// A transaction.
    Transaction(Transaction),
    /// A block height.
    Height(u32),
    /// A block header.
    BlockHeader(Header),
    /// Confirmed position of a transaction.
    TransactionIndex(TransactionIndex),
    /// Indexes of inputs spending unconfirmed outputs.
    UnconfirmedInputs(Vec<u32>),
    /// Resolved address history.
    History(Vec<HistoryRow>),
    /// Expanded stealth rows.
    Stealth(Vec<StealthRow>),
    /// Result code of a subscription renewal.
    ResultCode(u32),
    /// A server push.
    Notification(Notification),
}

impl From<Notification> for Reply {
    fn from(notification: Notification) -> Self { Self::Notification(notification) }
}

/// Decode an empty acknowledgement.
///
/// # Errors
/// Returns [`DecodeError::TrailingBytes`] if the payload is not empty.
pub fn decode_empty(payload: &[u8]) -> Result<(), DecodeError> { PayloadReader::new(payload).finish() }

/// Decode a single consensus-encoded transaction.
///
/// # Errors
/// Fails if the transaction does not decode or bytes follow it.
pub fn decode_transaction(payload: &[u8]) -> Result<Transaction, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let tx = reader.read_consensus()?;
    reader.finish()?;
    Ok(tx)
}

/// Decode a 4-byte little-endian height.
///
/// # Errors
/// Fails unless the payload is exactly four bytes.
pub fn decode_height(payload: &[u8]) -> Result<u32, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let height = reader.read_u32_le()?;
    reader.finish()?;
    Ok(height)
}

/// Decode an 80-byte block header.
///
/// # Errors
/// Fails unless the payload is exactly one header.
pub fn decode_block_header(payload: &[u8]) -> Result<Header, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let header = reader.read_consensus()?;
    reader.finish()?;
    Ok(header)
}

/// Decode `[height:4][index:4]`.
///
/// # Errors
/// Fails unless the payload is exactly eight bytes.
pub fn decode_transaction_index(payload: &[u8]) -> Result<TransactionIndex, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let height = reader.read_u32_le()?;
    let index = reader.read_u32_le()?;
    reader.finish()?;
    Ok(TransactionIndex { height, index })
}

/// Decode the list of unconfirmed input indexes returned by
/// `transaction_pool.validate`.
///
/// # Errors
/// Returns [`DecodeError::Truncated`] if the payload is not a whole number of
/// 4-byte indexes.
pub fn decode_validate(payload: &[u8]) -> Result<Vec<u32>, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let mut unconfirmed = Vec::new();
    while !reader.is_exhausted() {
        unconfirmed.push(reader.read_u32_le()?);
    }
    Ok(unconfirmed)
}

/// Decode the 4-byte result code of `address.renew`.
///
/// # Errors
/// Fails unless the payload is exactly four bytes.
pub fn decode_result_code(payload: &[u8]) -> Result<u32, DecodeError> { decode_height(payload) }

/// Decode `payload` as the reply to `command`.
///
/// # Errors
/// Returns whatever the decoder for `command` reports.
pub fn decode_reply(command: Command, payload: &[u8]) -> Result<Reply, DecodeError> {
    match command {
        Command::BroadcastTransaction | Command::AddressSubscribe => {
            decode_empty(payload).map(|()| Reply::Empty)
        }
        Command::ValidateTransaction => decode_validate(payload).map(Reply::UnconfirmedInputs),
        Command::PoolFetchTransaction | Command::FetchTransaction => {
            decode_transaction(payload).map(Reply::Transaction)
        }
        Command::FetchLastHeight => decode_height(payload).map(Reply::Height),
        Command::FetchBlockHeader => decode_block_header(payload).map(Reply::BlockHeader),
        Command::FetchTransactionIndex => {
            decode_transaction_index(payload).map(Reply::TransactionIndex)
        }
        Command::FetchStealth => decode_stealth(payload).map(Reply::Stealth),
        Command::FetchHistory | Command::AddressFetchHistory2 => {
            decode_history(payload).map(Reply::History)
        }
        Command::AddressFetchHistory => decode_expanded_history(payload).map(Reply::History),
        Command::AddressRenew => decode_result_code(payload).map(Reply::ResultCode),
        Command::AddressUpdate => {
            decode_address_update(payload).map(|update| Notification::Address(update).into())
        }
        Command::AddressStealthUpdate => {
            decode_stealth_update(payload).map(|update| Notification::Stealth(update).into())
        }
    }
}
