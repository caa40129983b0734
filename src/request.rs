//! Request payload encoding.
//!
//! Each function here builds the exact payload one command expects. They are
//! pure: the only failure is a local validation error for prefixes too long
//! for the one-byte size field, reported before any request exists.
//!
//! The superseded `address.fetch_history*` requests live in
//! [`crate::legacy`].

use bitcoin::{BlockHash, Transaction, Txid};
use bytes::Bytes;

use crate::{
    chain::{BinaryPrefix, PaymentAddress, ShortHash, SubscribeType},
    command::Command,
    error::ObeliskError,
    wire::{HASH_SIZE, PayloadWriter, SHORT_HASH_SIZE},
};

/// A command name paired with its encoded payload, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    command: Command,
    payload: Bytes,
}

impl CommandRequest {
    /// Pair `command` with an already encoded payload.
    #[must_use]
    pub const fn new(command: Command, payload: Bytes) -> Self { Self { command, payload } }

    /// Command this request invokes.
    #[must_use]
    pub const fn command(&self) -> Command { self.command }

    /// Dotted wire name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.command.name() }

    /// Encoded payload bytes.
    #[must_use]
    pub const fn payload(&self) -> &Bytes { &self.payload }

    /// Split the request into its command and payload.
    #[must_use]
    pub fn into_parts(self) -> (Command, Bytes) { (self.command, self.payload) }
}

/// Selects a block header by height or by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLocator {
    /// Header at this height on the main chain.
    Height(u32),
    /// Header with this block hash.
    Hash(BlockHash),
}

fn transaction_request(command: Command, tx: &Transaction) -> CommandRequest {
    let mut writer = PayloadWriter::new();
    writer.write_consensus(tx);
    CommandRequest::new(command, writer.finish())
}

fn hash_request(command: Command, hash: &Txid) -> CommandRequest {
    let mut writer = PayloadWriter::with_capacity(HASH_SIZE);
    writer.write_consensus(hash);
    CommandRequest::new(command, writer.finish())
}

/// Lay out `[version:1][hash:20][from_height:4]` with the hash bytes exactly
/// as given; callers choose the byte order.
pub(crate) fn history_request(
    command: Command,
    version: u8,
    hash: &ShortHash,
    from_height: u32,
) -> CommandRequest {
    let mut writer = PayloadWriter::with_capacity(1 + SHORT_HASH_SIZE + 4);
    writer.write_u8(version);
    writer.write_bytes(hash);
    writer.write_u32_le(from_height);
    CommandRequest::new(command, writer.finish())
}

fn prefix_request(
    command: Command,
    kind: SubscribeType,
    prefix: &BinaryPrefix,
) -> Result<CommandRequest, ObeliskError> {
    let mut writer = PayloadWriter::with_capacity(2 + prefix.blocks().len());
    writer.write_u8(kind.into());
    writer.write_prefix(prefix)?;
    Ok(CommandRequest::new(command, writer.finish()))
}

/// `protocol.broadcast_transaction`: the serialised transaction.
#[must_use]
pub fn broadcast_transaction(tx: &Transaction) -> CommandRequest {
    transaction_request(Command::BroadcastTransaction, tx)
}

/// `transaction_pool.validate`: the serialised transaction.
#[must_use]
pub fn validate_transaction(tx: &Transaction) -> CommandRequest {
    transaction_request(Command::ValidateTransaction, tx)
}

/// `transaction_pool.fetch_transaction`: the 32-byte transaction hash.
#[must_use]
pub fn pool_fetch_transaction(hash: &Txid) -> CommandRequest {
    hash_request(Command::PoolFetchTransaction, hash)
}

/// `blockchain.fetch_transaction`: the 32-byte transaction hash.
#[must_use]
pub fn fetch_transaction(hash: &Txid) -> CommandRequest {
    hash_request(Command::FetchTransaction, hash)
}

/// `blockchain.fetch_last_height`: an empty payload.
#[must_use]
pub fn fetch_last_height() -> CommandRequest {
    CommandRequest::new(Command::FetchLastHeight, Bytes::new())
}

/// `blockchain.fetch_block_header`: a 4-byte height or a 32-byte block hash.
#[must_use]
pub fn fetch_block_header(locator: HeaderLocator) -> CommandRequest {
    let mut writer = PayloadWriter::with_capacity(HASH_SIZE);
    match locator {
        HeaderLocator::Height(height) => writer.write_u32_le(height),
        HeaderLocator::Hash(hash) => writer.write_consensus(&hash),
    }
    CommandRequest::new(Command::FetchBlockHeader, writer.finish())
}

/// `blockchain.fetch_transaction_index`: the 32-byte transaction hash.
#[must_use]
pub fn fetch_transaction_index(hash: &Txid) -> CommandRequest {
    hash_request(Command::FetchTransactionIndex, hash)
}

/// `blockchain.fetch_stealth`: prefix bit size, prefix blocks, from-height.
///
/// # Errors
/// Returns [`ObeliskError::PrefixTooLong`] if the prefix exceeds 255 bits.
pub fn fetch_stealth(
    prefix: &BinaryPrefix,
    from_height: u32,
) -> Result<CommandRequest, ObeliskError> {
    let mut writer = PayloadWriter::with_capacity(1 + prefix.blocks().len() + 4);
    writer.write_prefix(prefix)?;
    writer.write_u32_le(from_height);
    Ok(CommandRequest::new(Command::FetchStealth, writer.finish()))
}

/// `blockchain.fetch_history`: version, byte-reversed address hash,
/// from-height.
#[must_use]
pub fn fetch_history(address: &PaymentAddress, from_height: u32) -> CommandRequest {
    history_request(
        Command::FetchHistory,
        address.version(),
        &address.wire_hash(),
        from_height,
    )
}

/// `address.subscribe`: subscription type, prefix bit size, prefix blocks.
///
/// # Errors
/// Returns [`ObeliskError::PrefixTooLong`] if the prefix exceeds 255 bits.
pub fn subscribe(
    kind: SubscribeType,
    prefix: &BinaryPrefix,
) -> Result<CommandRequest, ObeliskError> {
    prefix_request(Command::AddressSubscribe, kind, prefix)
}

/// `address.subscribe` for every update to a single payment address.
///
/// The prefix is the full 160-bit canonical hash, which always fits.
#[must_use]
pub fn subscribe_address(address: &PaymentAddress) -> CommandRequest {
    let prefix = BinaryPrefix::from_address(address);
    let mut writer = PayloadWriter::with_capacity(2 + SHORT_HASH_SIZE);
    writer.write_u8(SubscribeType::Address.into());
    // 160 bits always fits the one-byte size field.
    writer.write_u8(u8::try_from(prefix.bits()).unwrap_or(u8::MAX));
    writer.write_bytes(prefix.blocks());
    CommandRequest::new(Command::AddressSubscribe, writer.finish())
}

/// `address.renew`: same layout as `address.subscribe`.
///
/// Subscriptions lapse after a fixed interval unless renewed.
///
/// # Errors
/// Returns [`ObeliskError::PrefixTooLong`] if the prefix exceeds 255 bits.
pub fn renew(kind: SubscribeType, prefix: &BinaryPrefix) -> Result<CommandRequest, ObeliskError> {
    prefix_request(Command::AddressRenew, kind, prefix)
}
