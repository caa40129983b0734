//! Superseded history commands.
//!
//! Older servers answer `address.fetch_history` with fully expanded rows
//! carrying 64-bit heights, and `address.fetch_history2` with the compact
//! rows that `blockchain.fetch_history` uses but keyed by the canonical
//! address hash. Neither path is taken unless the caller asks for it.

use crate::{
    chain::PaymentAddress,
    command::Command,
    error::DecodeError,
    history::HistoryRow,
    request::{CommandRequest, history_request},
    wire::{PayloadReader, PayloadWriter},
};

/// `address.fetch_history`: laid out like `blockchain.fetch_history`, with
/// the address hash byte-reversed.
#[must_use]
pub fn address_fetch_history(address: &PaymentAddress, from_height: u32) -> CommandRequest {
    history_request(
        Command::AddressFetchHistory,
        address.version(),
        &address.wire_hash(),
        from_height,
    )
}

/// `address.fetch_history2`: the address hash in canonical order.
#[must_use]
pub fn address_fetch_history2(address: &PaymentAddress, from_height: u32) -> CommandRequest {
    history_request(
        Command::AddressFetchHistory2,
        address.version(),
        address.hash(),
        from_height,
    )
}

fn read_height(reader: &mut PayloadReader<'_>) -> Result<u32, DecodeError> {
    let height = reader.read_u64_le()?;
    u32::try_from(height).map_err(|_| DecodeError::HeightOverflow(height))
}

fn read_expanded_row(reader: &mut PayloadReader<'_>) -> Result<HistoryRow, DecodeError> {
    let output = reader.read_point()?;
    let output_height = read_height(reader)?;
    let value = reader.read_u64_le()?;
    let spend = reader.read_point()?;
    let spend_height = read_height(reader)?;
    Ok(HistoryRow {
        output,
        output_height,
        value,
        spend,
        spend_height,
    })
}

/// Decode an `address.fetch_history` reply of expanded rows.
///
/// Each row is `[output:36][output_height:8][value:8][spend:36]
/// [spend_height:8]`. Rows are taken as sent; no reconciliation is needed.
///
/// # Errors
/// Returns [`DecodeError::HeightOverflow`] if a height does not fit 32 bits,
/// or [`DecodeError::Truncated`] if the last row is cut short.
pub fn decode_expanded_history(payload: &[u8]) -> Result<Vec<HistoryRow>, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let mut rows = Vec::new();
    while !reader.is_exhausted() {
        rows.push(read_expanded_row(&mut reader)?);
    }
    Ok(rows)
}

/// Append `row` in the expanded wire layout.
pub fn write_expanded_row(writer: &mut PayloadWriter, row: &HistoryRow) {
    writer.write_consensus(&row.output);
    writer.write_u64_le(u64::from(row.output_height));
    writer.write_u64_le(row.value);
    writer.write_consensus(&row.spend);
    writer.write_u64_le(u64::from(row.spend_height));
}
