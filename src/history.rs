//! Address history rows and compact-history reconciliation.
//!
//! `blockchain.fetch_history` and `address.fetch_history2` reply with compact
//! rows. Output rows carry their value; spend rows reuse the same 8-byte slot
//! for the checksum of the output they consume instead of that output's hash.
//! [`reconcile`] pairs every spend with its output to rebuild the expanded
//! [`HistoryRow`] list callers work with.
//!
//! Checksums can collide. When two pending outputs share a checksum the first
//! one in reply order is paired with the spend. The wire format carries
//! nothing that could disambiguate further.
//!
//! Rows whose kind byte is neither output nor spend are read in full and then
//! ignored by reconciliation.

use std::collections::{HashMap, VecDeque};

use bitcoin::{OutPoint, Txid, hashes::Hash};
use serde::Serialize;
use tracing::debug;

use crate::{
    chain::point_checksum,
    error::DecodeError,
    wire::{PayloadReader, PayloadWriter},
};

/// Spend height recorded for outputs with no known spend.
pub const UNSPENT_HEIGHT: u32 = u32::MAX;

const OUTPUT_KIND: u8 = 0;
const SPEND_KIND: u8 = 1;

/// An output together with the input that spends it, if any.
///
/// Unspent outputs carry the null outpoint (zero hash, index `u32::MAX`) as
/// their spend and [`UNSPENT_HEIGHT`] as the spend height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    /// The output received by the address.
    pub output: OutPoint,
    /// Height of the block containing the output.
    pub output_height: u32,
    /// Output value in satoshis.
    pub value: u64,
    /// The input spending the output.
    pub spend: OutPoint,
    /// Height of the block containing the spend.
    pub spend_height: u32,
}

impl HistoryRow {
    /// An output with no spend recorded.
    #[must_use]
    pub fn unspent(output: OutPoint, output_height: u32, value: u64) -> Self {
        Self {
            output,
            output_height,
            value,
            spend: OutPoint::null(),
            spend_height: UNSPENT_HEIGHT,
        }
    }

    /// Whether a spend has been recorded for the output.
    #[must_use]
    pub fn is_spent(&self) -> bool { !self.spend.is_null() }
}

/// The data carried in the shared value/checksum slot of a compact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactKind {
    /// The row is an output received by the address.
    Output {
        /// Output value in satoshis.
        value: u64,
    },
    /// The row is an input spending one of the address's outputs.
    Spend {
        /// Checksum of the spent output's point.
        previous_checksum: u64,
    },
    /// The row carried a kind byte this client does not know.
    Unknown {
        /// The raw kind byte.
        kind: u8,
        /// The raw value/checksum slot.
        slot: u64,
    },
}

/// One row of a compact history reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactHistoryRow {
    /// Output point for output rows, input point for spend rows.
    pub point: OutPoint,
    /// Height of the block containing the row.
    pub height: u32,
    /// Row kind together with its value or checksum.
    pub kind: CompactKind,
}

impl CompactHistoryRow {
    /// An output row.
    #[must_use]
    pub const fn output(point: OutPoint, height: u32, value: u64) -> Self {
        Self {
            point,
            height,
            kind: CompactKind::Output { value },
        }
    }

    /// A spend row consuming the output whose checksum is `previous_checksum`.
    #[must_use]
    pub const fn spend(point: OutPoint, height: u32, previous_checksum: u64) -> Self {
        Self {
            point,
            height,
            kind: CompactKind::Spend { previous_checksum },
        }
    }

    /// Read `[kind:1][point:36][height:4][value|checksum:8]`.
    ///
    /// A kind byte other than 0 or 1 yields [`CompactKind::Unknown`].
    ///
    /// # Errors
    /// Returns [`DecodeError::Truncated`] if the row is cut short.
    pub fn read(reader: &mut PayloadReader<'_>) -> Result<Self, DecodeError> {
        let kind_byte = reader.read_u8()?;
        let point = reader.read_point()?;
        let height = reader.read_u32_le()?;
        let slot = reader.read_u64_le()?;
        let kind = match kind_byte {
            OUTPUT_KIND => CompactKind::Output { value: slot },
            SPEND_KIND => CompactKind::Spend {
                previous_checksum: slot,
            },
            other => CompactKind::Unknown { kind: other, slot },
        };
        Ok(Self {
            point,
            height,
            kind,
        })
    }

    /// Append the row in wire layout.
    pub fn write(&self, writer: &mut PayloadWriter) {
        let (kind, slot) = match self.kind {
            CompactKind::Output { value } => (OUTPUT_KIND, value),
            CompactKind::Spend { previous_checksum } => (SPEND_KIND, previous_checksum),
            CompactKind::Unknown { kind, slot } => (kind, slot),
        };
        writer.write_u8(kind);
        writer.write_consensus(&self.point);
        writer.write_u32_le(self.height);
        writer.write_u64_le(slot);
    }
}

/// Pair compact spend rows with the outputs they consume.
///
/// Rows are returned in the order their outputs appear. Each spend is
/// matched to the first still-unspent output whose checksum equals its
/// `previous_checksum`; spends with no such output are dropped. A spend whose
/// hash is all zeros leaves its output pending, so a later spend with the same
/// checksum can still claim it. Rows of unknown kind are skipped.
#[must_use]
pub fn reconcile(compact: &[CompactHistoryRow]) -> Vec<HistoryRow> {
    let mut rows = Vec::new();
    let mut pending: HashMap<u64, VecDeque<usize>> = HashMap::new();

    for row in compact {
        if let CompactKind::Output { value } = row.kind {
            pending
                .entry(point_checksum(&row.point))
                .or_default()
                .push_back(rows.len());
            rows.push(HistoryRow::unspent(row.point, row.height, value));
        }
    }

    for row in compact {
        let CompactKind::Spend { previous_checksum } = row.kind else {
            continue;
        };
        let queue = pending.get_mut(&previous_checksum);
        let slot = if row.point.txid == Txid::all_zeros() {
            queue.and_then(|indexes| indexes.front().copied())
        } else {
            queue.and_then(VecDeque::pop_front)
        };
        match slot.and_then(|index| rows.get_mut(index)) {
            Some(output) => {
                output.spend = row.point;
                output.spend_height = row.height;
            }
            None => debug!(
                checksum = previous_checksum,
                spend = %row.point,
                "spend matches no pending output"
            ),
        }
    }

    // A spend recorded with a null hash still reads as unspent.
    for row in &mut rows {
        if row.spend.txid == Txid::all_zeros() {
            row.spend_height = UNSPENT_HEIGHT;
        }
    }

    rows
}

/// Read compact rows until the payload is exhausted.
///
/// # Errors
/// Fails on the first malformed row; no partial list is returned.
pub fn decode_compact_history(payload: &[u8]) -> Result<Vec<CompactHistoryRow>, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let mut rows = Vec::new();
    while !reader.is_exhausted() {
        rows.push(CompactHistoryRow::read(&mut reader)?);
    }
    Ok(rows)
}

/// Decode a compact history reply and reconcile it into expanded rows.
///
/// # Errors
/// Fails if any row is malformed.
pub fn decode_history(payload: &[u8]) -> Result<Vec<HistoryRow>, DecodeError> {
    decode_compact_history(payload).map(|compact| reconcile(&compact))
}
