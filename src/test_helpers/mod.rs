//! Shared fixtures for unit tests.

pub(crate) mod tracing;
mod transport;

pub(crate) use transport::RecordingTransport;

use bitcoin::{
    Amount,
    BlockHash,
    CompactTarget,
    OutPoint,
    ScriptBuf,
    Sequence,
    Transaction,
    TxIn,
    TxMerkleNode,
    TxOut,
    Txid,
    Witness,
    absolute::LockTime,
    block::{self, Header},
    hashes::Hash,
    transaction,
};

use crate::chain::PaymentAddress;

/// Version 0 address whose canonical hash is the bytes `01..=14` (hex).
pub(crate) fn sample_address() -> PaymentAddress {
    PaymentAddress::new(0, std::array::from_fn(|i| u8::try_from(i + 1).unwrap_or(0)))
}

/// Outpoint whose hash is filled with `fill`.
pub(crate) fn point(fill: u8, vout: u32) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([fill; 32]),
        vout,
    }
}

/// A one-input, one-output legacy transaction.
pub(crate) fn sample_transaction() -> Transaction {
    Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: point(0x11, 0),
            script_sig: ScriptBuf::from_bytes(vec![0x51]),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50_000),
            script_pubkey: ScriptBuf::from_bytes(vec![0x76, 0xa9]),
        }],
    }
}

/// An arbitrary but well-formed block header.
pub(crate) fn sample_header() -> Header {
    Header {
        version: block::Version::ONE,
        prev_blockhash: BlockHash::from_byte_array([0x22; 32]),
        merkle_root: TxMerkleNode::from_byte_array([0x33; 32]),
        time: 1_231_006_505,
        bits: CompactTarget::from_consensus(0x1d00_ffff),
        nonce: 2_083_236_893,
    }
}
