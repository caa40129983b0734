//! Utility to create AFL fuzzing corpus data.
//!
//! Writes one well-formed reply per command into `fuzz/corpus`. Each file
//! starts with a selector byte, the command's position in
//! [`Command::ALL`], followed by the reply payload, matching the layout the
//! fuzz target reads.
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
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
use obelisk_client::{
    Command,
    chain::point_checksum,
    history::{CompactHistoryRow, HistoryRow},
    legacy::write_expanded_row,
    stealth::CompactStealthRow,
    wire::PayloadWriter,
};

const CORPUS_DIR: &str = "fuzz/corpus";

fn outpoint(fill: u8, vout: u32) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([fill; 32]),
        vout,
    }
}

fn sample_transaction() -> Transaction {
    Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: outpoint(0x11, 0),
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

fn sample_header() -> Header {
    Header {
        version: block::Version::ONE,
        prev_blockhash: BlockHash::from_byte_array([0x22; 32]),
        merkle_root: TxMerkleNode::from_byte_array([0x33; 32]),
        time: 1_231_006_505,
        bits: CompactTarget::from_consensus(0x1d00_ffff),
        nonce: 2_083_236_893,
    }
}

fn reply_payload(command: Command, writer: &mut PayloadWriter) {
    match command {
        Command::BroadcastTransaction | Command::AddressSubscribe => {}
        Command::ValidateTransaction => {
            writer.write_u32_le(0);
            writer.write_u32_le(1);
        }
        Command::PoolFetchTransaction | Command::FetchTransaction => {
            writer.write_consensus(&sample_transaction());
        }
        Command::FetchLastHeight => writer.write_u32_le(840_000),
        Command::FetchBlockHeader => writer.write_consensus(&sample_header()),
        Command::FetchTransactionIndex => {
            writer.write_u32_le(840_000);
            writer.write_u32_le(12);
        }
        Command::FetchStealth => CompactStealthRow {
            ephemeral_key_hash: [0x44; 32],
            public_key_hash: [0x55; 20],
            transaction_hash: Txid::from_byte_array([0x66; 32]),
        }
        .write(writer),
        Command::FetchHistory | Command::AddressFetchHistory2 => {
            let output = outpoint(0x77, 1);
            CompactHistoryRow::output(output, 100, 25_000).write(writer);
            CompactHistoryRow::spend(outpoint(0x88, 0), 101, point_checksum(&output))
                .write(writer);
        }
        Command::AddressFetchHistory => {
            write_expanded_row(writer, &HistoryRow::unspent(outpoint(0x77, 1), 100, 25_000));
        }
        Command::AddressRenew => writer.write_u32_le(0),
        Command::AddressUpdate => {
            writer.write_u8(0);
            writer.write_bytes(&[0x99; 20]);
            writer.write_u32_le(840_000);
            writer.write_bytes(&[0xaa; 32]);
        }
        Command::AddressStealthUpdate => {
            writer.write_bytes(&[0xde, 0xad, 0xbe, 0xef]);
            writer.write_u32_le(840_000);
            writer.write_bytes(&[0xaa; 32]);
        }
    }
}

fn save_reply(selector: u8, command: Command, dir: &Path) -> Result<()> {
    let mut writer = PayloadWriter::new();
    writer.write_u8(selector);
    reply_payload(command, &mut writer);
    let path = dir.join(format!("{}.bin", command.name().replace('.', "_")));
    let mut f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(&writer.finish())?;
    Ok(())
}

fn main() -> Result<()> {
    fs::create_dir_all(CORPUS_DIR)?;
    let dir = Path::new(CORPUS_DIR);
    for (selector, command) in (0u8..).zip(Command::ALL) {
        save_reply(selector, command, dir)?;
    }
    Ok(())
}
