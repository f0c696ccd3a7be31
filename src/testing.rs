//! Fixtures shared by unit and integration tests.

use std::sync::Arc;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{serialize, serialize_hex};
use bitcoin::hashes::{sha256d, Hash};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, OutPoint, PubkeyHash, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::address::Base58Codec;
use crate::model::{RawInput, RawOutput, RawTransaction, SpecialPayloads};
use crate::network::NetworkParams;
use crate::transform::TxTransformer;

/// Mainnet pay-to-pubkey-hash address of [`ADDRESS_HASH`].
pub const ADDRESS: &str = "XcF5mKwWsiv3k394GBQNpYAuk3CVJ48Xnp";
pub const ADDRESS_HASH: [u8; 20] = [0x11; 20];

/// Mainnet pay-to-script-hash address.
pub const SCRIPT_ADDRESS: &str = "7VX8ctLrBuowG8KLCJWQh2KptUMgkakeuY";

/// Testnet pay-to-pubkey-hash address.
pub const TESTNET_ADDRESS: &str = "yQzAeRbC9Hy3Fy9Ydcu5naZVqivT95Ka2R";

pub const BLOCK_HEIGHT: i64 = 100;
pub const BLOCK_TIMESTAMP: u64 = 1_500_000_000;

pub fn transformer() -> TxTransformer {
    TxTransformer::new(Arc::new(Base58Codec::new(NetworkParams::MAINNET)))
}

fn address_script() -> String {
    format!("76a914{}88ac", hex::encode(ADDRESS_HASH))
}

/// Confirmed two-coin spend paying 1.5 coins to [`ADDRESS`] in block `b100`.
pub fn sample_transaction(hash: &str) -> RawTransaction {
    RawTransaction {
        hash: hash.to_string(),
        version: 2,
        locktime: 0,
        inputs: vec![RawInput {
            prev_tx_id: "e3".repeat(32),
            output_index: 1,
            sequence: u32::MAX,
            script: "4730440220".to_string(),
            script_asm: Some("30440220[ALL]".to_string()),
            address: Some(ADDRESS.to_string()),
            satoshis: Some(200_000_000),
        }],
        outputs: vec![RawOutput {
            satoshis: 150_000_000,
            script: address_script(),
            script_asm: Some(format!(
                "OP_DUP OP_HASH160 {} OP_EQUALVERIFY OP_CHECKSIG",
                hex::encode(ADDRESS_HASH)
            )),
            address: Some(ADDRESS.to_string()),
            spent_tx_id: None,
            spent_index: None,
            spent_height: None,
        }],
        height: BLOCK_HEIGHT,
        block_hash: Some("b100".to_string()),
        block_timestamp: Some(BLOCK_TIMESTAMP),
        hex: "00".repeat(191),
        input_satoshis: Some(200_000_000),
        output_satoshis: 150_000_000,
        fee_satoshis: Some(50_000_000),
        coinbase: false,
        tx_type: None,
        extra_payload_size: None,
        extra_payload: None,
        txlock: None,
        payloads: SpecialPayloads::default(),
    }
}

/// Confirmed coinbase paying 5 coins to [`ADDRESS`].
pub fn coinbase_transaction(hash: &str) -> RawTransaction {
    RawTransaction {
        hash: hash.to_string(),
        version: 3,
        locktime: 0,
        inputs: vec![RawInput {
            prev_tx_id: "00".repeat(32),
            output_index: u32::MAX,
            sequence: u32::MAX,
            script: "03a08601".to_string(),
            script_asm: None,
            address: None,
            satoshis: None,
        }],
        outputs: vec![RawOutput {
            satoshis: 500_000_000,
            script: address_script(),
            script_asm: None,
            address: Some(ADDRESS.to_string()),
            spent_tx_id: None,
            spent_index: None,
            spent_height: None,
        }],
        height: BLOCK_HEIGHT,
        block_hash: Some("b100".to_string()),
        block_timestamp: Some(BLOCK_TIMESTAMP),
        hex: "00".repeat(120),
        input_satoshis: None,
        output_satoshis: 500_000_000,
        fee_satoshis: None,
        coinbase: true,
        tx_type: None,
        extra_payload_size: None,
        extra_payload: None,
        txlock: None,
        payloads: SpecialPayloads::default(),
    }
}

/// Relay-network transaction with one input per entry of `sequences` and
/// outputs paying to [`ADDRESS`] and an unspendable data script.
pub fn relay_transaction(sequences: &[u32]) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: sequences
            .iter()
            .enumerate()
            .map(|(index, sequence)| TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_byte_array([index as u8 + 1; 32]),
                    vout: 0,
                },
                script_sig: ScriptBuf::from_bytes(vec![0x51]),
                sequence: Sequence(*sequence),
                witness: Witness::new(),
            })
            .collect(),
        output: vec![
            TxOut {
                value: Amount::from_sat(120_000),
                script_pubkey: ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(ADDRESS_HASH)),
            },
            TxOut {
                value: Amount::from_sat(30_000),
                script_pubkey: ScriptBuf::from_bytes(vec![0x6a, 0x01, 0x00]),
            },
        ],
    }
}

/// Hex encoding and id of a decodable transaction.
pub fn signed_transaction_hex() -> (String, String) {
    let tx = relay_transaction(&[u32::MAX]);
    (serialize_hex(&tx), tx.compute_txid().to_string())
}

/// Hex encoding and id of a version 3, type 1 (provider registration)
/// transaction carrying the two-byte extra payload `01 00`.
pub fn special_transaction_hex() -> (String, String) {
    let mut tx = relay_transaction(&[u32::MAX]);
    tx.version = Version((1 << 16) | 3);
    let mut bytes = serialize(&tx);
    bytes.extend_from_slice(&[0x02, 0x01, 0x00]);
    let txid = Txid::from_raw_hash(sha256d::Hash::hash(&bytes));
    (hex::encode(bytes), txid.to_string())
}
