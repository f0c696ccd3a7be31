//! Raw records as produced by the chain data service.
//!
//! Field names follow the service's camelCase JSON. Required fields are plain
//! types so a record missing them fails to deserialize instead of being
//! silently defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully detailed transaction, with resolved input values and spend info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub hash: String,
    pub version: i32,
    pub locktime: u32,
    pub inputs: Vec<RawInput>,
    pub outputs: Vec<RawOutput>,
    /// Negative while the transaction is only in the mempool.
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_timestamp: Option<u64>,
    /// Serialized transaction, hex encoded.
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_satoshis: Option<u64>,
    pub output_satoshis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_satoshis: Option<u64>,
    #[serde(default)]
    pub coinbase: bool,
    /// Special transaction type (DIP-2). Zero for classic transactions.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payload_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txlock: Option<bool>,
    #[serde(flatten)]
    pub payloads: SpecialPayloads,
}

/// Decoded special transaction payloads, keyed by subtype.
///
/// The contents are opaque here; they are copied into the view untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPayloads {
    /// Provider registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_reg_tx: Option<Value>,
    /// Provider service update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_up_serv_tx: Option<Value>,
    /// Provider registrar (key) update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_up_reg_tx: Option<Value>,
    /// Provider revocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_up_rev_tx: Option<Value>,
    /// Coinbase commitment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cb_tx: Option<Value>,
    /// Quorum commitment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qc_tx: Option<Value>,
    /// Masternode hard-fork signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnhf_tx: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    pub prev_tx_id: String,
    pub output_index: u32,
    pub sequence: u32,
    /// scriptSig, hex encoded. For a coinbase input this is the coinbase data.
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_asm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Value of the spent output. Absent on coinbase inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satoshis: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutput {
    pub satoshis: u64,
    /// scriptPubKey, hex encoded.
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_asm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_height: Option<u32>,
}

impl RawTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.height >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_service_record() {
        let raw = json!({
            "hash": "aa",
            "version": 3,
            "locktime": 0,
            "inputs": [{
                "prevTxId": "bb",
                "outputIndex": 1,
                "sequence": 4294967295u32,
                "script": "00",
                "scriptAsm": "OP_0",
                "address": "Xaddr",
                "satoshis": 1000
            }],
            "outputs": [{ "satoshis": 900, "script": "51" }],
            "height": 10,
            "blockHash": "cc",
            "blockTimestamp": 1500000000u64,
            "hex": "0011",
            "inputSatoshis": 1000,
            "outputSatoshis": 900,
            "feeSatoshis": 100,
            "type": 1,
            "cbTx": { "height": 10 }
        });

        let tx: RawTransaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.inputs[0].prev_tx_id, "bb");
        assert_eq!(tx.inputs[0].satoshis, Some(1000));
        assert_eq!(tx.outputs[0].spent_index, None);
        assert_eq!(tx.tx_type, Some(1));
        assert_eq!(tx.payloads.cb_tx, Some(json!({ "height": 10 })));
        assert!(tx.payloads.pro_reg_tx.is_none());
        assert!(!tx.coinbase);
        assert!(tx.is_confirmed());
    }

    #[test]
    fn test_missing_outputs_is_rejected() {
        let raw = json!({
            "hash": "aa",
            "version": 1,
            "locktime": 0,
            "inputs": [],
            "height": -1,
            "hex": "",
            "outputSatoshis": 0
        });

        let err = serde_json::from_value::<RawTransaction>(raw).unwrap_err();
        assert!(err.to_string().contains("outputs"));
    }
}
