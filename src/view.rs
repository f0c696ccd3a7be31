//! Consumer-facing response shapes.
//!
//! Optional fields are skipped when absent. The few fields that are always
//! present, even when `null`, are plain `Option`s without a skip attribute.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::address::AddressType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub txid: String,
    pub version: i32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<u16>,
    pub locktime: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payload_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payload: Option<String>,
    pub vin: Vec<VinEntry>,
    pub vout: Vec<OutputView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    pub blockheight: i64,
    pub confirmations: i64,
    pub time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocktime: Option<u64>,
    #[serde(rename = "isCoinBase", skip_serializing_if = "std::ops::Not::not")]
    pub is_coinbase: bool,
    pub value_out: f64,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_in: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txlock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_reg_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_up_serv_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_up_reg_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_up_rev_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cb_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qc_tx: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnhf_tx: Option<Value>,
}

/// One `vin` entry: either a regular input or the single synthetic entry of a
/// coinbase transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VinEntry {
    Coinbase(CoinbaseInputView),
    Input(InputView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinbaseInputView {
    /// Coinbase data, hex encoded.
    pub coinbase: String,
    pub sequence: u32,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputView {
    pub txid: String,
    pub vout: u32,
    pub sequence: u32,
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<ScriptSigView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    pub value_sat: u64,
    pub value: f64,
    /// Double-spend detection is not implemented; always `null`.
    #[serde(rename = "doubleSpentTxID")]
    pub double_spent_tx_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptSigView {
    pub hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputView {
    /// Whole coins with exactly eight decimals.
    pub value: String,
    pub n: usize,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyView,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub spent: Option<SpentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptPubKeyView {
    pub hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
}

/// Spend information of an output. Every field is emitted, `null` when the
/// output is unspent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpentView {
    pub spent_tx_id: Option<String>,
    pub spent_index: Option<u32>,
    pub spent_height: Option<u32>,
}

/// Compact summary pushed for transactions seen on the relay network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvView {
    pub txid: String,
    #[serde(rename = "valueOut")]
    pub value_out: f64,
    /// One single-key `{address: duffs}` map per output paying to an address.
    pub vout: Vec<BTreeMap<String, u64>>,
    #[serde(rename = "isRBF")]
    pub is_rbf: bool,
    pub txlock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub pages_total: usize,
    pub txs: Vec<TransactionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTxView {
    pub rawtx: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendResultView {
    pub txid: String,
}
