//! Summaries of transactions announced on the relay network.

use std::collections::BTreeMap;

use bitcoin::consensus::encode;
use bitcoin::{ScriptBuf, Transaction};
use thiserror::Error;

use crate::address::AddressCodec;
use crate::consensus::DashTransaction;
use crate::transform::TxTransformer;
use crate::units::to_coins;
use crate::view::InvView;

#[derive(Error, Debug)]
pub enum InvDecodeError {
    #[error("transaction is not hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("transaction decode failed: {0}")]
    Decode(#[from] encode::Error),
}

/// Inputs with a sequence below this signal replace-by-fee.
pub const RBF_THRESHOLD: u32 = 0xffff_ffff - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvOutput {
    pub satoshis: u64,
    pub script: ScriptBuf,
}

/// The parts of an unconfirmed transaction its summary is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvTransaction {
    pub txid: String,
    /// Input sequence numbers, in input order.
    pub sequences: Vec<u32>,
    pub outputs: Vec<InvOutput>,
}

impl InvTransaction {
    /// Decodes classic and special (DIP-2) transactions alike.
    pub fn from_hex(raw: &str) -> Result<Self, InvDecodeError> {
        let tx = DashTransaction::decode(&hex::decode(raw)?)?;
        Ok(Self::from(&tx))
    }

    pub fn is_rbf(&self) -> bool {
        self.sequences.iter().any(|sequence| *sequence < RBF_THRESHOLD)
    }

    pub fn value_out(&self) -> u64 {
        self.outputs.iter().map(|output| output.satoshis).sum()
    }
}

impl From<&Transaction> for InvTransaction {
    fn from(tx: &Transaction) -> Self {
        Self::from(&DashTransaction::from(tx))
    }
}

impl From<&DashTransaction> for InvTransaction {
    fn from(tx: &DashTransaction) -> Self {
        Self {
            txid: tx.txid.to_string(),
            sequences: tx.input.iter().map(|input| input.sequence.0).collect(),
            outputs: tx
                .output
                .iter()
                .map(|output| InvOutput {
                    satoshis: output.value.to_sat(),
                    script: output.script_pubkey.clone(),
                })
                .collect(),
        }
    }
}

impl TxTransformer {
    pub fn summarize_inv(&self, tx: &InvTransaction, is_locked: bool) -> InvView {
        let vout = tx
            .outputs
            .iter()
            .filter_map(|output| {
                self.codec()
                    .script_to_address(&output.script)
                    .map(|address| BTreeMap::from([(address, output.satoshis)]))
            })
            .collect();

        InvView {
            txid: tx.txid.clone(),
            value_out: to_coins(tx.value_out()),
            vout,
            is_rbf: tx.is_rbf(),
            txlock: is_locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        relay_transaction, signed_transaction_hex, special_transaction_hex, transformer, ADDRESS,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_summary_of_final_transaction() {
        let tx = relay_transaction(&[u32::MAX]);
        let inv = InvTransaction::from(&tx);
        let view = transformer().summarize_inv(&inv, true);

        assert_eq!(view.txid, tx.compute_txid().to_string());
        assert_eq!(view.value_out, 0.0015);
        assert_eq!(view.vout, vec![BTreeMap::from([(ADDRESS.to_string(), 120_000)])]);
        assert!(!view.is_rbf);
        assert!(view.txlock);
    }

    #[test]
    fn test_rbf_threshold() {
        let t = transformer();
        let at_threshold = InvTransaction::from(&relay_transaction(&[u32::MAX, RBF_THRESHOLD]));
        assert!(!t.summarize_inv(&at_threshold, false).is_rbf);

        let below = InvTransaction::from(&relay_transaction(&[u32::MAX, RBF_THRESHOLD - 1]));
        assert!(t.summarize_inv(&below, false).is_rbf);
    }

    #[test]
    fn test_from_hex() {
        let (raw, txid) = signed_transaction_hex();
        let inv = InvTransaction::from_hex(&raw).unwrap();
        assert_eq!(inv.txid, txid);
        assert_eq!(inv.sequences, vec![u32::MAX]);
        assert_eq!(inv.outputs.len(), 2);

        assert!(InvTransaction::from_hex("not hex").is_err());
    }

    #[test]
    fn test_from_hex_special_transaction() {
        let (raw, txid) = special_transaction_hex();
        let inv = InvTransaction::from_hex(&raw).unwrap();
        assert_eq!(inv.txid, txid);

        let view = transformer().summarize_inv(&inv, false);
        assert_eq!(view.value_out, 0.0015);
        assert_eq!(view.vout, vec![BTreeMap::from([(ADDRESS.to_string(), 120_000)])]);
        assert!(!view.is_rbf);
    }

    #[test]
    fn test_serialized_shape() {
        let inv = InvTransaction::from(&relay_transaction(&[0]));
        let value = serde_json::to_value(transformer().summarize_inv(&inv, false)).unwrap();
        assert_eq!(
            value,
            json!({
                "txid": inv.txid,
                "valueOut": 0.0015,
                "vout": [{ (ADDRESS): 120_000 }],
                "isRBF": true,
                "txlock": false
            })
        );
    }
}
