//! Raw chain records to consumer-facing transaction views.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::trace;

use crate::address::AddressCodec;
use crate::error::{ExplorerError, Result};
use crate::model::{RawInput, RawOutput, RawTransaction};
use crate::units::{format_coins, to_coins};
use crate::view::{
    CoinbaseInputView, InputView, OutputView, ScriptPubKeyView, ScriptSigView, SpentView,
    TransactionView, VinEntry,
};

/// Fields that callers may drop from the views to shrink responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub no_asm: bool,
    pub no_script_sig: bool,
    pub no_spent: bool,
}

pub struct TxTransformer {
    codec: Arc<dyn AddressCodec>,
}

impl TxTransformer {
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self { codec }
    }

    pub(crate) fn codec(&self) -> &dyn AddressCodec {
        self.codec.as_ref()
    }

    pub fn transform_output(
        &self,
        output: &RawOutput,
        index: usize,
        options: &TransformOptions,
    ) -> OutputView {
        let mut script_pub_key = ScriptPubKeyView {
            hex: output.script.clone(),
            asm: None,
            addresses: None,
            address_type: None,
        };
        if !options.no_asm {
            script_pub_key.asm = output.script_asm.clone();
        }
        if let Some(address) = &output.address {
            if let Some(address_type) = self.codec.address_type(address) {
                script_pub_key.addresses = Some(vec![address.clone()]);
                script_pub_key.address_type = Some(address_type);
            }
        }

        let spent = (!options.no_spent).then(|| SpentView {
            spent_tx_id: output.spent_tx_id.clone().filter(|id| !id.is_empty()),
            spent_index: output.spent_index,
            spent_height: output.spent_height.filter(|height| *height != 0),
        });

        OutputView {
            value: format_coins(output.satoshis),
            n: index,
            script_pub_key,
            spent,
        }
    }

    /// Input scripts come from validated transactions, so they are passed
    /// through unchecked.
    pub fn transform_input(
        &self,
        input: &RawInput,
        index: usize,
        options: &TransformOptions,
    ) -> Result<InputView> {
        let value_sat = input.satoshis.ok_or_else(|| {
            ExplorerError::Structural(format!(
                "input {} spending {}:{} has no value",
                index, input.prev_tx_id, input.output_index
            ))
        })?;

        let script_sig = (!options.no_script_sig).then(|| ScriptSigView {
            hex: input.script.clone(),
            asm: if options.no_asm {
                None
            } else {
                input.script_asm.clone()
            },
        });

        Ok(InputView {
            txid: input.prev_tx_id.clone(),
            vout: input.output_index,
            sequence: input.sequence,
            n: index,
            script_sig,
            addr: input.address.clone(),
            value_sat,
            value: to_coins(value_sat),
            double_spent_tx_id: None,
        })
    }

    /// Builds the full view of `tx` as seen with the chain tip at
    /// `current_height`. Unconfirmed transactions are stamped with the current
    /// wall-clock time.
    pub fn transform_transaction(
        &self,
        tx: &RawTransaction,
        options: &TransformOptions,
        current_height: u32,
    ) -> Result<TransactionView> {
        self.transform_transaction_at(tx, options, current_height, unix_now())
    }

    pub fn transform_transaction_at(
        &self,
        tx: &RawTransaction,
        options: &TransformOptions,
        current_height: u32,
        now: u64,
    ) -> Result<TransactionView> {
        trace!("Transforming transaction {:?}", tx);

        let confirmations = if tx.is_confirmed() {
            i64::from(current_height) - tx.height + 1
        } else {
            0
        };

        let vin = if tx.coinbase {
            let input = tx.inputs.first().ok_or_else(|| {
                ExplorerError::Structural(format!("coinbase transaction {} has no inputs", tx.hash))
            })?;
            vec![VinEntry::Coinbase(CoinbaseInputView {
                coinbase: input.script.clone(),
                sequence: input.sequence,
                n: 0,
            })]
        } else {
            tx.inputs
                .iter()
                .enumerate()
                .map(|(index, input)| {
                    self.transform_input(input, index, options)
                        .map(VinEntry::Input)
                })
                .collect::<Result<Vec<_>>>()?
        };

        let vout = tx
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| self.transform_output(output, index, options))
            .collect();

        let time = tx.block_timestamp.filter(|t| *t != 0).unwrap_or(now);

        let (value_in, fees) = if tx.coinbase {
            (None, None)
        } else {
            let input_satoshis = tx.input_satoshis.ok_or_else(|| {
                ExplorerError::Structural(format!("transaction {} has no input total", tx.hash))
            })?;
            let fee_satoshis = tx.fee_satoshis.ok_or_else(|| {
                ExplorerError::Structural(format!("transaction {} has no fee", tx.hash))
            })?;
            (Some(to_coins(input_satoshis)), Some(to_coins(fee_satoshis)))
        };

        let payloads = tx.payloads.clone();
        Ok(TransactionView {
            txid: tx.hash.clone(),
            version: tx.version,
            tx_type: tx.tx_type.filter(|t| *t != 0),
            locktime: tx.locktime,
            extra_payload_size: tx.extra_payload_size.filter(|size| *size != 0),
            extra_payload: tx.extra_payload.clone().filter(|payload| !payload.is_empty()),
            vin,
            vout,
            blockhash: tx.block_hash.clone(),
            blockheight: tx.height,
            confirmations,
            time,
            blocktime: (confirmations > 0).then_some(time),
            is_coinbase: tx.coinbase,
            value_out: to_coins(tx.output_satoshis),
            size: tx.hex.len() / 2,
            value_in,
            fees,
            txlock: tx.txlock,
            pro_reg_tx: payloads.pro_reg_tx,
            pro_up_serv_tx: payloads.pro_up_serv_tx,
            pro_up_reg_tx: payloads.pro_up_reg_tx,
            pro_up_rev_tx: payloads.pro_up_rev_tx,
            cb_tx: payloads.cb_tx,
            qc_tx: payloads.qc_tx,
            mnhf_tx: payloads.mnhf_tx,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressType;
    use crate::testing::{coinbase_transaction, sample_transaction, transformer, ADDRESS};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_output_value_has_eight_decimals() {
        let tx = sample_transaction("a1");
        let view = transformer().transform_output(&tx.outputs[0], 0, &TransformOptions::default());
        assert_eq!(view.value, "1.50000000");
    }

    #[test]
    fn test_output_with_resolvable_address() {
        let tx = sample_transaction("a1");
        let view = transformer().transform_output(&tx.outputs[0], 3, &TransformOptions::default());

        assert_eq!(view.n, 3);
        assert_eq!(view.script_pub_key.addresses, Some(vec![ADDRESS.to_string()]));
        assert_eq!(view.script_pub_key.address_type, Some(AddressType::PubkeyHash));
        assert_eq!(
            view.script_pub_key.asm.as_deref(),
            tx.outputs[0].script_asm.as_deref()
        );
    }

    #[test]
    fn test_output_with_unresolvable_address_omits_both_fields() {
        let mut tx = sample_transaction("a1");
        tx.outputs[0].address = Some("garbage".to_string());
        let view = transformer().transform_output(&tx.outputs[0], 0, &TransformOptions::default());

        assert_eq!(view.script_pub_key.addresses, None);
        assert_eq!(view.script_pub_key.address_type, None);
    }

    #[test]
    fn test_output_spent_fields() {
        let mut tx = sample_transaction("a1");
        let options = TransformOptions::default();

        let unspent = transformer().transform_output(&tx.outputs[0], 0, &options);
        assert_eq!(unspent.spent, Some(SpentView::default()));

        tx.outputs[0].spent_tx_id = Some("b2".to_string());
        tx.outputs[0].spent_index = Some(0);
        tx.outputs[0].spent_height = Some(120);
        let spent = transformer().transform_output(&tx.outputs[0], 0, &options);
        assert_eq!(
            spent.spent,
            Some(SpentView {
                spent_tx_id: Some("b2".to_string()),
                spent_index: Some(0),
                spent_height: Some(120),
            })
        );

        let options = TransformOptions {
            no_spent: true,
            no_asm: true,
            ..Default::default()
        };
        let suppressed = transformer().transform_output(&tx.outputs[0], 0, &options);
        assert_eq!(suppressed.spent, None);
        assert_eq!(suppressed.script_pub_key.asm, None);
    }

    #[test]
    fn test_input_view() {
        let tx = sample_transaction("a1");
        let view = transformer()
            .transform_input(&tx.inputs[0], 0, &TransformOptions::default())
            .unwrap();

        assert_eq!(view.txid, tx.inputs[0].prev_tx_id);
        assert_eq!(view.vout, tx.inputs[0].output_index);
        assert_eq!(view.value_sat, 200_000_000);
        assert_eq!(view.value, 2.0);
        assert_eq!(view.double_spent_tx_id, None);
        assert_eq!(
            view.script_sig,
            Some(ScriptSigView {
                hex: tx.inputs[0].script.clone(),
                asm: tx.inputs[0].script_asm.clone(),
            })
        );

        let serialized = serde_json::to_value(&view).unwrap();
        assert_eq!(serialized["doubleSpentTxID"], json!(null));
    }

    #[test]
    fn test_input_script_sig_options() {
        let tx = sample_transaction("a1");
        let t = transformer();

        let no_asm = TransformOptions {
            no_asm: true,
            ..Default::default()
        };
        let view = t.transform_input(&tx.inputs[0], 0, &no_asm).unwrap();
        assert_eq!(view.script_sig.unwrap().asm, None);

        let no_script_sig = TransformOptions {
            no_script_sig: true,
            ..Default::default()
        };
        let view = t.transform_input(&tx.inputs[0], 0, &no_script_sig).unwrap();
        assert_eq!(view.script_sig, None);
    }

    #[test]
    fn test_confirmed_transaction() {
        let tx = sample_transaction("a1");
        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 110, NOW)
            .unwrap();

        assert_eq!(view.confirmations, 11);
        assert_eq!(view.blockheight, 100);
        assert_eq!(view.time, 1_500_000_000);
        assert_eq!(view.blocktime, Some(1_500_000_000));
        assert_eq!(view.value_out, 1.5);
        assert_eq!(view.value_in, Some(2.0));
        assert_eq!(view.fees, Some(0.5));
        assert_eq!(view.size, tx.hex.len() / 2);
        assert!(!view.is_coinbase);

        assert_eq!(view.vin.len(), tx.inputs.len());
        for (index, entry) in view.vin.iter().enumerate() {
            match entry {
                VinEntry::Input(input) => assert_eq!(input.n, index),
                VinEntry::Coinbase(_) => panic!("unexpected coinbase entry"),
            }
        }
    }

    #[test]
    fn test_unconfirmed_transaction_uses_wall_clock() {
        let mut tx = sample_transaction("a1");
        tx.height = -1;
        tx.block_hash = None;
        tx.block_timestamp = None;

        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 110, NOW)
            .unwrap();
        assert_eq!(view.confirmations, 0);
        assert_eq!(view.time, NOW);
        assert_eq!(view.blocktime, None);

        let serialized = serde_json::to_value(&view).unwrap();
        assert!(serialized.get("blocktime").is_none());
        assert!(serialized.get("blockhash").is_none());
        assert_eq!(serialized["blockheight"], json!(-1));
    }

    #[test]
    fn test_coinbase_transaction() {
        let tx = coinbase_transaction("cb");
        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 100, NOW)
            .unwrap();

        assert_eq!(
            view.vin,
            vec![VinEntry::Coinbase(CoinbaseInputView {
                coinbase: tx.inputs[0].script.clone(),
                sequence: tx.inputs[0].sequence,
                n: 0,
            })]
        );
        assert!(view.is_coinbase);
        assert_eq!(view.value_in, None);
        assert_eq!(view.fees, None);

        let serialized = serde_json::to_value(&view).unwrap();
        assert_eq!(serialized["isCoinBase"], json!(true));
        assert!(serialized.get("valueIn").is_none());
        assert!(serialized.get("fees").is_none());
    }

    #[test]
    fn test_coinbase_without_inputs_is_structural_error() {
        let mut tx = coinbase_transaction("cb");
        tx.inputs.clear();
        let err = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 100, NOW)
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Structural(_)));
    }

    #[test]
    fn test_non_coinbase_without_fee_is_structural_error() {
        let mut tx = sample_transaction("a1");
        tx.fee_satoshis = None;
        let err = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 100, NOW)
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Structural(_)));
    }

    #[test]
    fn test_sparse_fields_are_omitted() {
        let tx = sample_transaction("a1");
        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 110, NOW)
            .unwrap();
        let serialized = serde_json::to_value(&view).unwrap();

        for field in [
            "type",
            "extraPayloadSize",
            "extraPayload",
            "isCoinBase",
            "txlock",
            "proRegTx",
            "cbTx",
            "mnhfTx",
        ] {
            assert!(serialized.get(field).is_none(), "{} should be omitted", field);
        }
    }

    #[test]
    fn test_special_payloads_copied_verbatim() {
        let mut tx = coinbase_transaction("cb");
        tx.tx_type = Some(5);
        tx.extra_payload_size = Some(70);
        tx.extra_payload = Some("0200".to_string());
        tx.txlock = Some(false);
        tx.payloads.cb_tx = Some(json!({ "version": 2, "height": 100, "merkleRootMNList": "ab" }));
        tx.payloads.qc_tx = Some(json!({ "version": 1 }));

        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 100, NOW)
            .unwrap();
        let serialized = serde_json::to_value(&view).unwrap();

        assert_eq!(serialized["type"], json!(5));
        assert_eq!(serialized["extraPayloadSize"], json!(70));
        assert_eq!(serialized["extraPayload"], json!("0200"));
        assert_eq!(serialized["txlock"], json!(false));
        assert_eq!(
            serialized["cbTx"],
            json!({ "version": 2, "height": 100, "merkleRootMNList": "ab" })
        );
        assert_eq!(serialized["qcTx"], json!({ "version": 1 }));
        assert!(serialized.get("proRegTx").is_none());
    }

    #[test]
    fn test_zero_type_counts_as_absent() {
        let mut tx = sample_transaction("a1");
        tx.tx_type = Some(0);
        tx.extra_payload_size = Some(0);
        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 110, NOW)
            .unwrap();
        assert_eq!(view.tx_type, None);
        assert_eq!(view.extra_payload_size, None);
    }

    #[test]
    fn test_json_field_order() {
        let tx = sample_transaction("a1");
        let view = transformer()
            .transform_transaction_at(&tx, &TransformOptions::default(), 110, NOW)
            .unwrap();
        let text = serde_json::to_string(&view).unwrap();

        let positions: Vec<usize> = [
            "\"txid\"",
            "\"version\"",
            "\"locktime\"",
            "\"vin\"",
            "\"vout\"",
            "\"blockhash\"",
            "\"blockheight\"",
            "\"confirmations\"",
            "\"time\"",
            "\"valueOut\"",
            "\"size\"",
            "\"valueIn\"",
            "\"fees\"",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }
}
