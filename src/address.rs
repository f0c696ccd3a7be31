//! Address type lookup and script-to-address derivation.
//!
//! Both live behind [`AddressCodec`] so the transformers never depend on the
//! encoding rules of a particular chain.

use bitcoin::base58;
use bitcoin::Script;
use serde::Serialize;

use crate::network::NetworkParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    PubkeyHash,
    ScriptHash,
}

pub trait AddressCodec: Send + Sync {
    /// Semantic type of an encoded address, or `None` if it cannot be decoded.
    fn address_type(&self, address: &str) -> Option<AddressType>;

    /// Address an output script pays to, if it has one.
    fn script_to_address(&self, script: &Script) -> Option<String>;
}

/// Base58check codec for Dash-style pay-to-pubkey-hash and pay-to-script-hash
/// addresses.
#[derive(Debug, Clone)]
pub struct Base58Codec {
    params: NetworkParams,
}

impl Base58Codec {
    pub fn new(params: NetworkParams) -> Self {
        Self { params }
    }

    pub fn encode(&self, address_type: AddressType, hash: &[u8; 20]) -> String {
        let prefix = match address_type {
            AddressType::PubkeyHash => self.params.p2pkh_prefix,
            AddressType::ScriptHash => self.params.p2sh_prefix,
        };
        let mut payload = Vec::with_capacity(21);
        payload.push(prefix);
        payload.extend_from_slice(hash);
        base58::encode_check(&payload)
    }
}

impl AddressCodec for Base58Codec {
    // The network is inferred from the version byte, so an address from either
    // network is typed regardless of which one this codec encodes for.
    fn address_type(&self, address: &str) -> Option<AddressType> {
        let payload = base58::decode_check(address).ok()?;
        if payload.len() != 21 {
            return None;
        }
        [NetworkParams::MAINNET, NetworkParams::TESTNET]
            .iter()
            .find_map(|params| match payload[0] {
                v if v == params.p2pkh_prefix => Some(AddressType::PubkeyHash),
                v if v == params.p2sh_prefix => Some(AddressType::ScriptHash),
                _ => None,
            })
    }

    fn script_to_address(&self, script: &Script) -> Option<String> {
        let bytes = script.as_bytes();
        let (address_type, hash) = if script.is_p2pkh() {
            (AddressType::PubkeyHash, to_hash(&bytes[3..23])?)
        } else if script.is_p2sh() {
            (AddressType::ScriptHash, to_hash(&bytes[2..22])?)
        } else {
            return None;
        };
        Some(self.encode(address_type, &hash))
    }
}

fn to_hash(bytes: &[u8]) -> Option<[u8; 20]> {
    bytes.try_into().ok()
}
