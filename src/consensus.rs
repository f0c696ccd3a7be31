//! Dash transaction wire format.
//!
//! Special transactions (DIP-2) keep the classic layout but pack a type into
//! the upper 16 bits of the version and append a length-prefixed extra payload
//! after the lock time. `bitcoin::Transaction` knows neither, so decoding goes
//! field by field.

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{self, deserialize_partial, Decodable, VarInt};
use bitcoin::hashes::{sha256d, Hash};
use bitcoin::transaction::Version;
use bitcoin::{Transaction, TxIn, TxOut, Txid};

/// Lowest base version that may carry a special transaction type.
pub const SPECIAL_TX_MIN_VERSION: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashTransaction {
    pub txid: Txid,
    /// Lower 16 bits of the serialized version.
    pub version: u16,
    /// Special transaction type, zero for classic transactions.
    pub tx_type: u16,
    pub input: Vec<TxIn>,
    pub output: Vec<TxOut>,
    pub lock_time: LockTime,
    pub extra_payload: Vec<u8>,
}

impl DashTransaction {
    pub fn decode(bytes: &[u8]) -> Result<Self, encode::Error> {
        let mut pos = 0;
        let raw_version = read::<Version>(bytes, &mut pos)?.0 as u32;
        let version = (raw_version & 0xffff) as u16;
        let tx_type = (raw_version >> 16) as u16;
        let input = read::<Vec<TxIn>>(bytes, &mut pos)?;
        let output = read::<Vec<TxOut>>(bytes, &mut pos)?;
        let lock_time = read::<LockTime>(bytes, &mut pos)?;

        let extra_payload = if version >= SPECIAL_TX_MIN_VERSION && tx_type != 0 {
            let len = read::<VarInt>(bytes, &mut pos)?.0;
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| pos.checked_add(len))
                .filter(|end| *end <= bytes.len())
                .ok_or(encode::Error::ParseFailed("extra payload exceeds transaction"))?;
            let payload = bytes[pos..end].to_vec();
            pos = end;
            payload
        } else {
            Vec::new()
        };

        if pos != bytes.len() {
            return Err(encode::Error::ParseFailed(
                "data not consumed entirely when explicitly deserializing",
            ));
        }

        Ok(Self {
            txid: Txid::from_raw_hash(sha256d::Hash::hash(bytes)),
            version,
            tx_type,
            input,
            output,
            lock_time,
            extra_payload,
        })
    }

    pub fn is_special(&self) -> bool {
        self.tx_type != 0
    }
}

impl From<&Transaction> for DashTransaction {
    fn from(tx: &Transaction) -> Self {
        let raw_version = tx.version.0 as u32;
        Self {
            txid: tx.compute_txid(),
            version: (raw_version & 0xffff) as u16,
            tx_type: (raw_version >> 16) as u16,
            input: tx.input.clone(),
            output: tx.output.clone(),
            lock_time: tx.lock_time,
            extra_payload: Vec::new(),
        }
    }
}

fn read<T: Decodable>(bytes: &[u8], pos: &mut usize) -> Result<T, encode::Error> {
    let (value, consumed) = deserialize_partial::<T>(&bytes[*pos..])?;
    *pos += consumed;
    Ok(value)
}
