//! Chain data source consumed by the controller and listing service.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RawTransaction;

pub use memory::{MemoryChainSource, Snapshot};

/// Daemon error code for an unknown transaction id, block hash or address.
pub const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;

/// Daemon error code for undecodable raw transactions.
pub const RPC_DESERIALIZATION_ERROR: i32 = -22;

/// Error reported by the chain data source, optionally carrying a daemon code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ChainError {
    pub code: Option<i32>,
    pub message: String,
}

impl ChainError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RPC_INVALID_ADDRESS_OR_KEY, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Some(RPC_INVALID_ADDRESS_OR_KEY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOverview {
    /// Transaction ids in block order.
    pub txids: Vec<String>,
}

/// Half-open `[from, to)` window into an address history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRange {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub tx: RawTransaction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressHistory {
    pub items: Vec<HistoryItem>,
    /// Size of the whole history, not just this window.
    pub total_count: usize,
}

/// Relay options for transaction submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    pub max_fee_rate: f64,
    pub is_instant_send: bool,
}

impl SendOptions {
    /// Fee-rate ceiling applied to InstantSend submissions.
    pub const INSTANT_SEND_MAX_FEE_RATE: f64 = 0.00015;

    pub fn instant_send() -> Self {
        Self {
            max_fee_rate: Self::INSTANT_SEND_MAX_FEE_RATE,
            is_instant_send: true,
        }
    }
}

#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Height of the current chain tip.
    fn best_height(&self) -> u32;

    async fn get_detailed_transaction(&self, txid: &str) -> Result<RawTransaction, ChainError>;

    /// Serialized transaction bytes.
    async fn get_transaction(&self, txid: &str) -> Result<Vec<u8>, ChainError>;

    async fn get_block_overview(&self, block_hash: &str) -> Result<BlockOverview, ChainError>;

    async fn get_address_history(
        &self,
        address: &str,
        range: HistoryRange,
    ) -> Result<AddressHistory, ChainError>;

    /// Relays a raw transaction and returns its id.
    async fn send_transaction(
        &self,
        raw_hex: &str,
        options: Option<SendOptions>,
    ) -> Result<String, ChainError>;
}
