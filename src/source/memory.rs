//! In-memory chain data source backed by a JSON snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    AddressHistory, BlockOverview, ChainDataSource, ChainError, HistoryItem, HistoryRange,
    SendOptions, RPC_DESERIALIZATION_ERROR,
};
use crate::consensus::DashTransaction;
use crate::model::RawTransaction;

/// On-disk snapshot layout.
///
/// ```json
/// {
///   "height": 1000,
///   "transactions": [ { "hash": "...", ... } ],
///   "blocks": { "<hash>": { "txids": ["..."] } },
///   "addresses": { "<address>": ["<txid>", ...] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub height: u32,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub blocks: HashMap<String, BlockOverview>,
    /// Address history as transaction ids, newest first. An id may repeat when
    /// the address appears on both sides of a transaction.
    #[serde(default)]
    pub addresses: HashMap<String, Vec<String>>,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct MemoryChainSource {
    height: AtomicU32,
    transactions: HashMap<String, RawTransaction>,
    blocks: HashMap<String, BlockOverview>,
    addresses: HashMap<String, Vec<String>>,
    failures: HashMap<String, ChainError>,
    delays: HashMap<String, Duration>,
    broadcasted: Mutex<Vec<(String, Option<SendOptions>)>>,
    calls: AtomicUsize,
}

impl MemoryChainSource {
    pub fn new(height: u32) -> Self {
        Self {
            height: AtomicU32::new(height),
            ..Default::default()
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut source = Self::new(snapshot.height);
        source.transactions = snapshot
            .transactions
            .into_iter()
            .map(|tx| (tx.hash.clone(), tx))
            .collect();
        source.blocks = snapshot.blocks;
        source.addresses = snapshot.addresses;
        source
    }

    pub fn from_snapshot_file(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Loaded snapshot {}: height {}, {} transactions, {} blocks, {} addresses",
            path.display(),
            snapshot.height,
            snapshot.transactions.len(),
            snapshot.blocks.len(),
            snapshot.addresses.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn with_transaction(mut self, tx: RawTransaction) -> Self {
        self.transactions.insert(tx.hash.clone(), tx);
        self
    }

    pub fn with_block(mut self, hash: &str, txids: &[&str]) -> Self {
        self.blocks.insert(
            hash.to_string(),
            BlockOverview {
                txids: txids.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_address_history(mut self, address: &str, txids: &[&str]) -> Self {
        self.addresses.insert(
            address.to_string(),
            txids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Makes every lookup of `txid` fail with `error`.
    pub fn with_failure(mut self, txid: &str, error: ChainError) -> Self {
        self.failures.insert(txid.to_string(), error);
        self
    }

    /// Holds every detailed lookup of `txid` back for `delay`.
    pub fn with_delay(mut self, txid: &str, delay: Duration) -> Self {
        self.delays.insert(txid.to_string(), delay);
        self
    }

    pub fn set_height(&self, height: u32) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Number of data-source calls served so far, `best_height` excluded.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transactions relayed through `send_transaction`, oldest first.
    pub fn broadcasted(&self) -> Vec<(String, Option<SendOptions>)> {
        self.broadcasted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lookup(&self, txid: &str) -> Result<&RawTransaction, ChainError> {
        if let Some(error) = self.failures.get(txid) {
            return Err(error.clone());
        }
        self.transactions.get(txid).ok_or_else(|| {
            ChainError::not_found("No information available about transaction")
        })
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainDataSource for MemoryChainSource {
    fn best_height(&self) -> u32 {
        self.height.load(Ordering::SeqCst)
    }

    async fn get_detailed_transaction(&self, txid: &str) -> Result<RawTransaction, ChainError> {
        self.record_call();
        if let Some(delay) = self.delays.get(txid) {
            tokio::time::sleep(*delay).await;
        }
        self.lookup(txid).cloned()
    }

    async fn get_transaction(&self, txid: &str) -> Result<Vec<u8>, ChainError> {
        self.record_call();
        let tx = self.lookup(txid)?;
        hex::decode(&tx.hex)
            .map_err(|e| ChainError::other(format!("Stored transaction {} is not hex: {}", txid, e)))
    }

    async fn get_block_overview(&self, block_hash: &str) -> Result<BlockOverview, ChainError> {
        self.record_call();
        self.blocks
            .get(block_hash)
            .cloned()
            .ok_or_else(|| ChainError::not_found("Block not found"))
    }

    async fn get_address_history(
        &self,
        address: &str,
        range: HistoryRange,
    ) -> Result<AddressHistory, ChainError> {
        self.record_call();
        let Some(txids) = self.addresses.get(address) else {
            return Ok(AddressHistory::default());
        };

        let start = range.from.min(txids.len());
        let end = range.to.clamp(start, txids.len());
        let items = txids[start..end]
            .iter()
            .map(|txid| {
                self.lookup(txid).map(|tx| HistoryItem { tx: tx.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AddressHistory {
            items,
            total_count: txids.len(),
        })
    }

    async fn send_transaction(
        &self,
        raw_hex: &str,
        options: Option<SendOptions>,
    ) -> Result<String, ChainError> {
        self.record_call();
        let tx = hex::decode(raw_hex)
            .ok()
            .and_then(|bytes| DashTransaction::decode(&bytes).ok())
            .ok_or_else(|| ChainError::new(RPC_DESERIALIZATION_ERROR, "TX decode failed"))?;

        let txid = tx.txid.to_string();
        debug!("Relaying transaction {} ({:?})", txid, options);
        self.broadcasted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((txid.clone(), options));
        Ok(txid)
    }
}
