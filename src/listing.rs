//! Paginated transaction listings by block or by address.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;

use crate::error::{ExplorerError, Result};
use crate::model::RawTransaction;
use crate::source::{ChainDataSource, HistoryRange};
use crate::transform::{TransformOptions, TxTransformer};
use crate::view::{ListingView, TransactionView};

pub const DEFAULT_PAGE_LENGTH: usize = 10;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Block(String),
    Address(String),
}

impl Selector {
    /// Picks the listing target from request parameters. A block hash wins
    /// over an address; empty values count as absent.
    pub fn from_query(block: Option<&str>, address: Option<&str>) -> Result<Self> {
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
        if let Some(hash) = non_empty(block) {
            Ok(Selector::Block(hash))
        } else if let Some(address) = non_empty(address) {
            Ok(Selector::Address(address))
        } else {
            Err(ExplorerError::validation("Block hash or address expected"))
        }
    }
}

pub struct ListingService {
    source: Arc<dyn ChainDataSource>,
    transformer: Arc<TxTransformer>,
    fetch_concurrency: usize,
}

impl ListingService {
    pub fn new(source: Arc<dyn ChainDataSource>, transformer: Arc<TxTransformer>) -> Self {
        Self {
            source,
            transformer,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Bounds the number of in-flight transaction fetches for block listings.
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    pub async fn list(
        &self,
        selector: &Selector,
        page: usize,
        page_length: usize,
        options: &TransformOptions,
    ) -> Result<ListingView> {
        let page_length = page_length.max(1);
        match selector {
            Selector::Block(hash) => self.list_block(hash, page, page_length, options).await,
            Selector::Address(address) => {
                self.list_address(address, page, page_length, options).await
            }
        }
    }

    async fn list_block(
        &self,
        hash: &str,
        page: usize,
        page_length: usize,
        options: &TransformOptions,
    ) -> Result<ListingView> {
        let overview = self
            .source
            .get_block_overview(hash)
            .await
            .map_err(ExplorerError::lookup)?;

        let total = overview.txids.len();
        let start = page.saturating_mul(page_length).min(total);
        let end = start.saturating_add(page_length).min(total);
        debug!(
            "Listing block {} page {}: transactions {}..{} of {}",
            hash, page, start, end, total
        );

        let height = self.source.best_height();
        let txs: Vec<TransactionView> = stream::iter(&overview.txids[start..end])
            .map(|txid| async move {
                let tx = self
                    .source
                    .get_detailed_transaction(txid)
                    .await
                    .map_err(ExplorerError::from)?;
                self.transformer.transform_transaction(&tx, options, height)
            })
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        Ok(ListingView {
            pages_total: total.div_ceil(page_length),
            txs,
        })
    }

    async fn list_address(
        &self,
        address: &str,
        page: usize,
        page_length: usize,
        options: &TransformOptions,
    ) -> Result<ListingView> {
        let from = page.saturating_mul(page_length);
        let range = HistoryRange {
            from,
            to: from.saturating_add(page_length),
        };
        let history = self.source.get_address_history(address, range).await?;
        debug!(
            "Listing address {} page {}: {} items of {}",
            address,
            page,
            history.items.len(),
            history.total_count
        );

        let mut seen = HashSet::new();
        let unique: Vec<RawTransaction> = history
            .items
            .into_iter()
            .map(|item| item.tx)
            .filter(|tx| seen.insert(tx.hash.clone()))
            .collect();

        let height = self.source.best_height();
        let txs = unique
            .iter()
            .map(|tx| self.transformer.transform_transaction(tx, options, height))
            .collect::<Result<Vec<TransactionView>>>()?;

        Ok(ListingView {
            pages_total: history.total_count.div_ceil(page_length),
            txs,
        })
    }
}
