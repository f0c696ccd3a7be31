//! Insight-style transaction API for Dash explorers.
//!
//! Raw transaction records from a [`source::ChainDataSource`] are turned into
//! the JSON views served by the explorer endpoints. Listings page through the
//! transactions of a block or an address.

pub mod address;
pub mod config;
pub mod consensus;
pub mod controller;
pub mod error;
pub mod inv;
pub mod listing;
pub mod model;
pub mod network;
pub mod server;
pub mod source;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod transform;
pub mod units;
pub mod view;

pub use address::{AddressCodec, AddressType, Base58Codec};
pub use error::ExplorerError;
pub use listing::{ListingService, Selector};
pub use source::{ChainDataSource, ChainError, MemoryChainSource};
pub use transform::{TransformOptions, TxTransformer};
