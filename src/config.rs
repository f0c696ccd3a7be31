//! Command line and environment configuration.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::listing::DEFAULT_FETCH_CONCURRENCY;
use crate::network::Network;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Insight-compatible transaction API", long_about = None)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    #[arg(long, env = "API_PREFIX", default_value = "/insight-api")]
    pub api_prefix: String,

    #[arg(
        long,
        env = "CORS",
        help = "CORS allowed origins (e.g., '*' for all origins, or a comma separated list)"
    )]
    pub cors: Option<String>,

    #[arg(long, env = "NETWORK", value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    #[arg(long, env = "SNAPSHOT", help = "JSON chain snapshot served by the API")]
    pub snapshot: Option<PathBuf>,

    #[arg(
        long,
        env = "BLOCK_FETCH_CONCURRENCY",
        help = "Transactions fetched concurrently when listing a block",
        default_value_t = DEFAULT_FETCH_CONCURRENCY
    )]
    pub block_fetch_concurrency: usize,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.block_fetch_concurrency == 0 {
            bail!("block fetch concurrency must be at least 1");
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            bail!("API prefix must start with '/': {}", self.api_prefix);
        }
        if self.api_prefix.len() > 1 && self.api_prefix.ends_with('/') {
            bail!("API prefix must not end with '/': {}", self.api_prefix);
        }
        if let Some(path) = &self.snapshot {
            if !path.is_file() {
                bail!("snapshot file not found: {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("insight-txs").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.api_prefix, "/insight-api");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.block_fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(parse(&["--block-fetch-concurrency", "0"]).validate().is_err());
        assert!(parse(&["--api-prefix", "api"]).validate().is_err());
        assert!(parse(&["--api-prefix", "/api/"]).validate().is_err());
        assert!(parse(&["--snapshot", "/nonexistent/snapshot.json"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_network_flag() {
        assert_eq!(parse(&["--network", "testnet"]).network, Network::Testnet);
    }
}
