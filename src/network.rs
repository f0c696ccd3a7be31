//! Supported networks and their address version bytes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
    Regtest,
}

/// Base58 version bytes used by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub p2pkh_prefix: u8,
    pub p2sh_prefix: u8,
}

impl NetworkParams {
    pub const MAINNET: NetworkParams = NetworkParams {
        p2pkh_prefix: 0x4c,
        p2sh_prefix: 0x10,
    };

    /// Shared by testnet, devnets and regtest.
    pub const TESTNET: NetworkParams = NetworkParams {
        p2pkh_prefix: 0x8c,
        p2sh_prefix: 0x13,
    };
}

impl Network {
    pub fn params(&self) -> NetworkParams {
        match self {
            Network::Mainnet => NetworkParams::MAINNET,
            Network::Testnet | Network::Devnet | Network::Regtest => NetworkParams::TESTNET,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Regtest => "regtest",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "livenet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(anyhow::anyhow!("unknown network: {}", s)),
        }
    }
}
