//! Network selection types

use super::constants::networks;

/// Mainnet/testnet switch used by the legacy Base defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Map the middleware's testnet flag onto a network
    pub fn from_testnet(testnet: bool) -> Self {
        if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    /// Get the network identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => networks::BASE_MAINNET,
            Network::Testnet => networks::BASE_SEPOLIA,
        }
    }

    /// Get the USDC contract address for this network
    pub fn usdc_address(&self) -> &'static str {
        match self {
            Network::Mainnet => "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            Network::Testnet => "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
        }
    }

    /// Get the USDC token name for this network
    pub fn usdc_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "USD Coin",
            Network::Testnet => "USDC",
        }
    }
}
