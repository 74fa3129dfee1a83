//! Common constants for networks, schemes and known assets

/// Common network configurations
pub mod networks {
    use once_cell::sync::Lazy;
    use std::collections::HashMap;

    /// Base mainnet configuration
    pub const BASE_MAINNET: &str = "base";
    /// Base Sepolia testnet configuration
    pub const BASE_SEPOLIA: &str = "base-sepolia";
    /// Avalanche mainnet configuration
    pub const AVALANCHE_MAINNET: &str = "avalanche";
    /// Avalanche Fuji testnet configuration
    pub const AVALANCHE_FUJI: &str = "avalanche-fuji";
    /// Polygon PoS mainnet configuration
    pub const POLYGON_MAINNET: &str = "polygon";
    /// Polygon Amoy testnet configuration
    pub const POLYGON_AMOY: &str = "polygon-amoy";

    /// Stable-coin deployment known to the gate.
    ///
    /// The EIP-712 domain name is not stored here; it follows the
    /// mainnet/testnet flag (see [`crate::types::Network::usdc_name`]).
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AssetInfo {
        /// Network the contract is deployed on
        pub network: &'static str,
        /// Token contract address
        pub address: &'static str,
        /// EIP-712 domain version
        pub version: &'static str,
    }

    const fn usdc(network: &'static str, address: &'static str) -> AssetInfo {
        AssetInfo {
            network,
            address,
            version: "2",
        }
    }

    /// Canonical USDC deployments, one per supported network
    static USDC_DEPLOYMENTS: Lazy<HashMap<&'static str, AssetInfo>> = Lazy::new(|| {
        [
            usdc(BASE_MAINNET, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            usdc(BASE_SEPOLIA, "0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
            usdc(AVALANCHE_MAINNET, "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
            usdc(AVALANCHE_FUJI, "0x5425890298aed601595a70AB815c96711a31Bc65"),
            usdc(POLYGON_MAINNET, "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359"),
            usdc(POLYGON_AMOY, "0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582"),
        ]
        .into_iter()
        .map(|info| (info.network, info))
        .collect()
    });

    /// Get USDC contract address for a network
    pub fn get_usdc_address(network: &str) -> Option<&'static str> {
        USDC_DEPLOYMENTS.get(network).map(|info| info.address)
    }

    /// Look up a known asset by network and contract address.
    ///
    /// Addresses compare case-insensitively so checksummed and lowercase
    /// forms resolve to the same entry.
    pub fn find_asset(network: &str, address: &str) -> Option<&'static AssetInfo> {
        USDC_DEPLOYMENTS
            .get(network)
            .filter(|info| info.address.eq_ignore_ascii_case(address))
    }

    /// Check if a network is supported
    pub fn is_supported(network: &str) -> bool {
        USDC_DEPLOYMENTS.contains_key(network)
    }

    /// Get all supported networks
    pub fn all_supported() -> Vec<&'static str> {
        let mut all: Vec<_> = USDC_DEPLOYMENTS.keys().copied().collect();
        all.sort_unstable();
        all
    }
}

/// Common payment schemes
pub mod schemes {
    /// Exact payment scheme (EIP-3009)
    pub const EXACT: &str = "exact";
}

#[cfg(test)]
mod tests {
    use super::networks::*;

    #[test]
    fn test_usdc_addresses() {
        assert_eq!(
            get_usdc_address(BASE_SEPOLIA),
            Some("0x036CbD53842c5426634e7929541eC2318f3dCF7e")
        );
        assert_eq!(
            get_usdc_address(POLYGON_MAINNET),
            Some("0x3c499c542cef5e3811e1192ce70d8cc03d5c3359")
        );
        assert_eq!(get_usdc_address("solana"), None);
    }

    #[test]
    fn test_find_asset_ignores_address_case() {
        let info = find_asset(BASE_MAINNET, "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913").unwrap();
        assert_eq!(info.network, BASE_MAINNET);
        assert_eq!(info.version, "2");

        // Right address, wrong network
        assert!(find_asset(BASE_SEPOLIA, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").is_none());
    }

    #[test]
    fn test_supported_networks() {
        assert!(is_supported("polygon-amoy"));
        assert!(!is_supported("unsupported-network"));
        assert_eq!(all_supported().len(), 6);
    }
}
