use std::{fmt, str::FromStr};

use alloy::primitives::{address, Address};

use crate::token_registry::{TokenDescriptor, TokenRegistry};

/// Networks the dashboard knows an address table for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Base,
    BaseSepolia,
}

impl Network {
    /// Public endpoint used when no RPC url is configured
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Base => "https://mainnet.base.org",
            Network::BaseSepolia => "https://sepolia.base.org",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Base => 8453,
            Network::BaseSepolia => 84532,
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" | "base-mainnet" | "8453" => Ok(Network::Base),
            "base-sepolia" | "basesepolia" | "base_sepolia" | "84532" => Ok(Network::BaseSepolia),
            other => Err(anyhow::anyhow!("unsupported network: {}", other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Base => write!(f, "base"),
            Network::BaseSepolia => write!(f, "base-sepolia"),
        }
    }
}

/// Static address table of one network.
///
/// Built once at startup and handed to both aggregators, so tests can describe
/// a mock network without touching the environment.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    /// Stablecoin of the network
    pub usdc: TokenDescriptor,
    /// Wrapped native asset
    pub weth: TokenDescriptor,
    /// Reward token
    pub aero: TokenDescriptor,
    /// Lending pool all reserve and account reads go through
    pub lending_pool: Address,
}

impl NetworkConfig {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Base => Self {
                network,
                usdc: TokenDescriptor::new(
                    address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
                    "USDC",
                    6,
                    "USD Coin",
                ),
                weth: TokenDescriptor::new(
                    address!("4200000000000000000000000000000000000006"),
                    "WETH",
                    18,
                    "Wrapped Ethereum",
                ),
                aero: TokenDescriptor::new(
                    address!("940181a94A35A4569E4529A3CDfB74e38FD98631"),
                    "AERO",
                    18,
                    "Aerodrome Finance",
                ),
                lending_pool: address!("8F44Fd754285aa6A2b8B9B97739B79746e0475a7"),
            },
            Network::BaseSepolia => Self {
                network,
                usdc: TokenDescriptor::new(
                    address!("036CbD53842c5426634e7929541eC2318f3dCF7e"),
                    "USDC",
                    6,
                    "USD Coin",
                ),
                weth: TokenDescriptor::new(
                    address!("4200000000000000000000000000000000000006"),
                    "WETH",
                    18,
                    "Wrapped Ethereum",
                ),
                // Sepolia has no AERO deployment, the mainnet address is reused
                aero: TokenDescriptor::new(
                    address!("940181a94A35A4569E4529A3CDfB74e38FD98631"),
                    "AERO",
                    18,
                    "Aerodrome Finance",
                ),
                lending_pool: address!("8F44Fd754285aa6A2b8B9B97739B79746e0475a7"),
            },
        }
    }

    /// Tokens whose wallet balance is shown, in display order
    pub fn tracked_tokens(&self) -> Vec<TokenDescriptor> {
        vec![self.usdc.clone(), self.weth.clone(), self.aero.clone()]
    }

    /// Registry seeded with every token of the table
    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::from_descriptors(self.tracked_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!("base".parse::<Network>().unwrap(), Network::Base);
        assert_eq!("Base-Sepolia".parse::<Network>().unwrap(), Network::BaseSepolia);
        assert_eq!("84532".parse::<Network>().unwrap(), Network::BaseSepolia);
        assert!("optimism".parse::<Network>().is_err());
    }

    #[test]
    fn test_tables_differ_only_where_expected() {
        let mainnet = NetworkConfig::for_network(Network::Base);
        let testnet = NetworkConfig::for_network(Network::BaseSepolia);

        assert_ne!(mainnet.usdc.address, testnet.usdc.address);
        assert_eq!(mainnet.weth.address, testnet.weth.address);
        assert_eq!(mainnet.tracked_tokens().len(), 3);
        assert_eq!(mainnet.usdc.decimals, 6);
    }
}
