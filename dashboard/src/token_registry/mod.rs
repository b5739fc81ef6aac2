use std::collections::HashMap;

use alloy::primitives::Address;

use crate::utils::constants::{DEFAULT_TOKEN_DECIMALS, UNKNOWN_SYMBOL};

/// Static description of an ERC-20 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
}

impl TokenDescriptor {
    pub fn new(address: Address, symbol: &str, decimals: u8, name: &str) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
            name: name.to_string(),
        }
    }

    /// Placeholder for assets nobody registered
    pub fn unknown(address: Address) -> Self {
        Self {
            address,
            symbol: UNKNOWN_SYMBOL.to_string(),
            decimals: DEFAULT_TOKEN_DECIMALS,
            name: UNKNOWN_SYMBOL.to_string(),
        }
    }
}

/// Symbol/decimals lookup for reserve and wallet tokens.
///
/// `Address` equality is byte equality, so lookups ignore the hex casing the
/// address was written in.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenDescriptor>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TokenDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        registry
    }

    /// Adds or replaces a descriptor
    pub fn register(&mut self, descriptor: TokenDescriptor) {
        self.tokens.insert(descriptor.address, descriptor);
    }

    pub fn get(&self, address: &Address) -> Option<&TokenDescriptor> {
        self.tokens.get(address)
    }

    /// Registered descriptor, or the `UNKNOWN`/18 placeholder
    pub fn resolve(&self, address: &Address) -> TokenDescriptor {
        self.get(address)
            .cloned()
            .unwrap_or_else(|| TokenDescriptor::unknown(*address))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        let usdc = TokenDescriptor::new(
            address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            "USDC",
            6,
            "USD Coin",
        );
        let registry = TokenRegistry::from_descriptors([usdc.clone()]);

        let lowercase: Address = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913".parse().unwrap();
        assert_eq!(registry.resolve(&lowercase), usdc);

        let other = address!("1111111111111111111111111111111111111111");
        let resolved = registry.resolve(&other);
        assert_eq!(resolved.symbol, "UNKNOWN");
        assert_eq!(resolved.decimals, 18);
    }

    #[test]
    fn test_register_extends_lookup() {
        let mut registry = TokenRegistry::new();
        let cbeth = address!("2Ae3F1Ec7F1F5012CFEab0185bfc7aa3cf0DEc22");
        assert!(registry.get(&cbeth).is_none());

        registry.register(TokenDescriptor::new(cbeth, "cbETH", 18, "Coinbase Wrapped Staked ETH"));
        assert_eq!(registry.resolve(&cbeth).symbol, "cbETH");
        assert_eq!(registry.len(), 1);
    }
}
