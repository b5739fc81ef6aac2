mod error;
#[cfg(test)]
pub mod mock;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub use error::ReadError;

/// Per-asset state of a lending reserve at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveSnapshot {
    /// Configuration bitmask
    pub configuration: U256,
    pub liquidity_index: U256,
    /// Ray scaled
    pub current_liquidity_rate: U256,
    /// Ray scaled
    pub current_variable_borrow_rate: U256,
    /// Yield-bearing token minted on supply
    pub a_token_address: Address,
    pub variable_debt_token_address: Address,
}

/// Raw result of the pool's account data read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    /// Wad scaled, `U256::MAX` when the account has no debt
    pub health_factor: U256,
}

/// Read-only view of the chain the aggregators are built on.
///
/// Every method is a single round-trip and reports its failure instead of
/// defaulting, the aggregators decide what a failure degrades to.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native asset balance of `owner`
    async fn native_balance(&self, owner: Address) -> Result<U256, ReadError>;

    /// ERC-20 `balanceOf`, also used for aTokens and debt tokens
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ReadError>;

    async fn token_symbol(&self, token: Address) -> Result<String, ReadError>;

    async fn token_decimals(&self, token: Address) -> Result<u8, ReadError>;

    /// Ordered reserve list of the pool
    async fn reserves_list(&self, pool: Address) -> Result<Vec<Address>, ReadError>;

    async fn reserve_data(&self, pool: Address, asset: Address)
        -> Result<ReserveSnapshot, ReadError>;

    async fn user_account_data(
        &self,
        pool: Address,
        user: Address,
    ) -> Result<AccountSnapshot, ReadError>;
}

/// Parses a user supplied address, case-insensitively
pub fn parse_address(value: &str) -> Result<Address, ReadError> {
    let trimmed = value.trim();
    // Mixed case input is not required to carry a valid checksum
    trimmed
        .to_ascii_lowercase()
        .parse::<Address>()
        .map_err(|_| ReadError::InvalidAddress(value.to_string()))
}
