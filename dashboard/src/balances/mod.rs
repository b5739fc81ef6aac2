mod models;

use std::sync::Arc;

use alloy::primitives::Address;
use futures::future::join_all;
use tracing::{info, instrument, warn};

pub use models::{
    apply_usd_prices, format_balance, format_usd_value, total_usd_value, TokenBalance,
};

use crate::{
    chain_reader::{parse_address, ChainReader, ReadError},
    config::NetworkConfig,
    token_registry::{TokenDescriptor, TokenRegistry},
    utils::constants::{DEFAULT_TOKEN_DECIMALS, NATIVE_DECIMALS, NATIVE_SYMBOL, UNKNOWN_SYMBOL},
};

/// A read that failed and was replaced by a zero placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct FailedBalanceRead {
    pub token: String,
    pub error: ReadError,
}

/// Every balance of one wallet, failed reads included as placeholders
#[derive(Debug, Clone, Default)]
pub struct BalanceBatch {
    /// Native asset first, then the tracked tokens in table order
    pub balances: Vec<TokenBalance>,
    pub failures: Vec<FailedBalanceRead>,
}

impl BalanceBatch {
    /// Balances worth showing, zero (and placeholder) entries dropped
    pub fn displayable(&self) -> Vec<TokenBalance> {
        self.balances
            .iter()
            .filter(|balance| balance.is_displayable())
            .cloned()
            .collect()
    }
}

/// Reads native and ERC-20 wallet balances.
///
/// A failing token read never fails the batch: the entry degrades to a zero
/// balance carrying the symbol and decimals that are known.
pub struct BalanceAggregator<R: ChainReader + ?Sized> {
    reader: Arc<R>,
    tracked_tokens: Vec<TokenDescriptor>,
    registry: TokenRegistry,
}

impl<R: ChainReader + ?Sized> BalanceAggregator<R> {
    pub fn new(reader: Arc<R>, network: &NetworkConfig) -> Self {
        Self {
            reader,
            tracked_tokens: network.tracked_tokens(),
            registry: network.token_registry(),
        }
    }

    /// Uses `registry` for the lazy metadata lookups instead of the network table
    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Native balance, or the error of the read
    pub async fn try_get_native_balance(&self, user: Address) -> Result<TokenBalance, ReadError> {
        let raw = self.reader.native_balance(user).await?;
        Ok(TokenBalance::new(
            NATIVE_SYMBOL.to_string(),
            NATIVE_SYMBOL.to_string(),
            raw,
            NATIVE_DECIMALS,
        ))
    }

    /// ERC-20 balance, or the error of the first read that failed.
    ///
    /// Without `token_info` the symbol and decimals are read from the token
    /// contract first (both in parallel), so any token can be queried.
    pub async fn try_get_token_balance(
        &self,
        token: Address,
        user: Address,
        token_info: Option<&TokenDescriptor>,
    ) -> Result<TokenBalance, ReadError> {
        let (symbol, decimals) = match token_info {
            Some(info) => (info.symbol.clone(), info.decimals),
            None => futures::try_join!(
                self.reader.token_symbol(token),
                self.reader.token_decimals(token)
            )?,
        };

        let raw = self.reader.token_balance(token, user).await?;

        Ok(TokenBalance::new(token.to_string(), symbol, raw, decimals))
    }

    /// ERC-20 balance that degrades to a zero placeholder when any read fails
    pub async fn get_token_balance(
        &self,
        token_address: &str,
        user_address: &str,
        token_info: Option<&TokenDescriptor>,
    ) -> TokenBalance {
        match self
            .read_token_balance(token_address, user_address, token_info)
            .await
        {
            Ok(balance) => balance,
            Err(error) => {
                warn!("Failed to fetch {} balance: {}", token_address, error);
                Self::token_placeholder(token_address, token_info)
            }
        }
    }

    /// Displayable balances of the native asset and every tracked token.
    ///
    /// Zero balances are dropped from the result, not from the reads.
    pub async fn get_all_token_balances(&self, user_address: &str) -> Vec<TokenBalance> {
        self.collect_balances(user_address).await.displayable()
    }

    /// Reads the native asset and every tracked token concurrently.
    ///
    /// Results are joined back to the token they were issued for, in table order.
    #[instrument("BALANCES", skip(self))]
    pub async fn collect_balances(&self, user_address: &str) -> BalanceBatch {
        let native_read = self.read_native_balance(user_address);
        let token_reads = join_all(self.tracked_tokens.iter().map(|token| {
            self.read_token_balance_at(token.address, user_address, Some(token))
        }));

        let (native_result, token_results) = futures::join!(native_read, token_reads);

        let mut batch = BalanceBatch::default();

        match native_result {
            Ok(balance) => batch.balances.push(balance),
            Err(error) => {
                warn!("Failed to fetch {} balance: {}", NATIVE_SYMBOL, error);
                batch.balances.push(TokenBalance::placeholder(
                    NATIVE_SYMBOL.to_string(),
                    NATIVE_SYMBOL.to_string(),
                    NATIVE_DECIMALS,
                ));
                batch.failures.push(FailedBalanceRead {
                    token: NATIVE_SYMBOL.to_string(),
                    error,
                });
            }
        }

        for (token, result) in self.tracked_tokens.iter().zip(token_results) {
            match result {
                Ok(balance) => batch.balances.push(balance),
                Err(error) => {
                    warn!("Failed to fetch {} balance: {}", token.symbol, error);
                    batch.balances.push(TokenBalance::placeholder(
                        token.address.to_string(),
                        token.symbol.clone(),
                        token.decimals,
                    ));
                    batch.failures.push(FailedBalanceRead {
                        token: token.address.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "Fetched {} balances for {} ({} failed)",
            batch.balances.len(),
            user_address,
            batch.failures.len()
        );

        batch
    }

    /// Balances of an arbitrary token list, zero entries kept.
    ///
    /// Registered tokens use their descriptor, others go through the lazy metadata path.
    pub async fn get_multiple_token_balances(
        &self,
        token_addresses: &[&str],
        user_address: &str,
    ) -> Vec<TokenBalance> {
        join_all(token_addresses.iter().map(|token_address| {
            let token_info = parse_address(token_address)
                .ok()
                .and_then(|token| self.registry.get(&token));
            self.get_token_balance(token_address, user_address, token_info)
        }))
        .await
    }

    async fn read_native_balance(&self, user_address: &str) -> Result<TokenBalance, ReadError> {
        let user = parse_address(user_address)?;
        self.try_get_native_balance(user).await
    }

    async fn read_token_balance(
        &self,
        token_address: &str,
        user_address: &str,
        token_info: Option<&TokenDescriptor>,
    ) -> Result<TokenBalance, ReadError> {
        let token = parse_address(token_address)?;
        self.read_token_balance_at(token, user_address, token_info)
            .await
    }

    async fn read_token_balance_at(
        &self,
        token: Address,
        user_address: &str,
        token_info: Option<&TokenDescriptor>,
    ) -> Result<TokenBalance, ReadError> {
        let user = parse_address(user_address)?;
        self.try_get_token_balance(token, user, token_info).await
    }

    fn token_placeholder(token_address: &str, token_info: Option<&TokenDescriptor>) -> TokenBalance {
        let token = parse_address(token_address)
            .map(|address| address.to_string())
            .unwrap_or_else(|_| token_address.to_string());

        match token_info {
            Some(info) => TokenBalance::placeholder(token, info.symbol.clone(), info.decimals),
            None => TokenBalance::placeholder(
                token,
                UNKNOWN_SYMBOL.to_string(),
                DEFAULT_TOKEN_DECIMALS,
            ),
        }
    }
}
