use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::{http::reqwest::Url, layers::RetryBackoffLayer},
};
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    chain_reader::{AccountSnapshot, ChainReader, ReadError, ReserveSnapshot},
    config::LocalConfig,
    utils::contracts::{IERC20, ISeamlessPool},
};

/// BlockchainManager handles the connection to the configured network.
pub struct BlockchainManager;

impl BlockchainManager {
    /// Creates the HTTP provider every read goes through.
    ///
    /// Rate limited responses are retried at the transport layer, the aggregators
    /// above never retry a single read themselves.
    ///
    /// # Arguments
    /// * `local_config` - Local configuration containing the RPC URL
    ///
    /// # Returns
    /// * `Result<impl Provider<Ethereum>>` - A Result containing either the provider instance or an error
    pub fn get_provider(local_config: &LocalConfig) -> Result<impl Provider<Ethereum> + 'static> {
        let retry_layer = RetryBackoffLayer::new(3, 500, 300);

        let url = Url::parse(&local_config.rpc_url)
            .context(format!("RPC_URL is not a valid url: {}", local_config.rpc_url))?;

        let client = RpcClient::builder().layer(retry_layer).http(url);

        let provider = ProviderBuilder::new().on_client(client);

        Ok(provider)
    }
}

/// `ChainReader` backed by an alloy provider
pub struct AlloyChainReader<P: Provider<Ethereum>> {
    provider: P,
}

impl<P: Provider<Ethereum>> AlloyChainReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn erc20_contract(&self, address: Address) -> IERC20::IERC20Instance<(), &P> {
        IERC20::new(address, &self.provider)
    }

    fn pool_contract(&self, address: Address) -> ISeamlessPool::ISeamlessPoolInstance<(), &P> {
        ISeamlessPool::new(address, &self.provider)
    }
}

#[async_trait]
impl<P: Provider<Ethereum> + 'static> ChainReader for AlloyChainReader<P> {
    async fn native_balance(&self, owner: Address) -> Result<U256, ReadError> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| ReadError::rpc("eth_getBalance", e))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ReadError> {
        let balance = self
            .erc20_contract(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ReadError::rpc("balanceOf", e))?;
        Ok(balance._0)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ReadError> {
        let symbol = self
            .erc20_contract(token)
            .symbol()
            .call()
            .await
            .map_err(|e| ReadError::rpc("symbol", e))?;
        Ok(symbol._0)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ReadError> {
        let decimals = self
            .erc20_contract(token)
            .decimals()
            .call()
            .await
            .map_err(|e| ReadError::rpc("decimals", e))?;
        Ok(decimals._0)
    }

    async fn reserves_list(&self, pool: Address) -> Result<Vec<Address>, ReadError> {
        let reserves = self
            .pool_contract(pool)
            .getReservesList()
            .call()
            .await
            .map_err(|e| ReadError::rpc("getReservesList", e))?;
        Ok(reserves._0)
    }

    async fn reserve_data(
        &self,
        pool: Address,
        asset: Address,
    ) -> Result<ReserveSnapshot, ReadError> {
        let reserve = self
            .pool_contract(pool)
            .getReserveData(asset)
            .call()
            .await
            .map_err(|e| ReadError::rpc("getReserveData", e))?
            ._0;

        if reserve.aTokenAddress.is_zero() {
            return Err(ReadError::decode(
                "getReserveData",
                format!("{} is not an active reserve", asset),
            ));
        }

        Ok(ReserveSnapshot {
            configuration: reserve.configuration.data,
            liquidity_index: U256::from(reserve.liquidityIndex),
            current_liquidity_rate: U256::from(reserve.currentLiquidityRate),
            current_variable_borrow_rate: U256::from(reserve.currentVariableBorrowRate),
            a_token_address: reserve.aTokenAddress,
            variable_debt_token_address: reserve.variableDebtTokenAddress,
        })
    }

    async fn user_account_data(
        &self,
        pool: Address,
        user: Address,
    ) -> Result<AccountSnapshot, ReadError> {
        let account = self
            .pool_contract(pool)
            .getUserAccountData(user)
            .call()
            .await
            .map_err(|e| ReadError::rpc("getUserAccountData", e))?;

        Ok(AccountSnapshot {
            total_collateral_base: account.totalCollateralBase,
            total_debt_base: account.totalDebtBase,
            available_borrows_base: account.availableBorrowsBase,
            current_liquidation_threshold: account.currentLiquidationThreshold,
            ltv: account.ltv,
            health_factor: account.healthFactor,
        })
    }
}
