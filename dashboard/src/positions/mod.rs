mod models;

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{error, info, instrument};

pub use models::{total_borrowed, total_supplied, SeamlessPosition, UserAccountData};

use crate::{
    chain_reader::{parse_address, ChainReader, ReadError, ReserveSnapshot},
    config::NetworkConfig,
    token_registry::TokenRegistry,
};

/// Reads a user's supply/borrow positions and risk snapshot from the lending pool.
///
/// The reserve walk is all-or-nothing: one failing read fails the whole
/// position list.
pub struct PositionAggregator<R: ChainReader + ?Sized> {
    reader: Arc<R>,
    pool: Address,
    registry: TokenRegistry,
}

impl<R: ChainReader + ?Sized> PositionAggregator<R> {
    pub fn new(reader: Arc<R>, network: &NetworkConfig) -> Self {
        Self {
            reader,
            pool: network.lending_pool,
            registry: network.token_registry(),
        }
    }

    /// Resolves reserve symbols/decimals through `registry` instead of the network table
    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub async fn try_get_reserve_data(&self, asset: Address) -> Result<ReserveSnapshot, ReadError> {
        self.reader.reserve_data(self.pool, asset).await
    }

    /// Current state of one reserve, `None` when it cannot be read
    pub async fn get_reserve_data(&self, asset_address: &str) -> Option<ReserveSnapshot> {
        let result = match parse_address(asset_address) {
            Ok(asset) => self.try_get_reserve_data(asset).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(reserve) => Some(reserve),
            Err(e) => {
                error!("Error fetching reserve data of {}: {}", asset_address, e);
                None
            }
        }
    }

    /// Walks the reserve list and returns every reserve the user supplies to or borrows from.
    ///
    /// Reserves are visited one after the other; per reserve the supplied and
    /// borrowed balances are read in parallel. The first failing read aborts
    /// the walk.
    pub async fn try_get_user_positions(
        &self,
        user: Address,
    ) -> Result<Vec<SeamlessPosition>, ReadError> {
        let reserves = self.reader.reserves_list(self.pool).await?;

        let mut positions = Vec::new();

        for asset in reserves {
            let reserve = self.try_get_reserve_data(asset).await?;
            let token = self.registry.resolve(&asset);

            let (supplied, borrowed) = futures::try_join!(
                self.reader.token_balance(reserve.a_token_address, user),
                self.reader.token_balance(reserve.variable_debt_token_address, user)
            )?;

            // Only include positions with non-zero amounts
            if supplied.is_zero() && borrowed.is_zero() {
                continue;
            }

            positions.push(SeamlessPosition::new(
                asset, &token, &reserve, supplied, borrowed,
            ));
        }

        Ok(positions)
    }

    /// Positions of the user, empty when any read of the walk failed
    #[instrument("POSITIONS", skip(self))]
    pub async fn get_user_seamless_positions(&self, user_address: &str) -> Vec<SeamlessPosition> {
        match self.read_user_positions(user_address).await {
            Ok(positions) => {
                info!("Found {} positions for {}", positions.len(), user_address);
                positions
            }
            Err(e) => {
                error!("Error fetching positions of {}: {}", user_address, e);
                Vec::new()
            }
        }
    }

    pub async fn try_get_user_account_data(
        &self,
        user: Address,
    ) -> Result<UserAccountData, ReadError> {
        let snapshot = self.reader.user_account_data(self.pool, user).await?;
        Ok(UserAccountData::from(snapshot))
    }

    /// Risk snapshot of the user, `None` when it cannot be read.
    ///
    /// `None` means "no data", not "no risk": callers branch on it before
    /// deriving any display value.
    #[instrument("ACCOUNT_DATA", skip(self))]
    pub async fn get_user_account_data(&self, user_address: &str) -> Option<UserAccountData> {
        match self.read_user_account_data(user_address).await {
            Ok(account) => Some(account),
            Err(e) => {
                error!("Error fetching account data of {}: {}", user_address, e);
                None
            }
        }
    }

    pub(crate) async fn read_user_positions(
        &self,
        user_address: &str,
    ) -> Result<Vec<SeamlessPosition>, ReadError> {
        let user = parse_address(user_address)?;
        self.try_get_user_positions(user).await
    }

    pub(crate) async fn read_user_account_data(
        &self,
        user_address: &str,
    ) -> Result<UserAccountData, ReadError> {
        let user = parse_address(user_address)?;
        self.try_get_user_account_data(user).await
    }
}
