//! In-memory chain used by the unit tests

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicU32, AtomicUsize, Ordering},
    time::Duration,
};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::{AccountSnapshot, ChainReader, ReadError, ReserveSnapshot};

pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

#[derive(Default)]
pub struct MockChainReader {
    native: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    metadata: HashMap<Address, (String, u8)>,
    reserves: Vec<Address>,
    reserve_data: HashMap<Address, ReserveSnapshot>,
    accounts: HashMap<Address, AccountSnapshot>,
    failing_balances: HashSet<Address>,
    failing_metadata: HashSet<Address>,
    failing_reserves: HashSet<Address>,
    failing_native: bool,
    /// Number of upcoming `reserves_list` reads that fail
    reserves_list_failures: AtomicU32,
    /// Number of upcoming `user_account_data` reads that fail
    account_failures: AtomicU32,
    delays: HashMap<Address, Duration>,
    read_delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Marks one read as in flight until dropped
struct InFlightRead<'a>(&'a AtomicUsize);

impl Drop for InFlightRead<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native_balance(mut self, owner: Address, amount: U256) -> Self {
        self.native.insert(owner, amount);
        self
    }

    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.metadata.insert(token, (symbol.to_string(), decimals));
        self
    }

    pub fn with_balance(mut self, token: Address, owner: Address, amount: U256) -> Self {
        self.balances.insert((token, owner), amount);
        self
    }

    pub fn with_reserve(mut self, asset: Address, snapshot: ReserveSnapshot) -> Self {
        self.reserves.push(asset);
        self.reserve_data.insert(asset, snapshot);
        self
    }

    pub fn with_account(mut self, user: Address, snapshot: AccountSnapshot) -> Self {
        self.accounts.insert(user, snapshot);
        self
    }

    pub fn failing_native(mut self) -> Self {
        self.failing_native = true;
        self
    }

    pub fn failing_balance(mut self, token: Address) -> Self {
        self.failing_balances.insert(token);
        self
    }

    pub fn failing_metadata(mut self, token: Address) -> Self {
        self.failing_metadata.insert(token);
        self
    }

    pub fn failing_reserve(mut self, asset: Address) -> Self {
        self.failing_reserves.insert(asset);
        self
    }

    pub fn failing_reserves_list(self, times: u32) -> Self {
        self.reserves_list_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn failing_account_data(self, times: u32) -> Self {
        self.account_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Delays every native balance and account read of `user`
    pub fn with_delay(mut self, user: Address, delay: Duration) -> Self {
        self.delays.insert(user, delay);
        self
    }

    /// Every read stays in flight for `delay` before answering
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of reads that were in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn begin_read(&self) -> InFlightRead<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        let read = InFlightRead(&self.in_flight);

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        read
    }

    async fn wait_for(&self, user: Address) {
        if let Some(delay) = self.delays.get(&user) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn native_balance(&self, owner: Address) -> Result<U256, ReadError> {
        let _read = self.begin_read().await;
        self.wait_for(owner).await;
        if self.failing_native {
            return Err(ReadError::rpc("getBalance", "connection reset"));
        }
        Ok(self.native.get(&owner).copied().unwrap_or_default())
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ReadError> {
        let _read = self.begin_read().await;
        if self.failing_balances.contains(&token) {
            return Err(ReadError::rpc("balanceOf", "execution reverted"));
        }
        Ok(self.balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ReadError> {
        let _read = self.begin_read().await;
        if self.failing_metadata.contains(&token) {
            return Err(ReadError::rpc("symbol", "execution reverted"));
        }
        self.metadata
            .get(&token)
            .map(|(symbol, _)| symbol.clone())
            .ok_or_else(|| ReadError::decode("symbol", "empty return data"))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ReadError> {
        let _read = self.begin_read().await;
        if self.failing_metadata.contains(&token) {
            return Err(ReadError::rpc("decimals", "execution reverted"));
        }
        self.metadata
            .get(&token)
            .map(|(_, decimals)| *decimals)
            .ok_or_else(|| ReadError::decode("decimals", "empty return data"))
    }

    async fn reserves_list(&self, _pool: Address) -> Result<Vec<Address>, ReadError> {
        let _read = self.begin_read().await;
        if Self::take_failure(&self.reserves_list_failures) {
            return Err(ReadError::rpc("getReservesList", "429 Too Many Requests"));
        }
        Ok(self.reserves.clone())
    }

    async fn reserve_data(
        &self,
        _pool: Address,
        asset: Address,
    ) -> Result<ReserveSnapshot, ReadError> {
        let _read = self.begin_read().await;
        if self.failing_reserves.contains(&asset) {
            return Err(ReadError::rpc("getReserveData", "execution reverted"));
        }
        self.reserve_data
            .get(&asset)
            .cloned()
            .ok_or_else(|| ReadError::decode("getReserveData", "unknown reserve"))
    }

    async fn user_account_data(
        &self,
        _pool: Address,
        user: Address,
    ) -> Result<AccountSnapshot, ReadError> {
        let _read = self.begin_read().await;
        self.wait_for(user).await;
        if Self::take_failure(&self.account_failures) {
            return Err(ReadError::rpc("getUserAccountData", "429 Too Many Requests"));
        }
        Ok(self.accounts.get(&user).cloned().unwrap_or(AccountSnapshot {
            total_collateral_base: U256::ZERO,
            total_debt_base: U256::ZERO,
            available_borrows_base: U256::ZERO,
            current_liquidation_threshold: U256::ZERO,
            ltv: U256::ZERO,
            health_factor: U256::MAX,
        }))
    }
}
