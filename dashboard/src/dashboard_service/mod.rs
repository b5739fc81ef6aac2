mod models;
mod refresh_gate;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{error, info, instrument, warn};

pub use models::{DashboardSnapshot, FetchStatus};
pub use refresh_gate::RefreshGate;

use crate::{
    balances::{BalanceAggregator, BalanceBatch},
    chain_reader::{ChainReader, ReadError},
    config::{LocalConfig, NetworkConfig},
    positions::{
        total_borrowed, total_supplied, PositionAggregator, SeamlessPosition, UserAccountData,
    },
};

/// How often the lending batch (positions + account data) is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub extra_attempts: u32,
    /// Attempt `n` waits `n * base_delay` before starting
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(local_config: &LocalConfig) -> Self {
        Self {
            extra_attempts: local_config.lending_fetch_retries,
            base_delay: Duration::from_millis(local_config.lending_retry_delay_ms),
        }
    }

    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            extra_attempts: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Result of the lending batch after retries
#[derive(Debug, Clone)]
pub struct LendingData {
    pub positions: Vec<SeamlessPosition>,
    pub account_data: Option<UserAccountData>,
    pub status: FetchStatus,
}

/// Whether a refresh made it into the session
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Applied(DashboardSnapshot),
    /// A newer refresh was started (or the session cleared) while this one ran
    Discarded(DashboardSnapshot),
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> &DashboardSnapshot {
        match self {
            RefreshOutcome::Applied(snapshot) | RefreshOutcome::Discarded(snapshot) => snapshot,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied(_))
    }
}

/// Composes both aggregators into dashboard snapshots.
///
/// Balances and the lending batch run concurrently. Only the lending batch is
/// retried, every aggregator call is read-only so retrying is always safe.
pub struct DashboardService<R: ChainReader + ?Sized> {
    balances: BalanceAggregator<R>,
    positions: PositionAggregator<R>,
    retry_policy: RetryPolicy,
    session: RefreshGate,
}

impl<R: ChainReader + ?Sized> DashboardService<R> {
    pub fn new(reader: Arc<R>, network: &NetworkConfig, retry_policy: RetryPolicy) -> Self {
        Self {
            balances: BalanceAggregator::new(reader.clone(), network),
            positions: PositionAggregator::new(reader, network),
            retry_policy,
            session: RefreshGate::new(),
        }
    }

    pub fn balances(&self) -> &BalanceAggregator<R> {
        &self.balances
    }

    /// Reads a full snapshot for `user_address` without touching the session
    pub async fn fetch_snapshot(&self, user_address: &str) -> DashboardSnapshot {
        self.fetch_snapshot_with_generation(user_address, self.session.latest_generation())
            .await
    }

    /// Reads a snapshot and stores it as the session's current one, unless a
    /// newer refresh started in the meantime
    #[instrument("REFRESH", skip(self))]
    pub async fn refresh(&self, user_address: &str) -> RefreshOutcome {
        let generation = self.session.begin();
        let snapshot = self
            .fetch_snapshot_with_generation(user_address, generation)
            .await;

        if self.session.apply(snapshot.clone()).await {
            RefreshOutcome::Applied(snapshot)
        } else {
            RefreshOutcome::Discarded(snapshot)
        }
    }

    /// Latest applied snapshot of the session
    pub async fn current(&self) -> Option<DashboardSnapshot> {
        self.session.current().await
    }

    /// Forgets the session's wallet, in-flight refreshes included
    pub async fn disconnect(&self) {
        info!("Clearing dashboard session");
        self.session.clear().await;
    }

    /// Positions and account data, retried as one batch.
    ///
    /// When every attempt fails, what the last attempt did read is kept and the
    /// rest falls back to its sentinel (empty list / `None`).
    pub async fn fetch_lending(&self, user_address: &str) -> LendingData {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.retry_policy.delay_before(attempt);
                info!(
                    "Retrying lending data of {} in {:?} (attempt {})",
                    user_address,
                    delay,
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }

            let (positions, account_data) = futures::join!(
                self.positions.read_user_positions(user_address),
                self.positions.read_user_account_data(user_address)
            );

            let error = match (&positions, &account_data) {
                (Ok(_), Ok(_)) => None,
                (Err(e), _) | (_, Err(e)) => Some(e.clone()),
            };

            let error = match error {
                None => {
                    return LendingData {
                        positions: positions.unwrap_or_default(),
                        account_data: account_data.ok(),
                        status: FetchStatus::Ok,
                    }
                }
                Some(error) => error,
            };

            warn!(
                "Error fetching lending data of {} (attempt {}): {}",
                user_address,
                attempt + 1,
                error
            );

            // A malformed address fails the same way every time
            let retryable = !matches!(error, ReadError::InvalidAddress(_));
            if retryable && attempt < self.retry_policy.extra_attempts {
                attempt += 1;
                continue;
            }

            error!("All lending data fetch attempts failed for {}", user_address);
            return LendingData {
                positions: positions.unwrap_or_default(),
                account_data: account_data.ok(),
                status: FetchStatus::Failed {
                    reason: error.to_string(),
                },
            };
        }
    }

    async fn fetch_snapshot_with_generation(
        &self,
        user_address: &str,
        generation: u64,
    ) -> DashboardSnapshot {
        let (balance_batch, lending) = futures::join!(
            self.balances.collect_balances(user_address),
            self.fetch_lending(user_address)
        );

        let health_factor_display = lending
            .account_data
            .as_ref()
            .map(|account| account.health_factor_display());
        let risk_tier = lending.account_data.as_ref().map(|account| account.risk_tier());

        DashboardSnapshot {
            user_address: user_address.to_string(),
            generation,
            fetched_at: Utc::now(),
            balances: balance_batch.displayable(),
            balances_status: Self::balances_status(&balance_batch),
            total_supplied: total_supplied(&lending.positions),
            total_borrowed: total_borrowed(&lending.positions),
            positions: lending.positions,
            account_data: lending.account_data,
            lending_status: lending.status,
            health_factor_display,
            risk_tier,
        }
    }

    fn balances_status(batch: &BalanceBatch) -> FetchStatus {
        match batch.failures.first() {
            None => FetchStatus::Ok,
            Some(first) if batch.failures.len() == batch.balances.len() => FetchStatus::Failed {
                reason: first.error.to_string(),
            },
            Some(first) => FetchStatus::Partial {
                failed_reads: batch.failures.len(),
                reason: first.error.to_string(),
            },
        }
    }
}
