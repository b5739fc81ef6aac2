use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    balances::TokenBalance,
    derived_metrics::RiskTier,
    positions::{SeamlessPosition, UserAccountData},
};

/// Outcome of one section of a snapshot.
///
/// Lets a consumer tell an empty section from one that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    /// Some reads failed and were replaced by placeholders
    Partial { failed_reads: usize, reason: String },
    Failed { reason: String },
}

impl FetchStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchStatus::Ok)
    }
}

/// Everything the dashboard shows for one wallet
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub user_address: String,
    /// Refresh generation that produced this snapshot
    pub generation: u64,
    pub fetched_at: DateTime<Utc>,
    pub balances: Vec<TokenBalance>,
    pub balances_status: FetchStatus,
    pub positions: Vec<SeamlessPosition>,
    pub account_data: Option<UserAccountData>,
    pub lending_status: FetchStatus,
    pub health_factor_display: Option<String>,
    pub risk_tier: Option<RiskTier>,
    pub total_supplied: f64,
    pub total_borrowed: f64,
}
