use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::{
    chain_reader::{AccountSnapshot, ReserveSnapshot},
    derived_metrics::{self, RiskTier},
    token_registry::TokenDescriptor,
    utils::{
        constants::{DISPLAY_DECIMALS, HEALTH_FACTOR_DECIMALS, RAY_DECIMALS, USD_VALUE_DECIMALS},
        math_helper,
    },
};

/// A user's supply and borrow in one reserve
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeamlessPosition {
    pub asset: String,
    pub symbol: String,
    pub supplied_amount: String,
    pub supplied_amount_formatted: String,
    pub borrowed_amount: String,
    pub borrowed_amount_formatted: String,
    pub a_token_address: String,
    pub variable_debt_token_address: String,
    /// Per-second supply rate as a plain decimal
    pub current_liquidity_rate: String,
    /// Per-second variable borrow rate as a plain decimal
    pub current_variable_borrow_rate: String,
    pub decimals: u8,
    /// Percent
    pub supply_apy: f64,
    /// Percent
    pub borrow_apy: f64,
}

impl SeamlessPosition {
    pub fn new(
        asset: Address,
        token: &TokenDescriptor,
        reserve: &ReserveSnapshot,
        supplied: U256,
        borrowed: U256,
    ) -> Self {
        Self {
            asset: asset.to_string(),
            symbol: token.symbol.clone(),
            supplied_amount: supplied.to_string(),
            supplied_amount_formatted: math_helper::format_units_fixed(
                supplied,
                token.decimals,
                DISPLAY_DECIMALS,
            ),
            borrowed_amount: borrowed.to_string(),
            borrowed_amount_formatted: math_helper::format_units_fixed(
                borrowed,
                token.decimals,
                DISPLAY_DECIMALS,
            ),
            a_token_address: reserve.a_token_address.to_string(),
            variable_debt_token_address: reserve.variable_debt_token_address.to_string(),
            current_liquidity_rate: math_helper::format_units(
                reserve.current_liquidity_rate,
                RAY_DECIMALS,
            ),
            current_variable_borrow_rate: math_helper::format_units(
                reserve.current_variable_borrow_rate,
                RAY_DECIMALS,
            ),
            decimals: token.decimals,
            supply_apy: derived_metrics::calculate_apy_from_ray(reserve.current_liquidity_rate),
            borrow_apy: derived_metrics::calculate_apy_from_ray(
                reserve.current_variable_borrow_rate,
            ),
        }
    }
}

/// Sum of the formatted supplied amounts, across assets
pub fn total_supplied(positions: &[SeamlessPosition]) -> f64 {
    positions
        .iter()
        .filter_map(|position| position.supplied_amount_formatted.parse::<f64>().ok())
        .sum()
}

/// Sum of the formatted borrowed amounts, across assets
pub fn total_borrowed(positions: &[SeamlessPosition]) -> f64 {
    positions
        .iter()
        .filter_map(|position| position.borrowed_amount_formatted.parse::<f64>().ok())
        .sum()
}

/// Aggregate risk snapshot of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountData {
    /// Base currency units (USD, 8 decimals)
    pub total_collateral_base: String,
    pub total_debt_base: String,
    pub available_borrows_base: String,
    /// Basis points
    pub current_liquidation_threshold: String,
    /// Basis points
    pub ltv: String,
    /// Raw wad health factor
    pub health_factor: String,
    /// Health factor divided by 10^18
    pub health_factor_formatted: String,
}

impl From<AccountSnapshot> for UserAccountData {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self {
            total_collateral_base: snapshot.total_collateral_base.to_string(),
            total_debt_base: snapshot.total_debt_base.to_string(),
            available_borrows_base: snapshot.available_borrows_base.to_string(),
            current_liquidation_threshold: snapshot.current_liquidation_threshold.to_string(),
            ltv: snapshot.ltv.to_string(),
            health_factor: snapshot.health_factor.to_string(),
            health_factor_formatted: math_helper::format_units(
                snapshot.health_factor,
                HEALTH_FACTOR_DECIMALS,
            ),
        }
    }
}

impl UserAccountData {
    pub fn health_factor_value(&self) -> f64 {
        match math_helper::parse_u256(&self.health_factor) {
            Some(raw) => derived_metrics::health_factor_from_wad(raw),
            None => derived_metrics::parse_health_factor(&self.health_factor_formatted),
        }
    }

    /// Display string, `∞` for accounts without debt
    pub fn health_factor_display(&self) -> String {
        derived_metrics::format_health_factor(self.health_factor_value())
    }

    pub fn risk_tier(&self) -> RiskTier {
        derived_metrics::health_factor_tier(self.health_factor_value())
    }

    pub fn total_collateral_usd(&self) -> f64 {
        Self::base_to_usd(&self.total_collateral_base)
    }

    pub fn total_debt_usd(&self) -> f64 {
        Self::base_to_usd(&self.total_debt_base)
    }

    fn base_to_usd(value: &str) -> f64 {
        math_helper::parse_u256(value)
            .map(|raw| math_helper::divide_by_precision_f64(raw, USD_VALUE_DECIMALS))
            .unwrap_or(0.0)
    }
}
