use std::collections::HashMap;

use alloy::primitives::U256;
use serde::Serialize;

use crate::utils::{constants::DISPLAY_DECIMALS, math_helper};

/// Balance of one token in a wallet at fetch time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Token address, or the native symbol for the native asset
    pub token: String,
    pub symbol: String,
    /// Raw integer balance in base-10
    pub balance: String,
    /// Balance with exactly six fractional digits
    pub balance_formatted: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_value: Option<f64>,
}

impl TokenBalance {
    pub fn new(token: String, symbol: String, raw: U256, decimals: u8) -> Self {
        Self {
            token,
            symbol,
            balance: raw.to_string(),
            balance_formatted: math_helper::format_units_fixed(raw, decimals, DISPLAY_DECIMALS),
            decimals,
            usd_value: None,
        }
    }

    /// Zero balance standing in for a read that failed
    pub fn placeholder(token: String, symbol: String, decimals: u8) -> Self {
        Self::new(token, symbol, U256::ZERO, decimals)
    }

    /// Whether the six decimal rendering is non-zero
    pub fn is_displayable(&self) -> bool {
        self.balance_formatted
            .bytes()
            .any(|b| (b'1'..=b'9').contains(&b))
    }

    /// Attaches a USD value from a caller supplied unit price
    pub fn with_usd_price(mut self, unit_price: f64) -> Self {
        self.usd_value = self
            .balance_formatted
            .parse::<f64>()
            .ok()
            .map(|amount| amount * unit_price)
            .filter(|value| value.is_finite());
        self
    }
}

/// Values every balance whose symbol has a unit price in `prices`, keyed by upper-case symbol
pub fn apply_usd_prices(
    balances: Vec<TokenBalance>,
    prices: &HashMap<String, f64>,
) -> Vec<TokenBalance> {
    balances
        .into_iter()
        .map(|balance| match prices.get(&balance.symbol.to_uppercase()) {
            Some(price) => balance.with_usd_price(*price),
            None => balance,
        })
        .collect()
}

/// Sum of the USD values that are known
pub fn total_usd_value(balances: &[TokenBalance]) -> f64 {
    balances.iter().filter_map(|balance| balance.usd_value).sum()
}

/// Renders `raw` with `display_decimals` fractional digits, `None` if `raw` is not a base-10 integer
pub fn format_balance(raw: &str, decimals: u8, display_decimals: u8) -> Option<String> {
    let raw = math_helper::parse_u256(raw)?;
    Some(math_helper::format_units_fixed(raw, decimals, display_decimals))
}

/// US dollar currency string with two fractional digits and thousands separators.
///
/// `format_usd_value(1234.567) == "$1,234.57"`
pub fn format_usd_value(usd_value: f64) -> String {
    if !usd_value.is_finite() {
        return "$0.00".to_string();
    }

    let rounded = format!("{:.2}", usd_value.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if usd_value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}
