use alloy::primitives::U256;
use serde::Serialize;
use tracing::warn;

use crate::utils::{
    constants::{
        HEALTH_FACTOR_DECIMALS, HEALTH_FACTOR_DISPLAY_FLOOR, HEALTH_FACTOR_INFINITY_THRESHOLD,
        RAY_DECIMALS, SECONDS_PER_YEAR,
    },
    math_helper,
};

/// Risk classification of a health factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// No debt, or at least 2
    Safe,
    /// At least 1.5
    Moderate,
    /// At least 1.1
    Elevated,
    /// Close to or past liquidation
    Danger,
}

/// Annual percentage yield of a ray scaled per-second rate, compounded every second.
///
/// `((1 + r)^SECONDS_PER_YEAR - 1) * 100`. The rate is a base-10 or `0x` hex
/// integer; anything else, negative rates included, yields `0.0` instead of an error.
pub fn calculate_apy(ray_rate: &str) -> f64 {
    match math_helper::parse_uint_literal(ray_rate) {
        Some(rate) => calculate_apy_from_ray(rate),
        None => {
            warn!("Cannot compute APY of malformed rate {:?}", ray_rate);
            0.0
        }
    }
}

pub fn calculate_apy_from_ray(ray_rate: U256) -> f64 {
    let rate_per_second = math_helper::divide_by_precision_f64(ray_rate, RAY_DECIMALS);
    let apy = ((1.0 + rate_per_second).powi(SECONDS_PER_YEAR) - 1.0) * 100.0;

    if apy.is_finite() {
        apy
    } else {
        warn!("APY of rate {} is not finite", ray_rate);
        0.0
    }
}

/// Human value of a wad scaled health factor
pub fn health_factor_from_wad(raw: U256) -> f64 {
    math_helper::divide_by_precision_f64(raw, HEALTH_FACTOR_DECIMALS)
}

/// Parses a decimal health factor string, `NaN` when it does not parse
pub fn parse_health_factor(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// `0`, `NaN` and infinities are what the pool reports for an account without debt
fn is_no_debt_sentinel(health_factor: f64) -> bool {
    health_factor == 0.0 || !health_factor.is_finite()
}

/// Display string of a health factor:
///
/// | value | shown as |
/// |---|---|
/// | 0, NaN, infinite, above 1,000,000 | `∞` |
/// | below 0.001 | `0.001` |
/// | below 1 | 3 decimals |
/// | below 10 | 2 decimals |
/// | below 100 | 1 decimal |
/// | otherwise | floored integer |
pub fn format_health_factor(health_factor: f64) -> String {
    if is_no_debt_sentinel(health_factor) || health_factor > HEALTH_FACTOR_INFINITY_THRESHOLD {
        return "∞".to_string();
    }

    if health_factor < HEALTH_FACTOR_DISPLAY_FLOOR {
        return "0.001".to_string();
    }

    if health_factor < 1.0 {
        format!("{:.3}", health_factor)
    } else if health_factor < 10.0 {
        format!("{:.2}", health_factor)
    } else if health_factor < 100.0 {
        format!("{:.1}", health_factor)
    } else {
        format!("{}", health_factor.floor() as u64)
    }
}

pub fn health_factor_tier(health_factor: f64) -> RiskTier {
    if is_no_debt_sentinel(health_factor) || health_factor > HEALTH_FACTOR_INFINITY_THRESHOLD {
        return RiskTier::Safe;
    }

    if health_factor >= 2.0 {
        RiskTier::Safe
    } else if health_factor >= 1.5 {
        RiskTier::Moderate
    } else if health_factor >= 1.1 {
        RiskTier::Elevated
    } else {
        RiskTier::Danger
    }
}
